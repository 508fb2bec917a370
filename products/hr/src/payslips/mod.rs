//! Payslip generation. Each generation freezes a snapshot of the employee's
//! display fields and the resolved salary structure; viewing a payslip later
//! renders from that snapshot and never from the live employee record.

mod structure;
mod template;

use chrono::{Datelike, Utc};
use entity::payslips::{self, PayslipSnapshot, SalaryComponent, SalaryStructure};
use platform_api::{
    ApiError, ApiResult, Money, Page, PageRequest,
    validate::{self, DMY_DATE, NumberInput},
};
use platform_db::{DbPool, contains_ci, fetch_page, store_error};
use platform_render::Issuer;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

pub use structure::{
    ComponentInput, FlatOverrides, STANDARD_COMPONENTS, merge_overrides, month_end, parse_period,
    resolve_structure, total_earnings,
};
pub use template::render;

use crate::employees;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PayslipRequest {
    #[serde(default, rename = "employeeId", alias = "employee_id")]
    pub employee_id: Option<String>,
    /// Pay period, `MM-YYYY`.
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub salary_structure: Vec<ComponentInput>,
    #[serde(flatten)]
    pub flat: FlatOverrides,
    #[serde(default)]
    pub lop: Option<NumberInput>,
}

/// A rendered payslip ready to stream.
#[derive(Clone, Debug)]
pub struct RenderedPayslip {
    pub payslip_id: Uuid,
    pub filename: String,
    pub pdf: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ComponentView {
    pub name: String,
    pub amount: Money,
}

impl From<&SalaryComponent> for ComponentView {
    fn from(component: &SalaryComponent) -> Self {
        Self {
            name: component.name.clone(),
            amount: Money::from_cents(component.amount_cents),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipSummary {
    pub payslip_id: Uuid,
    pub employee_id: String,
    pub employee_name: String,
    pub month: i32,
    pub year: i32,
    pub generated_on: String,
    pub lop_days: f64,
    pub salary_structure: Vec<ComponentView>,
    pub total_earnings: Money,
    pub filename: String,
    pub download_link: String,
}

impl From<payslips::Model> for PayslipSummary {
    fn from(model: payslips::Model) -> Self {
        Self {
            payslip_id: model.id,
            download_link: download_link(model.id),
            total_earnings: total_earnings(&model.salary_structure.0),
            salary_structure: model.salary_structure.0.iter().map(ComponentView::from).collect(),
            employee_id: model.employee_id,
            employee_name: model.employee_name,
            month: model.month,
            year: model.year,
            generated_on: model.generated_on.to_rfc3339(),
            lop_days: model.lop_days,
            filename: model.filename,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PayslipQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub month: Option<NumberInput>,
    #[serde(default)]
    pub year: Option<NumberInput>,
    #[serde(flatten)]
    pub page: PageRequest,
}

pub fn download_link(payslip_id: Uuid) -> String {
    format!("/employee/payslip/{payslip_id}")
}

pub fn filename_for(employee_id: &str) -> String {
    format!("salary_slip_{employee_id}.pdf")
}

#[instrument(skip_all, fields(employee_id = ?request.employee_id, month = ?request.month))]
pub async fn generate(
    db: &DbPool,
    issuer: &Issuer,
    request: PayslipRequest,
) -> ApiResult<RenderedPayslip> {
    let employee_id = validate::required_text("employeeId", request.employee_id)?;
    let period = validate::required_text("month", request.month)?;
    let (year, month) = parse_period(&period)?;
    let lop = match &request.lop {
        Some(value) => value.to_f64("lop")?,
        None => 0.0,
    };
    if lop < 0.0 {
        return Err(ApiError::validation("lop", "lop cannot be negative"));
    }
    let overrides = merge_overrides(&request.salary_structure, &request.flat)?;

    let employee = employees::find_model(db, &employee_id).await?;
    let as_of = month_end(year, month)
        .ok_or_else(|| ApiError::validation("month", "Invalid month format. Use MM-YYYY"))?;
    let salary_structure =
        resolve_structure(Money::from_cents(employee.base_salary_cents), &overrides);

    let snapshot = PayslipSnapshot {
        full_name: employee.name.clone(),
        emp_no: employee.employee_id.clone(),
        designation: employee.designation.clone(),
        department: employee.department.clone(),
        doj: employee.date_of_joining.format(DMY_DATE).to_string(),
        bank_account: employee.bank_details.account_number.clone(),
        tax_id: employee.tax_id.clone(),
        monthly_salary_cents: Money::from_cents(employee.annual_salary_cents)
            .ratio(1, 12)
            .cents(),
        lop,
        salary_structure: salary_structure.clone(),
        as_of,
    };
    let pdf = render(issuer, &snapshot).to_pdf();

    let payslip_id = Uuid::new_v4();
    let filename = filename_for(&employee_id);
    payslips::ActiveModel {
        id: Set(payslip_id),
        employee_id: Set(employee.employee_id),
        employee_name: Set(employee.name),
        month: Set(as_of.month() as i32),
        year: Set(as_of.year()),
        generated_on: Set(Utc::now().into()),
        lop_days: Set(lop),
        salary_structure: Set(SalaryStructure(salary_structure)),
        snapshot: Set(snapshot),
        filename: Set(filename.clone()),
    }
    .insert(db)
    .await
    .map_err(store_error)?;

    info!(%payslip_id, %employee_id, year, month, "payslip generated");
    Ok(RenderedPayslip {
        payslip_id,
        filename,
        pdf,
    })
}

/// Re-renders a stored payslip from its snapshot.
#[instrument(skip(db, issuer))]
pub async fn view(db: &DbPool, issuer: &Issuer, payslip_id: &str) -> ApiResult<RenderedPayslip> {
    let id = Uuid::parse_str(payslip_id.trim())
        .map_err(|_| ApiError::validation("payslipId", "Invalid payslip id"))?;
    let payslip = payslips::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::not_found("Payslip not found"))?;
    let pdf = render(issuer, &payslip.snapshot).to_pdf();
    Ok(RenderedPayslip {
        payslip_id: payslip.id,
        filename: payslip.filename,
        pdf,
    })
}

#[instrument(skip_all, fields(search = ?query.search))]
pub async fn list(db: &DbPool, query: PayslipQuery) -> ApiResult<Page<PayslipSummary>> {
    let params = query.page.params();
    let mut select = payslips::Entity::find().order_by_desc(payslips::Column::GeneratedOn);
    if let Some(month) = query.month.as_ref() {
        let month = integer_filter("month", month, 1..=12)?;
        select = select.filter(payslips::Column::Month.eq(month));
    }
    if let Some(year) = query.year.as_ref() {
        let year = integer_filter("year", year, 1900..=9999)?;
        select = select.filter(payslips::Column::Year.eq(year));
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(contains_ci(payslips::Column::EmployeeId, term))
                .add(contains_ci(payslips::Column::EmployeeName, term)),
        );
    }
    let (rows, total) = fetch_page(db, select, params)
        .await
        .map_err(store_error)?;
    let items = rows.into_iter().map(PayslipSummary::from).collect();
    Ok(Page::new(items, total, params))
}

fn integer_filter(
    field: &'static str,
    value: &NumberInput,
    range: std::ops::RangeInclusive<i32>,
) -> ApiResult<i32> {
    let number = value.to_f64(field)?;
    if number.fract() != 0.0 || !range.contains(&(number as i32)) {
        return Err(ApiError::validation(
            field,
            format!("{field} must be between {} and {}", range.start(), range.end()),
        ));
    }
    Ok(number as i32)
}
