//! Employee register: create, partial update, delete, lookup and search.

use chrono::{NaiveDate, Utc};
use entity::employees::{self, Address, BankDetails};
use platform_api::{
    ApiError, ApiResult, Money, Page, PageRequest,
    validate::{self, NumberInput},
};
use platform_db::{DbPool, contains_ci, fetch_page, store_error};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

const MAX_ID_LEN: usize = 32;
const MONTHS_PER_YEAR: u32 = 12;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewEmployee {
    #[serde(default, rename = "employeeId", alias = "employee_id")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default, alias = "adharnumber")]
    pub national_id: Option<String>,
    #[serde(default, alias = "pan_number")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub date_of_joining: Option<String>,
    #[serde(default)]
    pub base_salary: Option<NumberInput>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub bank_details: BankDetails,
    #[serde(default)]
    pub address: Address,
}

/// Partial update; `None` leaves the stored value untouched. Annual salary
/// is not writable: it follows base salary.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default, rename = "employeeId", alias = "employee_id")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default, alias = "adharnumber")]
    pub national_id: Option<String>,
    #[serde(default, alias = "pan_number")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub date_of_joining: Option<String>,
    #[serde(default)]
    pub base_salary: Option<NumberInput>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl EmployeeUpdate {
    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.dob.is_some()
            || self.national_id.is_some()
            || self.tax_id.is_some()
            || self.date_of_joining.is_some()
            || self.base_salary.is_some()
            || self.department.is_some()
            || self.designation.is_some()
            || self.bank_details.is_some()
            || self.address.is_some()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Employee record as returned to clients; storage keys are not exposed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmployeeView {
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: NaiveDate,
    pub national_id: String,
    pub tax_id: String,
    pub date_of_joining: NaiveDate,
    pub base_salary: Money,
    pub annual_salary: Money,
    pub department: String,
    pub designation: String,
    pub bank_details: BankDetails,
    pub address: Address,
    pub created_at: String,
    pub updated_at: String,
}

impl From<employees::Model> for EmployeeView {
    fn from(model: employees::Model) -> Self {
        Self {
            employee_id: model.employee_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            dob: model.dob,
            national_id: model.national_id,
            tax_id: model.tax_id,
            date_of_joining: model.date_of_joining,
            base_salary: Money::from_cents(model.base_salary_cents),
            annual_salary: Money::from_cents(model.annual_salary_cents),
            department: model.department,
            designation: model.designation,
            bank_details: model.bank_details,
            address: model.address,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

fn annual(base: Money) -> Money {
    base.times(MONTHS_PER_YEAR)
}

#[instrument(skip_all, fields(employee_id = ?input.employee_id))]
pub async fn create(db: &DbPool, input: NewEmployee) -> ApiResult<String> {
    let employee_id = validate::required_text("employeeId", input.employee_id)?;
    validate::max_length("employeeId", &employee_id, MAX_ID_LEN)?;
    let name = validate::required_text("name", input.name)?;
    let email = validate::required_text("email", input.email)?;
    let phone = validate::required_text("phone", input.phone)?;
    let dob = validate::required_text("dob", input.dob)?;
    let national_id = validate::required_text("national_id", input.national_id)?;
    let tax_id = validate::required_text("tax_id", input.tax_id)?;
    let date_of_joining = validate::required_text("date_of_joining", input.date_of_joining)?;
    let base_salary = validate::required("base_salary", input.base_salary)?;
    let department = validate::required_text("department", input.department)?;
    let designation = validate::required_text("designation", input.designation)?;

    let email = validate::email("email", email)?;
    let dob = validate::iso_date("dob", &dob)?;
    let date_of_joining = validate::iso_date("date_of_joining", &date_of_joining)?;
    let base_salary = validate::non_negative_amount("base_salary", &base_salary)?;

    let clash = employees::Entity::find()
        .filter(
            Condition::any()
                .add(employees::Column::EmployeeId.eq(employee_id.as_str()))
                .add(employees::Column::Email.eq(email.as_str()))
                .add(employees::Column::Phone.eq(phone.as_str())),
        )
        .one(db)
        .await
        .map_err(store_error)?;
    if clash.is_some() {
        return Err(ApiError::conflict(
            "Employee already exists with this ID, email, or phone number",
        ));
    }

    let now = Utc::now().into();
    employees::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(employee_id.clone()),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        dob: Set(dob),
        national_id: Set(national_id),
        tax_id: Set(tax_id),
        date_of_joining: Set(date_of_joining),
        base_salary_cents: Set(base_salary.cents()),
        annual_salary_cents: Set(annual(base_salary).cents()),
        department: Set(department),
        designation: Set(designation),
        bank_details: Set(input.bank_details),
        address: Set(input.address),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(store_error)?;

    info!(%employee_id, "employee created");
    Ok(employee_id)
}

#[instrument(skip_all, fields(employee_id = ?input.employee_id))]
pub async fn update(db: &DbPool, input: EmployeeUpdate) -> ApiResult<String> {
    let has_changes = input.has_changes();
    let EmployeeUpdate {
        employee_id,
        name,
        email,
        phone,
        dob,
        national_id,
        tax_id,
        date_of_joining,
        base_salary,
        department,
        designation,
        bank_details,
        address,
    } = input;
    let employee_id = validate::required_text("employeeId", employee_id)?;
    if !has_changes {
        return Err(ApiError::invalid("No fields provided for update"));
    }

    let name = validate::optional_text("name", name)?;
    let email = validate::optional_text("email", email)?
        .map(|value| validate::email("email", value))
        .transpose()?;
    let phone = validate::optional_text("phone", phone)?;
    let dob = validate::optional_text("dob", dob)?
        .map(|value| validate::iso_date("dob", &value))
        .transpose()?;
    let national_id = validate::optional_text("national_id", national_id)?;
    let tax_id = validate::optional_text("tax_id", tax_id)?;
    let date_of_joining = validate::optional_text("date_of_joining", date_of_joining)?
        .map(|value| validate::iso_date("date_of_joining", &value))
        .transpose()?;
    let base_salary = base_salary
        .map(|value| validate::non_negative_amount("base_salary", &value))
        .transpose()?;
    let department = validate::optional_text("department", department)?;
    let designation = validate::optional_text("designation", designation)?;

    let mut active: employees::ActiveModel = find_model(db, &employee_id).await?.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(phone) = phone {
        active.phone = Set(phone);
    }
    if let Some(dob) = dob {
        active.dob = Set(dob);
    }
    if let Some(national_id) = national_id {
        active.national_id = Set(national_id);
    }
    if let Some(tax_id) = tax_id {
        active.tax_id = Set(tax_id);
    }
    if let Some(date_of_joining) = date_of_joining {
        active.date_of_joining = Set(date_of_joining);
    }
    if let Some(base) = base_salary {
        active.base_salary_cents = Set(base.cents());
        active.annual_salary_cents = Set(annual(base).cents());
    }
    if let Some(department) = department {
        active.department = Set(department);
    }
    if let Some(designation) = designation {
        active.designation = Set(designation);
    }
    if let Some(bank_details) = bank_details {
        active.bank_details = Set(bank_details);
    }
    if let Some(address) = address {
        active.address = Set(address);
    }
    active.updated_at = Set(Utc::now().into());
    active.update(db).await.map_err(store_error)?;

    info!(%employee_id, "employee updated");
    Ok(employee_id)
}

#[instrument(skip(db))]
pub async fn delete(db: &DbPool, employee_id: &str) -> ApiResult<()> {
    let result = employees::Entity::delete_many()
        .filter(employees::Column::EmployeeId.eq(employee_id))
        .exec(db)
        .await
        .map_err(store_error)?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }
    info!(employee_id, "employee deleted");
    Ok(())
}

#[instrument(skip(db))]
pub async fn get(db: &DbPool, employee_id: &str) -> ApiResult<EmployeeView> {
    find_model(db, employee_id).await.map(EmployeeView::from)
}

/// Case-insensitive substring search over name, email and phone.
#[instrument(skip_all, fields(search = ?query.search))]
pub async fn list(db: &DbPool, query: EmployeeQuery) -> ApiResult<Page<EmployeeView>> {
    let params = query.page.params();
    let mut select = employees::Entity::find().order_by_asc(employees::Column::EmployeeId);
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(contains_ci(employees::Column::Name, term))
                .add(contains_ci(employees::Column::Email, term))
                .add(contains_ci(employees::Column::Phone, term)),
        );
    }
    let (rows, total) = fetch_page(db, select, params)
        .await
        .map_err(store_error)?;
    let items = rows.into_iter().map(EmployeeView::from).collect();
    Ok(Page::new(items, total, params))
}

pub(crate) async fn find_model(db: &DbPool, employee_id: &str) -> ApiResult<employees::Model> {
    employees::Entity::find()
        .filter(employees::Column::EmployeeId.eq(employee_id))
        .one(db)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::not_found("Employee not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_db, new_employee};
    use serde_json::json;

    #[tokio::test]
    async fn created_employee_round_trips() {
        let db = memory_db().await;
        let id = create(&db, new_employee("EMP0001", "Ada@Example.com", "+15550001"))
            .await
            .unwrap();
        assert_eq!(id, "EMP0001");

        let view = get(&db, "EMP0001").await.unwrap();
        assert_eq!(view.name, "Ada Lovelace");
        assert_eq!(view.email, "ada@example.com");
        assert_eq!(view.dob, NaiveDate::from_ymd_opt(1990, 12, 10).unwrap());
        assert_eq!(view.base_salary, Money::from_cents(5_000_000));
        assert_eq!(view.annual_salary, Money::from_cents(60_000_000));
        assert_eq!(view.bank_details.account_number, "000111222");
    }

    #[tokio::test]
    async fn missing_field_is_named() {
        let db = memory_db().await;
        let mut input = new_employee("EMP0001", "ada@example.com", "+15550001");
        input.phone = Some("  ".into());
        let err = create(&db, input).await.unwrap_err();
        assert_eq!(err.field(), Some("phone"));

        let mut input = new_employee("EMP0001", "ada@example.com", "+15550001");
        input.dob = Some("10-12-1990".into());
        let err = create(&db, input).await.unwrap_err();
        assert_eq!(err.field(), Some("dob"));
    }

    #[tokio::test]
    async fn duplicate_identifier_email_or_phone_conflicts() {
        let db = memory_db().await;
        create(&db, new_employee("EMP0001", "ada@example.com", "+15550001"))
            .await
            .unwrap();
        for duplicate in [
            new_employee("EMP0001", "other@example.com", "+15550002"),
            new_employee("EMP0002", "ADA@example.com", "+15550002"),
            new_employee("EMP0003", "third@example.com", "+15550001"),
        ] {
            let err = create(&db, duplicate).await.unwrap_err();
            assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn update_merges_supplied_fields_and_recomputes_annual() {
        let db = memory_db().await;
        create(&db, new_employee("EMP0001", "ada@example.com", "+15550001"))
            .await
            .unwrap();
        let patch: EmployeeUpdate = serde_json::from_value(json!({
            "employeeId": "EMP0001",
            "designation": "Lead Developer",
            "base_salary": "60000"
        }))
        .unwrap();
        update(&db, patch).await.unwrap();

        let view = get(&db, "EMP0001").await.unwrap();
        assert_eq!(view.designation, "Lead Developer");
        assert_eq!(view.department, "Engineering");
        assert_eq!(view.annual_salary, Money::from_cents(72_000_000));
    }

    #[tokio::test]
    async fn update_errors() {
        let db = memory_db().await;
        let missing: EmployeeUpdate =
            serde_json::from_value(json!({"employeeId": "EMP9999", "name": "Nobody"})).unwrap();
        assert!(matches!(
            update(&db, missing).await.unwrap_err(),
            ApiError::NotFound(_)
        ));

        let empty: EmployeeUpdate =
            serde_json::from_value(json!({"employeeId": "EMP9999", "annual_salary": 1})).unwrap();
        assert!(matches!(
            update(&db, empty).await.unwrap_err(),
            ApiError::Validation { .. }
        ));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_paginated() {
        let db = memory_db().await;
        for n in 1..=3 {
            create(
                &db,
                new_employee(
                    &format!("EMP000{n}"),
                    &format!("user{n}@example.com"),
                    &format!("+1555000{n}"),
                ),
            )
            .await
            .unwrap();
        }
        let query: EmployeeQuery =
            serde_json::from_value(json!({"search": "LOVELACE", "page": 2, "pageSize": 2})).unwrap();
        let page = list(&db, query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].employee_id, "EMP0003");

        let query: EmployeeQuery = serde_json::from_value(json!({"search": "user2@"})).unwrap();
        assert_eq!(list(&db, query).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn delete_is_hard_and_reports_missing() {
        let db = memory_db().await;
        create(&db, new_employee("EMP0001", "ada@example.com", "+15550001"))
            .await
            .unwrap();
        delete(&db, "EMP0001").await.unwrap();
        assert!(matches!(get(&db, "EMP0001").await.unwrap_err(), ApiError::NotFound(_)));
        assert!(matches!(delete(&db, "EMP0001").await.unwrap_err(), ApiError::NotFound(_)));
    }
}
