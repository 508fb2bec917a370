use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// One payslip generation event. Rows are written once and never updated;
/// `snapshot` is the frozen copy every later re-render reads from.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payslips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub employee_id: String,
    pub employee_name: String,
    pub month: i32,
    pub year: i32,
    pub generated_on: DateTimeWithTimeZone,
    pub lop_days: f64,
    #[sea_orm(column_type = "Json")]
    pub salary_structure: SalaryStructure,
    #[sea_orm(column_type = "Json")]
    pub snapshot: PayslipSnapshot,
    pub filename: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    pub name: String,
    pub amount_cents: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SalaryStructure(pub Vec<SalaryComponent>);

/// Employee display fields captured at generation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PayslipSnapshot {
    pub full_name: String,
    pub emp_no: String,
    pub designation: String,
    pub department: String,
    /// Joining date as printed, `DD-MM-YYYY`.
    pub doj: String,
    pub bank_account: String,
    pub tax_id: String,
    pub monthly_salary_cents: i64,
    pub lop: f64,
    pub salary_structure: Vec<SalaryComponent>,
    pub as_of: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
