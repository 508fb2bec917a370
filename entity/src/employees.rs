use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub employee_id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub dob: Date,
    pub national_id: String,
    pub tax_id: String,
    pub date_of_joining: Date,
    pub base_salary_cents: i64,
    pub annual_salary_cents: i64,
    pub department: String,
    pub designation: String,
    #[sea_orm(column_type = "Json")]
    pub bank_details: BankDetails,
    #[sea_orm(column_type = "Json")]
    pub address: Address,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct BankDetails {
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub ifsc: String,
    #[serde(default)]
    pub bank_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Subadmin,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Subadmin => Entity::has_one(super::subadmins::Entity).into(),
        }
    }
}

impl Related<super::subadmins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subadmin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Value;

    #[test]
    fn sub_records_bind_as_json_values() {
        let bank = BankDetails {
            account_number: "000111222".into(),
            ifsc: "HDFC0001".into(),
            bank_name: "HDFC".into(),
        };
        let value: Value = bank.into();
        assert!(matches!(value, Value::Json(Some(_))));
        let value: Value = Address::default().into();
        assert!(matches!(value, Value::Json(Some(_))));
    }
}
