use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    #[sea_orm(indexed)]
    pub bill_to_name: String,
    #[sea_orm(column_type = "Json")]
    pub bill_to: BillTo,
    #[sea_orm(column_type = "Json")]
    pub items: LineItems,
    pub invoice_date: Date,
    /// `invoice_date` as `DD-MM-YYYY`, kept for substring search.
    #[sea_orm(indexed)]
    pub invoice_date_text: String,
    pub due_date: Date,
    pub subtotal_cents: i64,
    pub fee_cents: Option<i64>,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct BillTo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LineItems(pub Vec<LineItem>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "paypal")]
    Paypal,
    #[sea_orm(string_value = "bank")]
    Bank,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
