//! Invoice generation and search.

use chrono::Utc;
use entity::{
    counters,
    invoices::{self, BillTo, LineItem, LineItems, PaymentMethod},
};
use platform_api::{
    ApiError, ApiResult, Money, Page, PageRequest,
    validate::{self, DMY_DATE, NumberInput},
};
use platform_db::{DbPool, contains_ci, fetch_page, next_sequence, store_error};
use platform_render::Issuer;
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    template::render,
    totals::{compute_totals, due_date, format_number, line_amount},
};

const MAX_QUANTITY: f64 = 1_000_000.0;

/// `0` / `"paypal"` is the fee-bearing channel, `1` / `"bank"` is a bank
/// transfer.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PaymentChoice {
    Code(i64),
    Name(String),
}

impl PaymentChoice {
    fn resolve(&self) -> ApiResult<PaymentMethod> {
        match self {
            PaymentChoice::Code(0) => Ok(PaymentMethod::Paypal),
            PaymentChoice::Code(1) => Ok(PaymentMethod::Bank),
            PaymentChoice::Name(name) => match name.trim().to_ascii_lowercase().as_str() {
                "paypal" | "0" => Ok(PaymentMethod::Paypal),
                "bank" | "1" => Ok(PaymentMethod::Bank),
                _ => Err(invalid_method()),
            },
            PaymentChoice::Code(_) => Err(invalid_method()),
        }
    }
}

fn invalid_method() -> ApiError {
    ApiError::validation("payment_method", "payment_method must be 0 (PayPal) or 1 (Bank)")
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<NumberInput>,
    #[serde(default)]
    pub quantity: Option<NumberInput>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvoiceRequest {
    #[serde(default)]
    pub bill_to_name: Option<String>,
    #[serde(default)]
    pub bill_to_address: Option<String>,
    #[serde(default)]
    pub bill_to_city: Option<String>,
    #[serde(default)]
    pub bill_to_email: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
    /// `DD-MM-YYYY`.
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentChoice>,
}

#[derive(Clone, Debug)]
pub struct RenderedInvoice {
    pub invoice_number: String,
    pub filename: String,
    pub pdf: Vec<u8>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub description: String,
    pub price: Money,
    pub quantity: u32,
    pub amount: Money,
}

#[derive(Clone, Debug, Serialize)]
pub struct InvoiceView {
    pub invoice_number: String,
    pub bill_to: BillTo,
    pub items: Vec<ItemView>,
    pub invoice_date: String,
    pub due_date: String,
    pub subtotal: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Money>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub created_at: String,
}

impl From<invoices::Model> for InvoiceView {
    fn from(model: invoices::Model) -> Self {
        Self {
            items: model
                .items
                .0
                .iter()
                .map(|item| ItemView {
                    description: item.description.clone(),
                    price: Money::from_cents(item.unit_price_cents),
                    quantity: item.quantity,
                    amount: line_amount(item),
                })
                .collect(),
            invoice_number: model.invoice_number,
            bill_to: model.bill_to,
            invoice_date: model.invoice_date.format(DMY_DATE).to_string(),
            due_date: model.due_date.format(DMY_DATE).to_string(),
            subtotal: Money::from_cents(model.subtotal_cents),
            fee: model.fee_cents.map(Money::from_cents),
            total_amount: Money::from_cents(model.total_cents),
            payment_method: model.payment_method,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

pub fn filename_for(invoice_number: &str) -> String {
    format!("invoice_{invoice_number}.pdf")
}

fn line_item(index: usize, input: &ItemInput) -> ApiResult<LineItem> {
    let description = validate::optional_text("items", input.description.clone())?
        .ok_or_else(|| ApiError::validation("items", format!("item {} needs a description", index + 1)))?;
    let price = input
        .price
        .as_ref()
        .ok_or_else(|| ApiError::validation("items", format!("item {} needs a price", index + 1)))?;
    let price = validate::non_negative_amount("items", price)?;
    let quantity = match &input.quantity {
        Some(value) => value.to_f64("items")?,
        None => 1.0,
    };
    if quantity < 1.0 || quantity.fract() != 0.0 || quantity > MAX_QUANTITY {
        return Err(ApiError::validation(
            "items",
            format!("item {} quantity must be a positive whole number", index + 1),
        ));
    }
    Ok(LineItem {
        description,
        unit_price_cents: price.cents(),
        quantity: quantity as u32,
    })
}

/// Validates the request, draws the next invoice number, renders the
/// document and stores the invoice. Nothing is drawn from the counter
/// until the request has passed validation.
#[instrument(skip_all, fields(bill_to = ?request.bill_to_name))]
pub async fn generate(
    db: &DbPool,
    issuer: &Issuer,
    request: InvoiceRequest,
) -> ApiResult<RenderedInvoice> {
    let bill_to = BillTo {
        name: validate::required_text("bill_to_name", request.bill_to_name)?,
        address: validate::required_text("bill_to_address", request.bill_to_address)?,
        city: validate::required_text("bill_to_city", request.bill_to_city)?,
        email: validate::email(
            "bill_to_email",
            validate::required_text("bill_to_email", request.bill_to_email)?,
        )?,
    };
    let invoice_date = validate::required_text("invoice_date", request.invoice_date)?;
    let invoice_date = validate::dmy_date("invoice_date", &invoice_date)?;
    let due_date = due_date(invoice_date)
        .ok_or_else(|| ApiError::validation("invoice_date", "invoice_date is out of range"))?;
    let payment_method = match &request.payment_method {
        Some(choice) => choice.resolve()?,
        None => PaymentMethod::Paypal,
    };
    if request.items.is_empty() {
        return Err(ApiError::validation("items", "at least one item is required"));
    }
    let items = request
        .items
        .iter()
        .enumerate()
        .map(|(index, input)| line_item(index, input))
        .collect::<ApiResult<Vec<_>>>()?;
    let totals = compute_totals(&items, payment_method);

    let sequence = next_sequence(db, counters::INVOICE_SEQUENCE)
        .await
        .map_err(store_error)?;
    let invoice_number = format_number(sequence);

    let invoice = invoices::Model {
        id: Uuid::new_v4(),
        invoice_number: invoice_number.clone(),
        bill_to_name: bill_to.name.clone(),
        bill_to,
        items: LineItems(items),
        invoice_date,
        invoice_date_text: invoice_date.format(DMY_DATE).to_string(),
        due_date,
        subtotal_cents: totals.subtotal.cents(),
        fee_cents: totals.fee.map(Money::cents),
        total_cents: totals.total.cents(),
        payment_method,
        created_at: Utc::now().into(),
    };
    let pdf = render(issuer, &invoice).to_pdf();
    invoice
        .into_active_model()
        .insert(db)
        .await
        .map_err(store_error)?;

    info!(%invoice_number, total = %totals.total, "invoice generated");
    Ok(RenderedInvoice {
        filename: filename_for(&invoice_number),
        invoice_number,
        pdf,
    })
}

/// Search matches invoice number, bill-to name and the `DD-MM-YYYY`
/// invoice date as case-insensitive substrings.
#[instrument(skip_all, fields(search = ?query.search))]
pub async fn list(db: &DbPool, query: InvoiceQuery) -> ApiResult<Page<InvoiceView>> {
    let params = query.page.params();
    let mut select = invoices::Entity::find()
        .order_by_desc(invoices::Column::CreatedAt)
        .order_by_desc(invoices::Column::InvoiceNumber);
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(contains_ci(invoices::Column::InvoiceNumber, term))
                .add(contains_ci(invoices::Column::BillToName, term))
                .add(contains_ci(invoices::Column::InvoiceDateText, term)),
        );
    }
    let (rows, total) = fetch_page(db, select, params)
        .await
        .map_err(store_error)?;
    let items = rows.into_iter().map(InvoiceView::from).collect();
    Ok(Page::new(items, total, params))
}
