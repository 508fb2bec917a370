//! Invoice layout: issuer header, shaded bill-to and details blocks, the
//! item table, optional fee line, total and closing note.

use entity::invoices;
use platform_api::{Money, validate::DMY_DATE};
use platform_render::{Align, Canvas, Cell, Document, FontStyle, Issuer, Rgb, StandardChrome};

use crate::totals::{FEE_LABEL, line_amount};

const LIGHT_PINK: Rgb = Rgb(255, 240, 245);
const DARK_PINK: Rgb = Rgb(219, 112, 147);

const DESCRIPTION_WIDTH: f32 = 90.0;
const RATE_WIDTH: f32 = 30.0;
const QTY_WIDTH: f32 = 20.0;
const AMOUNT_WIDTH: f32 = 45.0;

pub const NOTE: &str = "Note: Thank you for your business.";

fn dollars(amount: Money) -> String {
    format!("${amount}")
}

pub fn render(issuer: &Issuer, invoice: &invoices::Model) -> Document {
    let chrome = StandardChrome::new(issuer);
    let mut canvas = Canvas::a4(&chrome);
    canvas.add_page();

    canvas.set_fill_color(LIGHT_PINK);
    canvas.set_text_color(Rgb::BLACK);
    canvas.set_font(FontStyle::Bold, 12.0);
    canvas.cell(0.0, 8.0, "Bill To:", Cell::new().filled().ln());
    canvas.set_font(FontStyle::Regular, 11.0);
    let bill_to = &invoice.bill_to;
    for line in [&bill_to.name, &bill_to.address, &bill_to.city, &bill_to.email] {
        canvas.cell(0.0, 6.0, line, Cell::new().filled().ln());
    }
    canvas.ln(10.0);

    canvas.set_font(FontStyle::Bold, 12.0);
    canvas.cell(0.0, 8.0, "Invoice Details:", Cell::new().filled().ln());
    canvas.set_font(FontStyle::Regular, 11.0);
    let details = [
        format!("Invoice #: {}", invoice.invoice_number),
        format!("Bill Date: {}", invoice.invoice_date.format(DMY_DATE)),
        format!("Due Date:  {}", invoice.due_date.format(DMY_DATE)),
    ];
    for line in &details {
        canvas.cell(0.0, 7.0, line, Cell::new().filled().ln());
    }
    canvas.ln(10.0);

    canvas.set_fill_color(DARK_PINK);
    canvas.set_text_color(Rgb::WHITE);
    canvas.set_font(FontStyle::Bold, 12.0);
    canvas.cell(DESCRIPTION_WIDTH, 10.0, "DESCRIPTION", Cell::new().center().filled());
    canvas.cell(RATE_WIDTH, 10.0, "RATE", Cell::new().center().filled());
    canvas.cell(QTY_WIDTH, 10.0, "QTY", Cell::new().center().filled());
    canvas.cell(AMOUNT_WIDTH, 10.0, "AMOUNT", Cell::new().center().filled().ln());

    canvas.set_text_color(Rgb::BLACK);
    canvas.set_font(FontStyle::Regular, 11.0);
    for item in &invoice.items.0 {
        let rate = dollars(Money::from_cents(item.unit_price_cents));
        canvas.cell(DESCRIPTION_WIDTH, 8.0, &item.description, Cell::new());
        canvas.cell(RATE_WIDTH, 8.0, &rate, Cell::new().right());
        canvas.cell(QTY_WIDTH, 8.0, &item.quantity.to_string(), Cell::new().center());
        canvas.cell(AMOUNT_WIDTH, 8.0, &dollars(line_amount(item)), Cell::new().right().ln());
    }

    let label_width = DESCRIPTION_WIDTH + RATE_WIDTH + QTY_WIDTH;
    if let Some(fee) = invoice.fee_cents.map(Money::from_cents) {
        canvas.ln(4.0);
        canvas.cell(label_width, 8.0, FEE_LABEL, Cell::new().right());
        canvas.cell(AMOUNT_WIDTH, 8.0, &dollars(fee), Cell::new().right().ln());
    }
    canvas.ln(8.0);

    canvas.set_font(FontStyle::Bold, 14.0);
    let total = format!("USD {}", dollars(Money::from_cents(invoice.total_cents)));
    canvas.cell(label_width + 1.0, 10.0, "TOTAL", Cell::new().right());
    canvas.cell(AMOUNT_WIDTH, 10.0, &total, Cell::new().right().ln());
    canvas.ln(10.0);

    canvas.set_font(FontStyle::Italic, 12.0);
    canvas.multi_cell(0.0, 6.0, NOTE, Align::Left);

    canvas.finish()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use entity::invoices::{BillTo, LineItem, LineItems, PaymentMethod};
    use uuid::Uuid;

    use super::*;
    use crate::totals::compute_totals;

    fn invoice(method: PaymentMethod, items: Vec<LineItem>) -> invoices::Model {
        let totals = compute_totals(&items, method);
        invoices::Model {
            id: Uuid::new_v4(),
            invoice_number: "INV00042".into(),
            bill_to_name: "Globex".into(),
            bill_to: BillTo {
                name: "Globex".into(),
                address: "1 Main St".into(),
                city: "Springfield".into(),
                email: "ap@globex.test".into(),
            },
            items: LineItems(items),
            invoice_date: NaiveDate::from_ymd_opt(2024, 2, 26).unwrap(),
            invoice_date_text: "26-02-2024".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            subtotal_cents: totals.subtotal.cents(),
            fee_cents: totals.fee.map(Money::cents),
            total_cents: totals.total.cents(),
            payment_method: method,
            created_at: Utc::now().into(),
        }
    }

    fn items() -> Vec<LineItem> {
        vec![
            LineItem {
                description: "Design".into(),
                unit_price_cents: 10_000,
                quantity: 2,
            },
            LineItem {
                description: "Hosting".into(),
                unit_price_cents: 5_000,
                quantity: 1,
            },
        ]
    }

    #[test]
    fn paypal_invoice_shows_fee_and_total() {
        let doc = render(&Issuer::default(), &invoice(PaymentMethod::Paypal, items()));
        for text in [
            "Bill To:",
            "Globex",
            "Invoice Details:",
            "Invoice #: INV00042",
            "Bill Date: 26-02-2024",
            "Due Date:  03-03-2024",
            "DESCRIPTION",
            "RATE",
            "QTY",
            "AMOUNT",
            "$100.00",
            "$200.00",
            FEE_LABEL,
            "$13.25",
            "TOTAL",
            "USD $263.25",
            NOTE,
            "Page 1",
        ] {
            assert!(doc.has_text(text), "missing {text:?}");
        }
    }

    #[test]
    fn bank_invoice_has_no_fee_line() {
        let doc = render(&Issuer::default(), &invoice(PaymentMethod::Bank, items()));
        assert!(!doc.has_text(FEE_LABEL));
        assert!(doc.has_text("USD $250.00"));
    }

    #[test]
    fn long_item_lists_continue_on_numbered_pages() {
        let many = (0..60)
            .map(|n| LineItem {
                description: format!("Item {n}"),
                unit_price_cents: 100,
                quantity: 1,
            })
            .collect();
        let doc = render(&Issuer::default(), &invoice(PaymentMethod::Bank, many));
        assert!(doc.page_count() >= 2);
        assert!(doc.has_text("Page 2"));
        assert!(doc.has_text("Item 59"));
        assert!(doc.has_text("USD $60.00"));
    }
}
