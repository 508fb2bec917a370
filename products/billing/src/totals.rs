use chrono::{Days, NaiveDate};
use entity::invoices::{LineItem, PaymentMethod};
use platform_api::Money;

/// PayPal fee in tenths of a percent (5.3%).
const FEE_PER_MILLE: i64 = 53;

pub const FEE_LABEL: &str = "PayPal Fee (5.3%)";

/// Days between the invoice date and the due date.
pub const GRACE_DAYS: u64 = 6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Money,
    pub fee: Option<Money>,
    pub total: Money,
}

pub fn line_amount(item: &LineItem) -> Money {
    Money::from_cents(item.unit_price_cents).times(item.quantity)
}

pub fn compute_totals(items: &[LineItem], method: PaymentMethod) -> Totals {
    let subtotal: Money = items.iter().map(line_amount).sum();
    let fee = match method {
        PaymentMethod::Paypal => Some(subtotal.ratio(FEE_PER_MILLE, 1000)),
        PaymentMethod::Bank => None,
    };
    Totals {
        subtotal,
        fee,
        total: subtotal + fee.unwrap_or(Money::ZERO),
    }
}

pub fn due_date(invoice_date: NaiveDate) -> Option<NaiveDate> {
    invoice_date.checked_add_days(Days::new(GRACE_DAYS))
}

/// `INV` followed by the sequence value, zero-padded to five digits.
pub fn format_number(sequence: i64) -> String {
    format!("INV{sequence:05}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price_cents: i64, quantity: u32) -> LineItem {
        LineItem {
            description: "Consulting".into(),
            unit_price_cents: price_cents,
            quantity,
        }
    }

    #[test]
    fn paypal_adds_the_processing_fee() {
        let items = [item(10_000, 2), item(5_000, 1)];
        let totals = compute_totals(&items, PaymentMethod::Paypal);
        assert_eq!(totals.subtotal, Money::from_cents(25_000));
        assert_eq!(totals.fee, Some(Money::from_cents(1_325)));
        assert_eq!(totals.total, Money::from_cents(26_325));
        assert_eq!(totals.total.to_string(), "263.25");
    }

    #[test]
    fn bank_transfer_has_no_fee_line() {
        let totals = compute_totals(&[item(9_999, 3)], PaymentMethod::Bank);
        assert_eq!(totals.fee, None);
        assert_eq!(totals.total, Money::from_cents(29_997));
    }

    #[test]
    fn due_date_is_six_days_later() {
        let billed = NaiveDate::from_ymd_opt(2024, 2, 26).unwrap();
        assert_eq!(due_date(billed), NaiveDate::from_ymd_opt(2024, 3, 3));
    }

    #[test]
    fn numbers_are_zero_padded() {
        assert_eq!(format_number(1), "INV00001");
        assert_eq!(format_number(12345), "INV12345");
        assert_eq!(format_number(123456), "INV123456");
    }
}
