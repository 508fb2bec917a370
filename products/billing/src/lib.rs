//! Billing vertical slice: invoices numbered from a persisted counter,
//! rendered to PDF and stored immutably.

pub mod invoices;
mod template;
mod totals;

pub use template::render;
pub use totals::{FEE_LABEL, GRACE_DAYS, Totals, compute_totals, due_date, format_number};
