//! Storage models for the payroll back office.

pub mod admins;
pub mod counters;
pub mod employees;
pub mod invoices;
pub mod payslips;
pub mod subadmins;
