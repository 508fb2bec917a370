//! Field-level input validation. Every helper names the offending field in
//! the returned [`ApiError::Validation`].

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{ApiError, ApiResult, Money};

pub const ISO_DATE: &str = "%Y-%m-%d";
pub const DMY_DATE: &str = "%d-%m-%Y";

/// A numeric field that clients send either as a JSON number or as a
/// numeric string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    pub fn to_f64(&self, field: &'static str) -> ApiResult<f64> {
        let value = match self {
            NumberInput::Number(value) => *value,
            NumberInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::validation(field, format!("{field} must be a number")))?,
        };
        if !value.is_finite() {
            return Err(ApiError::validation(field, format!("{field} must be a number")));
        }
        Ok(value)
    }

    /// Lenient parse used for optional overrides that are dropped when
    /// they are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberInput::Number(value) if value.is_finite() => Some(*value),
            NumberInput::Number(_) => None,
            NumberInput::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<f64> for NumberInput {
    fn from(value: f64) -> Self {
        NumberInput::Number(value)
    }
}

pub fn required<T>(field: &'static str, value: Option<T>) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::validation(field, format!("{field} is required")))
}

/// Trimmed, non-empty text.
pub fn required_text(field: &'static str, value: Option<String>) -> ApiResult<String> {
    let value = required(field, value)?;
    non_empty(field, value)
}

/// `None` passes through; a present value must be non-empty after trimming.
pub fn optional_text(field: &'static str, value: Option<String>) -> ApiResult<Option<String>> {
    value.map(|v| non_empty(field, v)).transpose()
}

fn non_empty(field: &'static str, value: String) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(field, format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub fn email(field: &'static str, value: String) -> ApiResult<String> {
    let normalized = value.trim().to_lowercase();
    let valid = normalized
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ApiError::validation(field, format!("{field} must be a valid email address")));
    }
    Ok(normalized)
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn iso_date(field: &'static str, value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE)
        .map_err(|_| ApiError::validation(field, format!("{field} must be YYYY-MM-DD")))
}

/// Calendar date in `DD-MM-YYYY` form.
pub fn dmy_date(field: &'static str, value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DMY_DATE)
        .map_err(|_| ApiError::validation(field, format!("{field} must be DD-MM-YYYY")))
}

pub fn non_negative_amount(field: &'static str, value: &NumberInput) -> ApiResult<Money> {
    let major = value.to_f64(field)?;
    if major < 0.0 {
        return Err(ApiError::validation(field, format!("{field} cannot be negative")));
    }
    Money::from_major(major)
        .ok_or_else(|| ApiError::validation(field, format!("{field} is out of range")))
}

pub fn max_length(field: &'static str, value: &str, max: usize) -> ApiResult<()> {
    if value.chars().count() > max {
        return Err(ApiError::validation(
            field,
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_numeric_strings() {
        let value: NumberInput = serde_json::from_str(r#""50000""#).unwrap();
        assert_eq!(value.to_f64("base_salary").unwrap(), 50_000.0);
        let value: NumberInput = serde_json::from_str("42.5").unwrap();
        assert_eq!(value.to_f64("base_salary").unwrap(), 42.5);
    }

    #[test]
    fn non_numeric_text_reports_field() {
        let err = NumberInput::Text("abc".into()).to_f64("base_salary").unwrap_err();
        assert_eq!(err.field(), Some("base_salary"));
        assert_eq!(NumberInput::Text("abc".into()).as_f64(), None);
    }

    #[test]
    fn blank_text_is_missing() {
        let err = required_text("name", Some("   ".into())).unwrap_err();
        assert_eq!(err.field(), Some("name"));
        assert!(required_text("name", None).is_err());
        assert_eq!(optional_text("name", None).unwrap(), None);
    }

    #[test]
    fn dates_must_be_calendar_dates() {
        assert!(iso_date("dob", "1990-02-28").is_ok());
        assert!(iso_date("dob", "1990-02-30").is_err());
        assert!(iso_date("dob", "28-02-1990").is_err());
        assert!(dmy_date("invoice_date", "28-02-2024").is_ok());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(email("email", " Ada@Example.COM ".into()).unwrap(), "ada@example.com");
        assert!(email("email", "nobody".into()).is_err());
    }
}
