//! Salary-structure resolution: request overrides merged over the
//! percentage-of-base defaults.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use entity::payslips::SalaryComponent;
use platform_api::{
    ApiError, ApiResult, Money,
    validate::{self, NumberInput},
};
use serde::Deserialize;

pub const BASIC_PAY: &str = "Basic Pay";
pub const HOUSE_RENT_ALLOWANCE: &str = "House Rent Allowance";
pub const PERFORMANCE_BONUS: &str = "Performance Bonus";
pub const OVERTIME_BONUS: &str = "Overtime Bonus";
pub const SPECIAL_ALLOWANCE: &str = "Special Allowance";

/// Printed order of every payslip.
pub const STANDARD_COMPONENTS: [&str; 5] = [
    BASIC_PAY,
    HOUSE_RENT_ALLOWANCE,
    PERFORMANCE_BONUS,
    OVERTIME_BONUS,
    SPECIAL_ALLOWANCE,
];

const SYNONYMS: [(&str, &str); 2] = [("Basic", BASIC_PAY), ("Other Allowance", SPECIAL_ALLOWANCE)];

/// Share of base salary, in percent, for components with a default.
fn default_share(component: &str) -> Option<i64> {
    match component {
        BASIC_PAY => Some(70),
        HOUSE_RENT_ALLOWANCE => Some(20),
        SPECIAL_ALLOWANCE => Some(10),
        _ => None,
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ComponentInput {
    pub name: String,
    #[serde(default)]
    pub amount: Option<NumberInput>,
}

/// Flat top-level overrides; they beat structure entries of the same
/// component.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FlatOverrides {
    #[serde(default)]
    pub basic: Option<NumberInput>,
    #[serde(default)]
    pub hra: Option<NumberInput>,
    #[serde(default)]
    pub overtime: Option<NumberInput>,
    #[serde(default)]
    pub bonus: Option<NumberInput>,
    #[serde(default)]
    pub others: Option<NumberInput>,
}

impl FlatOverrides {
    fn entries(&self) -> [(&'static str, Option<&NumberInput>); 5] {
        [
            (BASIC_PAY, self.basic.as_ref()),
            (HOUSE_RENT_ALLOWANCE, self.hra.as_ref()),
            (OVERTIME_BONUS, self.overtime.as_ref()),
            (PERFORMANCE_BONUS, self.bonus.as_ref()),
            (SPECIAL_ALLOWANCE, self.others.as_ref()),
        ]
    }
}

/// Builds the override map. Structure entries are read in order (later
/// duplicates win), synonyms are folded into their canonical names, then
/// numeric flat overrides are applied on top. Flat overrides that are not
/// non-negative numbers are ignored.
pub fn merge_overrides(
    structure: &[ComponentInput],
    flat: &FlatOverrides,
) -> ApiResult<HashMap<String, Money>> {
    let mut merged = HashMap::with_capacity(structure.len() + 5);
    for entry in structure {
        let amount = match &entry.amount {
            Some(value) => validate::non_negative_amount("salary_structure", value)?,
            None => Money::ZERO,
        };
        merged.insert(entry.name.trim().to_string(), amount);
    }
    for (synonym, canonical) in SYNONYMS {
        if let Some(amount) = merged.remove(synonym) {
            merged.insert(canonical.to_string(), amount);
        }
    }
    for (component, value) in flat.entries() {
        let amount = value
            .and_then(NumberInput::as_f64)
            .filter(|major| *major >= 0.0)
            .and_then(Money::from_major);
        if let Some(amount) = amount {
            merged.insert(component.to_string(), amount);
        }
    }
    Ok(merged)
}

/// Resolves every standard component: override, else percentage default,
/// else zero. Names outside the standard list are dropped.
pub fn resolve_structure(base: Money, overrides: &HashMap<String, Money>) -> Vec<SalaryComponent> {
    STANDARD_COMPONENTS
        .iter()
        .map(|name| {
            let amount = overrides
                .get(*name)
                .copied()
                .or_else(|| default_share(name).map(|share| base.ratio(share, 100)))
                .unwrap_or(Money::ZERO);
            SalaryComponent {
                name: (*name).to_string(),
                amount_cents: amount.cents(),
            }
        })
        .collect()
}

pub fn total_earnings(structure: &[SalaryComponent]) -> Money {
    structure
        .iter()
        .map(|component| Money::from_cents(component.amount_cents))
        .sum()
}

/// Parses a pay period written `MM-YYYY`.
pub fn parse_period(value: &str) -> ApiResult<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("01-{}", value.trim()), validate::DMY_DATE)
        .map_err(|_| ApiError::validation("month", "Invalid month format. Use MM-YYYY"))?;
    Ok((first.year(), first.month()))
}

/// Last calendar day of the month.
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(structure: &[SalaryComponent]) -> Vec<(&str, i64)> {
        structure
            .iter()
            .map(|c| (c.name.as_str(), c.amount_cents / 100))
            .collect()
    }

    #[test]
    fn defaults_are_shares_of_base() {
        let structure = resolve_structure(Money::from_cents(5_000_000), &HashMap::new());
        assert_eq!(
            amounts(&structure),
            vec![
                (BASIC_PAY, 35_000),
                (HOUSE_RENT_ALLOWANCE, 10_000),
                (PERFORMANCE_BONUS, 0),
                (OVERTIME_BONUS, 0),
                (SPECIAL_ALLOWANCE, 5_000),
            ]
        );
        assert_eq!(total_earnings(&structure), Money::from_cents(5_000_000));
    }

    #[test]
    fn flat_basic_override_leaves_other_defaults() {
        let flat = FlatOverrides {
            basic: Some(40_000.0.into()),
            ..FlatOverrides::default()
        };
        let merged = merge_overrides(&[], &flat).unwrap();
        let structure = resolve_structure(Money::from_cents(5_000_000), &merged);
        assert_eq!(structure[0].amount_cents, 4_000_000);
        assert_eq!(structure[1].amount_cents, 1_000_000);
        assert_eq!(structure[4].amount_cents, 500_000);
    }

    #[test]
    fn synonyms_fold_and_flat_overrides_win() {
        let structure = vec![
            ComponentInput {
                name: "Basic".into(),
                amount: Some(30_000.0.into()),
            },
            ComponentInput {
                name: "Other Allowance".into(),
                amount: Some(NumberInput::Text("1200".into())),
            },
            ComponentInput {
                name: "Overtime Bonus".into(),
                amount: Some(800.0.into()),
            },
        ];
        let flat = FlatOverrides {
            overtime: Some(900.0.into()),
            bonus: Some(NumberInput::Text("lots".into())),
            ..FlatOverrides::default()
        };
        let merged = merge_overrides(&structure, &flat).unwrap();
        assert_eq!(merged.get(BASIC_PAY), Some(&Money::from_cents(3_000_000)));
        assert_eq!(merged.get(SPECIAL_ALLOWANCE), Some(&Money::from_cents(120_000)));
        assert_eq!(merged.get(OVERTIME_BONUS), Some(&Money::from_cents(90_000)));
        assert!(!merged.contains_key("Basic"));
        assert!(!merged.contains_key(PERFORMANCE_BONUS));
    }

    #[test]
    fn non_numeric_structure_amount_is_rejected() {
        let structure = vec![ComponentInput {
            name: BASIC_PAY.into(),
            amount: Some(NumberInput::Text("n/a".into())),
        }];
        let err = merge_overrides(&structure, &FlatOverrides::default()).unwrap_err();
        assert_eq!(err.field(), Some("salary_structure"));
    }

    #[test]
    fn month_end_handles_leap_years() {
        assert_eq!(month_end(2024, 2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(month_end(2023, 2), NaiveDate::from_ymd_opt(2023, 2, 28));
        assert_eq!(month_end(2025, 12), NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(month_end(2025, 4), NaiveDate::from_ymd_opt(2025, 4, 30));
    }

    #[test]
    fn periods_parse_as_month_and_year() {
        assert_eq!(parse_period("02-2024").unwrap(), (2024, 2));
        assert_eq!(parse_period(" 12-1999 ").unwrap(), (1999, 12));
        assert!(parse_period("13-2024").is_err());
        assert!(parse_period("2024-02").is_err());
    }
}
