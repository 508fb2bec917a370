use std::{fmt, iter::Sum, ops::Add};

use serde::{Serialize, Serializer};

/// Currency amount held as integer cents. Serialized as a decimal number
/// (`35000.0`, `13.25`) so clients see major units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Converts a major-unit amount, rounding to the nearest cent.
    /// Returns `None` for non-finite or out-of-range input.
    pub fn from_major(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `self * numerator / denominator`, rounded half away from zero.
    pub fn ratio(self, numerator: i64, denominator: i64) -> Self {
        let scaled = self.0 as i128 * numerator as i128;
        let denominator = denominator as i128;
        let half = denominator / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / denominator
        } else {
            (scaled - half) / denominator
        };
        Self(rounded as i64)
    }

    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}
