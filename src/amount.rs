//! Money amounts in whole minor currency units.
//!
//! NACH records carry amounts as unsigned counts of minor units (cents or
//! paise). `rust_decimal` handles the conversion from and to the decimal
//! notation people write, so no floating point is involved.

use crate::error::NachError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// A non-negative amount stored as minor units with two decimal places.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use nach_file::Amount;
///
/// let amount = Amount::from_str("10.5").unwrap();
/// assert_eq!(amount.minor_units(), 1050);
/// assert_eq!(amount.to_string(), "10.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    /// Number of decimal places in the major-unit notation.
    pub const SCALE: u32 = 2;

    pub const ZERO: Self = Amount(0);

    pub fn from_minor_units(units: u64) -> Self {
        Amount(units)
    }

    pub fn minor_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), Self::SCALE)
    }
}

impl FromStr for Amount {
    type Err = NachError;

    /// Parses major-unit notation such as `"12.34"`. Negative values and
    /// fractions of a minor unit are rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || NachError::InvalidAmount(trimmed.to_string());

        let decimal = Decimal::from_str(trimmed).map_err(|_| invalid())?;
        if decimal.is_sign_negative() {
            return Err(invalid());
        }

        let minor = decimal * Decimal::from(10u64.pow(Self::SCALE));
        if !minor.fract().is_zero() {
            return Err(invalid());
        }
        minor.to_u64().map(Amount).ok_or_else(invalid)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_converts_to_minor_units() {
        assert_eq!(Amount::from_str("1").unwrap().minor_units(), 100);
        assert_eq!(Amount::from_str("1.5").unwrap().minor_units(), 150);
        assert_eq!(Amount::from_str("  2.05  ").unwrap().minor_units(), 205);
        assert_eq!(Amount::from_str("0.00").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_rejects_fractional_minor_units() {
        assert!(Amount::from_str("1.005").is_err());
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert!(Amount::from_str("-1.00").is_err());
        assert!(Amount::from_str("ten").is_err());
    }

    #[test]
    fn test_display_has_two_places() {
        assert_eq!(Amount::from_minor_units(1050).to_string(), "10.50");
        assert_eq!(Amount::from_minor_units(7).to_string(), "0.07");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_sum() {
        let total: Amount = [100, 250, 5]
            .into_iter()
            .map(Amount::from_minor_units)
            .sum();
        assert_eq!(total.minor_units(), 355);
    }
}
