//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts are stored in the ledger
//! as plain decimal text, displayed in the table with exactly two decimal places, and shown in
//! totals with a currency symbol and thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Represents a monetary amount in the ledger's single currency.
///
/// # Examples
///
/// ```
/// # use expense_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("250.5").unwrap();
/// assert_eq!(amount.to_string(), "250.5");
/// assert_eq!(amount.to_fixed(), "250.50");
/// assert_eq!(amount.to_currency("₹"), "₹250.50");
/// ```
///
/// Non-numeric input is rejected:
/// ```
/// # use expense_ledger::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("twelve").is_err());
/// assert!(Amount::from_str("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Formats the amount with exactly two decimal places, e.g. `80.00`.
    pub fn to_fixed(&self) -> String {
        let mut rounded = self.rounded();
        rounded.rescale(2);
        rounded.to_string()
    }

    /// Formats the amount with a currency symbol and thousands separators, e.g. `-₹1,250.00`.
    pub fn to_currency(&self, symbol: &str) -> String {
        let rounded = self.rounded();
        let (sign, num) = if rounded.is_sign_negative() && !rounded.is_zero() {
            ("-", rounded.abs())
        } else {
            ("", rounded)
        };
        format!(
            "{sign}{symbol}{}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }

    fn rounded(&self) -> Decimal {
        self.value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Amounts must be strictly smaller than this in magnitude. Sums of any realistic number of
/// ledger rows stay far inside the range of `Decimal`.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000_000_000;

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(String);

impl AmountError {
    fn not_a_number(s: &str) -> Self {
        Self(format!("Amount must be a number, got '{s}'"))
    }

    fn too_large(s: &str) -> Self {
        Self(format!(
            "Amount must be smaller than {MAX_MAGNITUDE} in magnitude, got '{}'",
            s.trim()
        ))
    }
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::not_a_number(s));
        }

        // Remove commas (thousand separators)
        let without_commas = trimmed.replace(',', "");

        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|_| AmountError::not_a_number(s))?;
        if value.abs() >= Decimal::from(MAX_MAGNITUDE) {
            return Err(AmountError::too_large(s));
        }
        Ok(Amount { value })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

/// Addition saturates at the bounds of `Decimal` instead of panicking.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.value.saturating_add(rhs.value))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(amt("50.00").value(), Decimal::new(5000, 2));
        assert_eq!(amt("-12.5").value(), Decimal::new(-125, 1));
    }

    #[test]
    fn test_parse_whitespace_and_commas() {
        assert_eq!(amt("  1,250.75 ").value(), Decimal::new(125075, 2));
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(amt("1e3").value(), Decimal::from(1000));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("12abc").is_err());
        assert!(Amount::from_str("   ").is_err());
        assert!(Amount::from_str("NaN").is_err());
        assert!(Amount::from_str("inf").is_err());
    }

    #[test]
    fn test_error_message() {
        let e = Amount::from_str("ten").unwrap_err();
        assert_eq!(e.to_string(), "Amount must be a number, got 'ten'");
    }

    #[test]
    fn test_parse_rejects_huge_values() {
        let e = Amount::from_str("79228162514264337593543950335").unwrap_err();
        assert!(e.to_string().starts_with("Amount must be smaller than"));
        assert!(Amount::from_str("-1000000000000000").is_err());
        assert!(Amount::from_str("999999999999999.99").is_ok());
    }

    #[test]
    fn test_add_saturates() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!((max + max).value(), Decimal::MAX);
        let mut total = Amount::new(Decimal::MIN);
        total += Amount::new(Decimal::MIN);
        assert_eq!(total.value(), Decimal::MIN);
        let sum: Amount = [max, max, Amount::new(Decimal::ONE)].iter().sum();
        assert_eq!(sum.value(), Decimal::MAX);
    }

    #[test]
    fn test_display_is_plain_decimal() {
        assert_eq!(amt("250").to_string(), "250");
        assert_eq!(amt("250.0").to_string(), "250.0");
        assert_eq!(amt("-3.25").to_string(), "-3.25");
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(amt("80").to_fixed(), "80.00");
        assert_eq!(amt("1.005").to_fixed(), "1.01");
        assert_eq!(amt("-2.5").to_fixed(), "-2.50");
        assert_eq!(amt("1234.5").to_fixed(), "1234.50");
    }

    #[test]
    fn test_to_currency() {
        assert_eq!(amt("1234.5").to_currency("₹"), "₹1,234.50");
        assert_eq!(amt("-60000").to_currency("$"), "-$60,000.00");
        assert_eq!(Amount::ZERO.to_currency("₹"), "₹0.00");
    }

    #[test]
    fn test_sum() {
        let total: Amount = [amt("250"), amt("80.5"), amt("-0.5")].iter().sum();
        assert_eq!(total.value(), Decimal::from(330));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&amt("12.50")).unwrap();
        assert_eq!(json, "\"12.50\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amt("12.50"));
    }
}
