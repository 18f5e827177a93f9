use anyhow::bail;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The storage and display format of expense dates, e.g. `01/15/24`.
pub const DATE_FORMAT: &str = "%m/%d/%y";

const ISO_FORMAT: &str = "%Y-%m-%d";

/// The date of an expense as it is stored in the ledger.
///
/// The text is kept verbatim because exact-date filtering compares stored representations. Use
/// [`ExpenseDate::parse_input`] to validate and normalize user input; use
/// [`ExpenseDate::from_stored`] for values read from disk, which may not parse.
///
/// Years are two digits, so the century is ambiguous. Small values are read as 20xx and large
/// values as 19xx, pivoting around 1970.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseDate(String);

impl ExpenseDate {
    /// Wraps a stored value without validating it.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    /// Validates user input and normalizes it to `MM/DD/YY`. Accepts `MM/DD/YY` and ISO
    /// `YYYY-MM-DD`.
    pub fn parse_input(s: &str) -> crate::error::Res<Self> {
        let s = s.trim();
        match parse_any(s) {
            Some(date) => Ok(Self::from_naive(date)),
            None => bail!("Invalid date '{s}', expected MM/DD/YY or YYYY-MM-DD"),
        }
    }

    /// Normalizes `s` if it parses, otherwise returns it unchanged. Used for filter input so
    /// that an ISO date still matches the stored form.
    pub fn normalize_or_verbatim(s: &str) -> String {
        match parse_any(s.trim()) {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => s.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the stored text. Returns `None` for values that do not follow `MM/DD/YY`.
    pub fn naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.0.trim(), DATE_FORMAT).ok()
    }

    /// Returns `(month, year)` if the stored text parses.
    pub fn month_year(&self) -> Option<(u32, i32)> {
        self.naive().map(|d| (d.month(), d.year()))
    }
}

impl Display for ExpenseDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_any(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, ISO_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_normalizes() {
        assert_eq!(ExpenseDate::parse_input("01/15/24").unwrap().as_str(), "01/15/24");
        assert_eq!(ExpenseDate::parse_input("2024-02-01").unwrap().as_str(), "02/01/24");
        assert_eq!(ExpenseDate::parse_input(" 1/5/24 ").unwrap().as_str(), "01/05/24");
    }

    #[test]
    fn test_parse_input_rejects() {
        assert!(ExpenseDate::parse_input("13/01/24").is_err());
        assert!(ExpenseDate::parse_input("yesterday").is_err());
        assert!(ExpenseDate::parse_input("").is_err());
    }

    #[test]
    fn test_stored_is_verbatim() {
        let d = ExpenseDate::from_stored("garbage");
        assert_eq!(d.as_str(), "garbage");
        assert_eq!(d.naive(), None);
        assert_eq!(d.month_year(), None);
    }

    #[test]
    fn test_month_year() {
        let d = ExpenseDate::from_stored("02/01/24");
        assert_eq!(d.month_year(), Some((2, 2024)));
    }

    #[test]
    fn test_two_digit_year_century() {
        assert_eq!(ExpenseDate::from_stored("01/01/24").month_year(), Some((1, 2024)));
        assert_eq!(ExpenseDate::from_stored("12/31/95").month_year(), Some((12, 1995)));
    }

    #[test]
    fn test_normalize_or_verbatim() {
        assert_eq!(ExpenseDate::normalize_or_verbatim("2024-01-15"), "01/15/24");
        assert_eq!(ExpenseDate::normalize_or_verbatim("not a date"), "not a date");
    }
}
