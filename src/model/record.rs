use crate::error::{Error, ErrorType, Result};
use crate::model::{Amount, Categories, Category, ExpenseDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The stable identity of a record within one user's ledger.
///
/// Ids are assigned by the store when a record is first added and are persisted with the record,
/// so they survive reordering, filtering and reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// The content of an expense without its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub date: ExpenseDate,
    pub category: Category,
    pub amount: Amount,
    pub note: String,
}

/// An expense as held in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    id: RecordId,
    #[serde(flatten)]
    expense: Expense,
}

impl ExpenseRecord {
    pub(crate) fn new(id: RecordId, expense: Expense) -> Self {
        Self { id, expense }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn expense(&self) -> &Expense {
        &self.expense
    }

    pub fn date(&self) -> &ExpenseDate {
        &self.expense.date
    }

    pub fn category(&self) -> &Category {
        &self.expense.category
    }

    pub fn amount(&self) -> Amount {
        self.expense.amount
    }

    pub fn note(&self) -> &str {
        &self.expense.note
    }

    pub(crate) fn set_expense(&mut self, expense: Expense) {
        self.expense = expense;
    }
}

/// Unvalidated user input for a new expense, as it comes from a form or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    /// `MM/DD/YY` or `YYYY-MM-DD`.
    pub date: String,
    pub category: String,
    pub amount: String,
    pub note: String,
}

impl ExpenseDraft {
    /// Validates every field. Nothing is mutated by a failed validation.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the amount is not a number, the date does not parse, or the
    ///   category is not one of `categories`.
    pub fn validate(&self, categories: &Categories) -> Result<Expense> {
        Ok(Expense {
            date: validate_date(&self.date)?,
            category: validate_category(&self.category, categories)?,
            amount: validate_amount(&self.amount)?,
            note: self.note.clone(),
        })
    }
}

/// A partial update to an existing expense. Fields that are `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub date: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub note: Option<String>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.category.is_none() && self.amount.is_none() && self.note.is_none()
    }

    /// Validates the patch and applies it to a copy of `current`.
    pub fn apply(&self, current: &Expense, categories: &Categories) -> Result<Expense> {
        let mut updated = current.clone();
        if let Some(date) = &self.date {
            updated.date = validate_date(date)?;
        }
        if let Some(category) = &self.category {
            updated.category = validate_category(category, categories)?;
        }
        if let Some(amount) = &self.amount {
            updated.amount = validate_amount(amount)?;
        }
        if let Some(note) = &self.note {
            updated.note = note.clone();
        }
        Ok(updated)
    }
}

fn validate_amount(s: &str) -> Result<Amount> {
    Amount::from_str(s).map_err(|e| Error::new(ErrorType::Validation, e))
}

fn validate_date(s: &str) -> Result<ExpenseDate> {
    ExpenseDate::parse_input(s).map_err(|e| Error::new(ErrorType::Validation, e))
}

fn validate_category(s: &str, categories: &Categories) -> Result<Category> {
    categories.resolve(s).ok_or_else(|| {
        let allowed: Vec<String> = categories.all().iter().map(|c| c.to_string()).collect();
        Error::msg(
            ErrorType::Validation,
            format!(
                "Unknown category '{}', expected one of: {}",
                s.trim(),
                allowed.join(", ")
            ),
        )
    })
}
