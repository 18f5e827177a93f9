//! The display projection of the ledger.
//!
//! Projection never mutates or reorders the store. A filter only selects which records are shown;
//! the records keep their store order.

use crate::model::{ExpenseRecord, RecordId};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One formatted row of the ledger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub id: RecordId,
    pub date: String,
    pub category: String,
    /// Always two decimals, e.g. `80.00`.
    pub amount: String,
    pub note: String,
}

impl From<&ExpenseRecord> for DisplayRow {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: record.id(),
            date: record.date().to_string(),
            category: record.category().to_string(),
            amount: record.amount().to_fixed(),
            note: record.note().to_string(),
        }
    }
}

/// Lazily formats `records` as display rows. The iterator can be cloned to start over.
pub fn project<'a, I>(records: I) -> impl Iterator<Item = DisplayRow> + Clone + 'a
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
    I::IntoIter: Clone + 'a,
{
    records.into_iter().map(DisplayRow::from)
}

/// Records whose category or note contains `keyword`, ignoring case. An empty keyword keeps
/// every record.
pub fn filter_by_keyword<'a>(records: &'a [ExpenseRecord], keyword: &str) -> Vec<&'a ExpenseRecord> {
    let keyword = keyword.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.category().as_str().to_lowercase().contains(&keyword)
                || r.note().to_lowercase().contains(&keyword)
        })
        .collect()
}

/// Records whose stored date is exactly `date`.
pub fn filter_by_exact_date<'a>(records: &'a [ExpenseRecord], date: &str) -> Vec<&'a ExpenseRecord> {
    records.iter().filter(|r| r.date().as_str() == date).collect()
}

/// Selects which records are displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Keyword(String),
    /// An exact `MM/DD/YY` date.
    Date(String),
}

impl Filter {
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    pub fn apply<'a>(&self, records: &'a [ExpenseRecord]) -> Vec<&'a ExpenseRecord> {
        match self {
            Filter::All => records.iter().collect(),
            Filter::Keyword(keyword) => filter_by_keyword(records, keyword),
            Filter::Date(date) => filter_by_exact_date(records, date),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "all records"),
            Filter::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            Filter::Date(date) => write!(f, "date {date}"),
        }
    }
}

/// The rows currently on display, with the mapping between record ids and display positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct View {
    rows: Vec<DisplayRow>,
}

impl View {
    pub fn new<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
        I::IntoIter: Clone + 'a,
    {
        Self {
            rows: project(records).collect(),
        }
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The display position of the record with `id`, if it is shown.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// The id of the record shown at `position`.
    pub fn id_at(&self, position: usize) -> Option<RecordId> {
        self.rows.get(position).map(|row| row.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Expense, ExpenseDate};
    use crate::store::RecordStore;

    fn sample() -> RecordStore {
        let mut store = RecordStore::new();
        for (date, category, amount, note) in [
            ("01/15/24", Category::Food, "250", "Lunch with Sam"),
            ("02/01/24", Category::Transport, "80", ""),
            ("01/15/24", Category::Shopping, "19.999", "shoes"),
        ] {
            store.append(Expense {
                date: ExpenseDate::from_stored(date),
                category,
                amount: amount.parse().unwrap(),
                note: note.to_string(),
            });
        }
        store
    }

    #[test]
    fn test_project_formats_amounts() {
        let store = sample();
        let rows: Vec<DisplayRow> = project(store.records()).collect();
        let amounts: Vec<&str> = rows.iter().map(|r| r.amount.as_str()).collect();
        assert_eq!(amounts, vec!["250.00", "80.00", "20.00"]);
        assert_eq!(rows[0].category, "Food");
    }

    #[test]
    fn test_project_is_restartable() {
        let store = sample();
        let rows = project(store.records());
        let first: Vec<DisplayRow> = rows.clone().collect();
        let second: Vec<DisplayRow> = rows.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyword_empty_matches_all_in_order() {
        let store = sample();
        let matched = filter_by_keyword(store.records(), "");
        let expected: Vec<&ExpenseRecord> = store.records().iter().collect();
        assert_eq!(matched, expected);
    }

    #[test]
    fn test_keyword_matches_category_or_note() {
        let store = sample();
        let by_note = filter_by_keyword(store.records(), "SAM");
        assert_eq!(by_note.len(), 1);
        assert_eq!(by_note[0].note(), "Lunch with Sam");
        let by_category = filter_by_keyword(store.records(), "trans");
        assert_eq!(by_category.len(), 1);
        assert_eq!(*by_category[0].category(), Category::Transport);
        assert!(filter_by_keyword(store.records(), "rent").is_empty());
    }

    #[test]
    fn test_exact_date() {
        let store = sample();
        let matched = filter_by_exact_date(store.records(), "01/15/24");
        let notes: Vec<&str> = matched.iter().map(|r| r.note()).collect();
        assert_eq!(notes, vec!["Lunch with Sam", "shoes"]);
        assert!(filter_by_exact_date(store.records(), "1/15/24").is_empty());
    }

    #[test]
    fn test_view_maps_ids_and_positions() {
        let store = sample();
        let filter = Filter::Date("01/15/24".to_string());
        let view = View::new(filter.apply(store.records()));
        let third = store.records()[2].id();
        assert_eq!(view.len(), 2);
        assert_eq!(view.position(third), Some(1));
        assert_eq!(view.id_at(1), Some(third));
        assert_eq!(view.position(store.records()[1].id()), None);
        assert_eq!(view.id_at(2), None);
    }
}
