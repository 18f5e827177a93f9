//! The in-memory record store.
//!
//! The store is the single source of truth for the active user's records. It keeps records in
//! insertion (or load) order and hands out a stable `RecordId` for every record it holds. Records
//! can be addressed either by position or by id. Positions shift when a record is removed; ids do
//! not.

use crate::error::{Error, ErrorType, Result};
use crate::model::{Expense, ExpenseRecord, RecordId};
use std::collections::HashSet;
use tracing::warn;

/// Persisted ids above this are treated as missing so that fresh ids always have room to grow.
pub const MAX_PERSISTED_ID: u64 = u32::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<ExpenseRecord>,
    next_id: u64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// The current position of the record with `id`.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Returns an owned copy of the records. Changes to the copy never reach the store.
    pub fn snapshot(&self) -> Vec<ExpenseRecord> {
        self.records.clone()
    }

    /// Inserts `expense` at the end and returns its newly assigned id.
    pub fn append(&mut self, expense: Expense) -> RecordId {
        let id = self.allocate_id();
        self.records.push(ExpenseRecord::new(id, expense));
        id
    }

    /// Replaces the content of the record at `index`. The record keeps its id.
    ///
    /// # Errors
    /// - `ErrorType::IndexOutOfRange` if `index >= len`. The store is unchanged.
    pub fn replace_at(&mut self, index: usize, expense: Expense) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        record.set_expense(expense);
        Ok(())
    }

    /// Removes the record at `index`. Every later record moves down by one position.
    ///
    /// # Errors
    /// - `ErrorType::IndexOutOfRange` if `index >= len`. The store is unchanged.
    pub fn remove_at(&mut self, index: usize) -> Result<ExpenseRecord> {
        if index >= self.records.len() {
            return Err(out_of_range(index, self.records.len()));
        }
        Ok(self.records.remove(index))
    }

    /// Replaces the content of the record with `id`.
    ///
    /// # Errors
    /// - `ErrorType::RecordNotFound` if no record has `id`. The store is unchanged.
    pub fn replace(&mut self, id: RecordId, expense: Expense) -> Result<()> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;
        self.replace_at(index, expense)
    }

    /// Removes the record with `id`.
    ///
    /// # Errors
    /// - `ErrorType::RecordNotFound` if no record has `id`. The store is unchanged.
    pub fn remove(&mut self, id: RecordId) -> Result<ExpenseRecord> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;
        self.remove_at(index)
    }

    /// Swaps the whole content of the store, as done when a ledger is loaded.
    ///
    /// Rows that carry an id keep it. Rows without an id, rows whose id is above
    /// [`MAX_PERSISTED_ID`], and rows whose id was already taken by an earlier row are given a
    /// fresh one. Fresh ids continue above every id seen so far. Returns the number of fresh ids
    /// given out.
    pub fn replace_all<I>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = (Option<RecordId>, Expense)>,
    {
        let rows: Vec<(Option<RecordId>, Expense)> = rows
            .into_iter()
            .map(|(id, expense)| match id {
                Some(id) if id.get() > MAX_PERSISTED_ID => {
                    warn!("Ignoring record id {id}, ids above {MAX_PERSISTED_ID} are not kept");
                    (None, expense)
                }
                _ => (id, expense),
            })
            .collect();
        let highest = rows.iter().filter_map(|(id, _)| id.map(|id| id.get())).max();
        if let Some(highest) = highest {
            self.next_id = self.next_id.max(highest + 1);
        }

        let mut seen = HashSet::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());
        let mut fresh_ids = 0;
        for (id, expense) in rows {
            let id = match id {
                Some(id) if seen.insert(id) => id,
                _ => {
                    let mut fresh = self.allocate_id();
                    while !seen.insert(fresh) {
                        fresh = self.allocate_id();
                    }
                    fresh_ids += 1;
                    fresh
                }
            };
            records.push(ExpenseRecord::new(id, expense));
        }
        self.records = records;
        fresh_ids
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = RecordId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

pub(crate) fn out_of_range(index: usize, len: usize) -> Error {
    Error::msg(
        ErrorType::IndexOutOfRange,
        format!("Index {index} is out of range for a store of {len} records"),
    )
}

pub(crate) fn not_found(id: RecordId) -> Error {
    Error::msg(
        ErrorType::RecordNotFound,
        format!("Expense with ID {id} not found"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, ExpenseDate};
    use rust_decimal::Decimal;

    fn expense(date: &str, amount: i64, note: &str) -> Expense {
        Expense {
            date: ExpenseDate::from_stored(date),
            category: Category::Food,
            amount: Amount::new(Decimal::from(amount)),
            note: note.to_string(),
        }
    }

    fn store_of_three() -> RecordStore {
        let mut store = RecordStore::new();
        store.append(expense("01/01/24", 1, "a"));
        store.append(expense("01/02/24", 2, "b"));
        store.append(expense("01/03/24", 3, "c"));
        store
    }

    fn notes(store: &RecordStore) -> Vec<&str> {
        store.records().iter().map(|r| r.note()).collect()
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut store = RecordStore::new();
        let a = store.append(expense("01/01/24", 1, "a"));
        let b = store.append(expense("01/02/24", 2, "b"));
        assert!(b > a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.position(b), Some(1));
    }

    #[test]
    fn test_replace_at_out_of_range_leaves_store_unmodified() {
        let mut store = store_of_three();
        let before = store.snapshot();
        let err = store
            .replace_at(5, expense("02/01/24", 9, "z"))
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::IndexOutOfRange);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_replace_at_keeps_id() {
        let mut store = store_of_three();
        let id = store.records()[1].id();
        store.replace_at(1, expense("02/01/24", 9, "z")).unwrap();
        assert_eq!(store.records()[1].id(), id);
        assert_eq!(store.records()[1].note(), "z");
    }

    #[test]
    fn test_remove_at_shifts_positions() {
        let mut store = store_of_three();
        let last = store.records()[2].id();
        let removed = store.remove_at(0).unwrap();
        assert_eq!(removed.note(), "a");
        assert_eq!(notes(&store), vec!["b", "c"]);
        assert_eq!(store.position(last), Some(1));
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut store = store_of_three();
        let err = store.remove_at(3).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::IndexOutOfRange);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_by_id_does_not_change_other_ids() {
        let mut store = store_of_three();
        let ids: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        store.remove(ids[1]).unwrap();
        let remaining: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_replace_unknown_id() {
        let mut store = store_of_three();
        let err = store
            .replace(RecordId::new(99), expense("02/01/24", 9, "z"))
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::RecordNotFound);
        assert!(err.to_string().contains("Expense with ID 99 not found"));
    }

    #[test]
    fn test_replace_all_ignores_ids_without_room() {
        let mut store = RecordStore::new();
        let fresh = store.replace_all([
            (Some(RecordId::new(u64::MAX)), expense("02/01/24", 1, "x")),
            (None, expense("02/02/24", 2, "y")),
            (Some(RecordId::new(MAX_PERSISTED_ID)), expense("02/03/24", 3, "z")),
        ]);
        assert_eq!(fresh, 2);
        let ids: Vec<u64> = store.records().iter().map(|r| r.id().get()).collect();
        assert_eq!(ids, vec![MAX_PERSISTED_ID + 1, MAX_PERSISTED_ID + 2, MAX_PERSISTED_ID]);
        let next = store.append(expense("02/04/24", 4, "w"));
        assert_eq!(next.get(), MAX_PERSISTED_ID + 3);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let store = store_of_three();
        let mut snapshot = store.snapshot();
        snapshot.clear();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_replace_all_keeps_and_assigns_ids() {
        let mut store = RecordStore::new();
        store.replace_all(vec![
            (Some(RecordId::new(7)), expense("01/01/24", 1, "a")),
            (None, expense("01/02/24", 2, "b")),
            (Some(RecordId::new(7)), expense("01/03/24", 3, "c")),
            (Some(RecordId::new(3)), expense("01/04/24", 4, "d")),
        ]);
        let ids: Vec<u64> = store.records().iter().map(|r| r.id().get()).collect();
        assert_eq!(ids, vec![7, 8, 9, 3]);
        assert_eq!(store.append(expense("01/05/24", 5, "e")).get(), 10);
    }

    #[test]
    fn test_replace_all_discards_previous_content() {
        let mut store = store_of_three();
        store.replace_all(vec![(None, expense("03/01/24", 1, "new"))]);
        assert_eq!(notes(&store), vec!["new"]);
    }
}
