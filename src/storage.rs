//! Persistence of a user's ledger as a CSV file.
//!
//! Each user has one file, `<dir>/<prefix><user>.csv`. The file starts with the header
//! `Date,Category,Amount,Note,Id` and has one row per record, in store order. Files written before
//! ids existed have only the first four columns; they still load, and their records are given
//! fresh ids.

use crate::error::{ErrorType, IntoResult, Res, Result};
use crate::fs;
use crate::model::{Amount, Category, Expense, ExpenseDate, ExpenseRecord, RecordId};
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// The default file name prefix of ledger files.
pub const DEFAULT_LEDGER_PREFIX: &str = "expenses_";

const HEADER: [&str; 5] = ["Date", "Category", "Amount", "Note", "Id"];
const MIN_FIELDS: usize = 4;

/// Maps users to their ledger files and reads and writes those files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    dir: PathBuf,
    prefix: String,
}

/// The outcome of reading a ledger file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The rows in file order. The id is `None` when the row had no usable id.
    pub rows: Vec<(Option<RecordId>, Expense)>,
    /// Rows with fewer than four fields, which were skipped.
    pub dropped: usize,
    /// Rows whose amount could not be parsed and was read as zero.
    pub coerced: usize,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The ledger file of `user`. This is a pure function of the username.
    pub fn path(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{}{}.csv", self.prefix, user))
    }

    /// Overwrites the ledger file of `user` with `records`.
    ///
    /// # Errors
    /// - `ErrorType::StorageWrite` if the file cannot be created or written.
    pub fn save(&self, user: &str, records: &[ExpenseRecord]) -> Result<()> {
        let path = self.path(user);
        write_ledger(&path, records)
            .with_context(|| format!("Unable to save the ledger for '{user}'"))
            .pub_result(ErrorType::StorageWrite)?;
        debug!("Saved {} records to {}", records.len(), path.display());
        Ok(())
    }

    /// Reads the ledger file of `user`. A missing file is an empty ledger.
    ///
    /// Rows with fewer than four fields are dropped. An amount that does not parse is read as
    /// zero and the row is kept.
    ///
    /// # Errors
    /// - `ErrorType::StorageRead` if the file exists but cannot be read or is not valid UTF-8.
    pub fn load(&self, user: &str) -> Result<LoadReport> {
        let path = self.path(user);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger found at {}, starting empty", path.display());
                return Ok(LoadReport::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Unable to read the ledger {}", path.display()))
                    .pub_result(ErrorType::StorageRead)
            }
        };
        let report = parse_ledger(&content)
            .with_context(|| format!("Unable to parse the ledger {}", path.display()))
            .pub_result(ErrorType::StorageRead)?;
        if report.dropped > 0 {
            warn!(
                "Skipped {} malformed rows in {}",
                report.dropped,
                path.display()
            );
        }
        debug!("Loaded {} records from {}", report.rows.len(), path.display());
        Ok(report)
    }

    /// Writes a header-only ledger for `user` unless one already exists. Returns `true` if a
    /// file was created.
    pub fn create_empty(&self, user: &str) -> Result<bool> {
        let path = self.path(user);
        if path.exists() {
            return Ok(false);
        }
        write_ledger(&path, &[])
            .with_context(|| format!("Unable to create the ledger for '{user}'"))
            .pub_result(ErrorType::StorageWrite)?;
        Ok(true)
    }
}

fn write_ledger(path: &Path, records: &[ExpenseRecord]) -> Res<()> {
    let file = fs::file(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER)?;
    for record in records {
        let amount = record.amount().to_string();
        let id = record.id().to_string();
        writer.write_record([
            record.date().as_str(),
            record.category().as_str(),
            amount.as_str(),
            record.note(),
            id.as_str(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Unable to write data to {}", path.display()))
}

fn parse_ledger(content: &str) -> Res<LoadReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut report = LoadReport::default();
    for (i, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Malformed CSV at data row {}", i + 1))?;
        if row.len() < MIN_FIELDS {
            report.dropped += 1;
            continue;
        }
        let raw_amount = row.get(2).unwrap_or_default();
        let amount = match Amount::from_str(raw_amount) {
            Ok(amount) => amount,
            Err(_) => {
                warn!("Amount '{raw_amount}' in data row {} is not valid, using 0", i + 1);
                report.coerced += 1;
                Amount::ZERO
            }
        };
        let id = row.get(4).and_then(|s| RecordId::from_str(s).ok());
        let expense = Expense {
            date: ExpenseDate::from_stored(row.get(0).unwrap_or_default()),
            category: Category::from_str(row.get(1).unwrap_or_default())
                .unwrap_or(Category::Other),
            amount,
            note: row.get(3).unwrap_or_default().to_string(),
        };
        report.rows.push((id, expense));
    }
    Ok(report)
}
