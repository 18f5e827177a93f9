//! Exports of the rows currently on display.
//!
//! Both formats consume projected rows, so whatever filter is active is what gets exported.

use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::fs;
use crate::view::DisplayRow;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The default number of note characters kept in the report.
pub const DEFAULT_NOTE_WIDTH: usize = 38;

const CSV_HEADER: [&str; 4] = ["Date", "Category", "Amount", "Note"];
const REPORT_TITLE: &str = "Expense Report";
const DATE_WIDTH: usize = 10;
const CATEGORY_WIDTH: usize = 18;
const AMOUNT_WIDTH: usize = 12;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma separated values with a `Date,Category,Amount,Note` header.
    #[default]
    Csv,
    /// A fixed-width, printable expense report.
    Report,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

/// Writes `rows` to `path` in `format`. Returns the number of rows written.
///
/// # Errors
/// - `ErrorType::Validation` if `rows` is empty.
/// - `ErrorType::StorageWrite` if the file cannot be written.
pub fn export(
    format: ExportFormat,
    rows: &[DisplayRow],
    path: &Path,
    note_width: usize,
) -> Result<usize> {
    if rows.is_empty() {
        return Err(Error::msg(ErrorType::Validation, "No data to export"));
    }
    let written = match format {
        ExportFormat::Csv => write_csv(rows, path),
        ExportFormat::Report => fs::write(path, render_report(rows, note_width)),
    };
    written
        .with_context(|| format!("Could not export {format} to {}", path.display()))
        .pub_result(ErrorType::StorageWrite)?;
    debug!("Exported {} rows as {format} to {}", rows.len(), path.display());
    Ok(rows.len())
}

fn write_csv(rows: &[DisplayRow], path: &Path) -> Res<()> {
    let mut writer = csv::Writer::from_writer(fs::file(path)?);
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record([&row.date, &row.category, &row.amount, &row.note])?;
    }
    writer.flush()?;
    Ok(())
}

/// Lays out `rows` as a text table under a centered title. Notes longer than `note_width`
/// characters are cut.
pub fn render_report(rows: &[DisplayRow], note_width: usize) -> String {
    let total_width = DATE_WIDTH + CATEGORY_WIDTH + AMOUNT_WIDTH + note_width + 9;
    let rule = "-".repeat(total_width);
    let mut out = String::new();
    out.push_str(format!("{:^total_width$}", REPORT_TITLE).trim_end());
    out.push_str("\n\n");
    out.push_str(&report_line("Date", "Category", "Amount", "Note", note_width));
    out.push_str(&rule);
    out.push('\n');
    for row in rows {
        let note: String = row.note.chars().take(note_width).collect();
        out.push_str(&report_line(
            &row.date,
            &row.category,
            &row.amount,
            &note,
            note_width,
        ));
    }
    out
}

fn report_line(date: &str, category: &str, amount: &str, note: &str, note_width: usize) -> String {
    let line = format!(
        "{:^dw$} | {:^cw$} | {:>aw$} | {:<nw$}",
        date,
        category,
        amount,
        note,
        dw = DATE_WIDTH,
        cw = CATEGORY_WIDTH,
        aw = AMOUNT_WIDTH,
        nw = note_width,
    );
    format!("{}\n", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use tempfile::TempDir;

    fn row(id: u64, date: &str, category: &str, amount: &str, note: &str) -> DisplayRow {
        DisplayRow {
            id: RecordId::new(id),
            date: date.to_string(),
            category: category.to_string(),
            amount: amount.to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn test_export_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            row(1, "01/15/24", "Food", "250.00", "lunch, late"),
            row(2, "02/01/24", "Transport", "80.00", ""),
        ];
        let n = export(ExportFormat::Csv, &rows, &path, DEFAULT_NOTE_WIDTH).unwrap();
        assert_eq!(n, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Date,Category,Amount,Note\n01/15/24,Food,250.00,\"lunch, late\"\n02/01/24,Transport,80.00,\n"
        );
    }

    #[test]
    fn test_export_empty_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let err = export(ExportFormat::Report, &[], &path, DEFAULT_NOTE_WIDTH).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(err.to_string(), "No data to export");
        assert!(!path.exists());
    }

    #[test]
    fn test_export_unwritable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let rows = vec![row(1, "01/15/24", "Food", "1.00", "")];
        let err = export(ExportFormat::Csv, &rows, &path, DEFAULT_NOTE_WIDTH).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageWrite);
    }

    #[test]
    fn test_report_truncates_notes() {
        let long_note = "n".repeat(50);
        let rows = vec![row(1, "01/15/24", "Food", "250.00", &long_note)];
        let report = render_report(&rows, DEFAULT_NOTE_WIDTH);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0].trim(), "Expense Report");
        assert!(lines[2].starts_with("   Date    |"));
        let data = lines[4];
        assert!(data.ends_with(&format!("| {}", "n".repeat(38))));
        assert!(data.contains("|       250.00 |"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::Report.to_string(), "report");
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    }
}
