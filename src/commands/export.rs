//! Export command handler.

use crate::args::ExportArgs;
use crate::commands::{with_session, Out};
use crate::export::ExportFormat;
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct Exported {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub rows: usize,
}

/// Writes the expenses that match the filter to a file, either as CSV or as a printable report.
///
/// # Errors
/// - `ErrorType::Validation` if no expense matches the filter.
/// - `ErrorType::StorageWrite` if the file cannot be written.
pub fn export(config: &Config, args: &ExportArgs) -> Result<Out<Exported>> {
    let rows = with_session(config, args.login(), |controller| {
        controller.set_filter(args.filter())?;
        controller.export(args.format(), args.path())
    })?;
    let exported = Exported {
        path: args.path().to_path_buf(),
        format: args.format(),
        rows,
    };
    Ok(Out::new(
        format!(
            "Exported {} expenses as {} to {}",
            exported.rows,
            exported.format,
            exported.path.display()
        ),
        exported,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{FilterArgs, LoginArgs};
    use crate::test::TestEnv;
    use crate::ErrorType;

    fn setup() -> TestEnv {
        let env = TestEnv::new();
        env.register("alice", "pw");
        env.write_ledger(
            "alice",
            "Date,Category,Amount,Note,Id\n\
            01/05/24,Food,120,lunch,1\n\
            01/20/24,Transport,80,bus,2\n",
        );
        env
    }

    #[test]
    fn test_export_csv_filtered() {
        let env = setup();
        let path = env.root().join("out.csv");
        let args = ExportArgs::new(
            LoginArgs::new("alice", "pw"),
            ExportFormat::Csv,
            path.clone(),
            FilterArgs::new(Some("bus".to_string()), None),
        );
        let out = export(&env.config(), &args).unwrap();
        assert_eq!(out.structure().unwrap().rows, 1);
        assert!(out.message().starts_with("Exported 1 expenses as csv"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "Date,Category,Amount,Note\n01/20/24,Transport,80.00,bus\n");
    }

    #[test]
    fn test_export_report() {
        let env = setup();
        let path = env.root().join("report.txt");
        let args = ExportArgs::new(
            LoginArgs::new("alice", "pw"),
            ExportFormat::Report,
            path.clone(),
            FilterArgs::default(),
        );
        export(&env.config(), &args).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Expense Report"));
        assert!(text.contains("lunch"));
        assert!(text.contains("bus"));
    }

    #[test]
    fn test_export_nothing() {
        let env = setup();
        let path = env.root().join("none.csv");
        let args = ExportArgs::new(
            LoginArgs::new("alice", "pw"),
            ExportFormat::Csv,
            path.clone(),
            FilterArgs::new(None, Some("12/31/23".to_string())),
        );
        let err = export(&env.config(), &args).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(!path.exists());
    }
}
