//! Insert command handler.

use crate::args::AddArgs;
use crate::commands::{with_session, Out};
use crate::view::DisplayRow;
use crate::{Config, Result};

/// Validates and appends a new expense to the user's ledger. The new expense's ID is part of the
/// message.
///
/// # Errors
/// - `ErrorType::Authentication` if the credentials are wrong.
/// - `ErrorType::Validation` if the amount, date or category is invalid.
/// - `ErrorType::StorageWrite` if the ledger cannot be saved.
pub fn add(config: &Config, args: &AddArgs) -> Result<Out<DisplayRow>> {
    let draft = args.draft();
    let row = with_session(config, args.login(), |controller| {
        let id = controller.add(&draft)?;
        let session = controller.session()?;
        let record = session.store().get(id).map(DisplayRow::from);
        Ok(record)
    })?;
    Ok(match row {
        Some(row) => Out::new(
            format!(
                "Added expense {}: {} {} {} {}",
                row.id, row.date, row.category, row.amount, row.note
            )
            .trim_end()
            .to_string(),
            row,
        ),
        None => "Added expense".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::LoginArgs;
    use crate::model::ExpenseDraft;
    use crate::test::TestEnv;
    use crate::ErrorType;

    fn add_args(amount: &str, note: &str) -> AddArgs {
        AddArgs::new(
            LoginArgs::new("alice", "pw"),
            ExpenseDraft {
                date: "2024-02-01".to_string(),
                category: "transport".to_string(),
                amount: amount.to_string(),
                note: note.to_string(),
            },
        )
    }

    #[test]
    fn test_add() {
        let env = TestEnv::new();
        env.register("alice", "pw");
        let out = add(&env.config(), &add_args("80", "bus")).unwrap();
        assert_eq!(out.message(), "Added expense 1: 02/01/24 Transport 80.00 bus");
        let row = out.structure().unwrap();
        assert_eq!(row.category, "Transport");

        let text = std::fs::read_to_string(env.config().storage().path("alice")).unwrap();
        assert_eq!(text, "Date,Category,Amount,Note,Id\n02/01/24,Transport,80,bus,1\n");
    }

    #[test]
    fn test_add_invalid_amount() {
        let env = TestEnv::new();
        env.register("alice", "pw");
        let err = add(&env.config(), &add_args("eighty", "")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[test]
    fn test_add_wrong_password() {
        let env = TestEnv::new();
        env.register("alice", "other");
        let err = add(&env.config(), &add_args("1", "")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Authentication);
    }
}
