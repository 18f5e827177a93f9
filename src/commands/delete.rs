//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{with_session, Out};
use crate::view::DisplayRow;
use crate::{Config, Result};

/// Removes an expense from the ledger. The remaining expenses keep their IDs.
///
/// # Errors
/// - `ErrorType::RecordNotFound` if there is no expense with the ID.
/// - `ErrorType::StorageWrite` if the ledger cannot be saved.
pub fn delete(config: &Config, args: &DeleteArgs) -> Result<Out<DisplayRow>> {
    let removed = with_session(config, args.login(), |controller| {
        controller.delete(args.id())
    })?;
    let row = DisplayRow::from(&removed);
    Ok(Out::new(
        format!(
            "Deleted expense {}: {} {} {}",
            row.id, row.date, row.category, row.amount
        ),
        row,
    ))
}
