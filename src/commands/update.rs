//! Update command handler.

use crate::args::EditArgs;
use crate::commands::{with_session, Out};
use crate::error::{Error, ErrorType};
use crate::view::DisplayRow;
use crate::{Config, Result};

/// Changes the fields of an expense that were given on the command line. The other fields keep
/// their values.
///
/// # Errors
/// - `ErrorType::Validation` if no field was given or a new value is invalid.
/// - `ErrorType::RecordNotFound` if there is no expense with the ID.
/// - `ErrorType::StorageWrite` if the ledger cannot be saved.
pub fn edit(config: &Config, args: &EditArgs) -> Result<Out<DisplayRow>> {
    let patch = args.patch();
    if patch.is_empty() {
        return Err(Error::msg(
            ErrorType::Validation,
            "Nothing to change, pass at least one of --date, --category, --amount or --note",
        ));
    }
    let id = args.id();
    let row = with_session(config, args.login(), |controller| {
        controller.edit(id, &patch)?;
        Ok(controller.session()?.store().get(id).map(DisplayRow::from))
    })?;
    Ok(match row {
        Some(row) => Out::new(format!("Updated expense {id}"), row),
        None => format!("Updated expense {id}").into(),
    })
}
