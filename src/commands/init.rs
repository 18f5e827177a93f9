use crate::args::LoginArgs;
use crate::commands::Out;
use crate::{Config, Controller, Result};
use std::path::Path;

/// Creates the home directory and:
/// - Creates an initial `config.json` file with default settings, unless one exists
/// - Creates an empty credential file, unless one exists
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g. `$HOME/expenses`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home)?;
    Ok(format!(
        "Successfully created the expense directory and config at {}",
        config.root().display()
    )
    .into())
}

/// Creates an account and an empty ledger for it.
///
/// # Errors
/// - `ErrorType::Validation` if the username or password is empty or the username contains
///   characters that cannot be part of a file name.
/// - `ErrorType::DuplicateAccount` if the username is taken.
pub fn register(config: &Config, login: &LoginArgs) -> Result<Out<()>> {
    let controller = Controller::new(config);
    let username = controller.register(login.user(), login.password())?;
    Ok(format!("Registration successful, you can now log in as '{username}'").into())
}
