//! Command handlers for the expense CLI.
//!
//! Every handler that works on a ledger logs in through a [`Controller`], runs its command
//! against the session and logs out again, which performs the final save.

mod delete;
mod export;
mod init;
mod insert;
mod query;
mod update;

use crate::args::LoginArgs;
use crate::session::{Session, SessionEvent};
use crate::{Config, Controller, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use delete::delete;
pub use export::{export, Exported};
pub use init::{init, register};
pub use insert::add;
pub use query::{analytics, list, total, Analytics, Listing, MonthlyTotal};
pub use update::edit;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Logs in as the user named by `login`. The CLI subscribes to the session events so that load
/// and save problems are reported.
fn open(config: &Config, login: &LoginArgs) -> Result<Controller> {
    let mut controller = Controller::new(config);
    controller.subscribe(log_event);
    controller.login(login.user(), login.password())?;
    Ok(controller)
}

/// Runs `f` in a session for `login` and logs out afterwards. A failed final save is an error
/// when `f` changed the ledger. Otherwise it is only a warning and the output of `f` is kept.
fn with_session<T, F>(config: &Config, login: &LoginArgs, f: F) -> Result<T>
where
    F: FnOnce(&mut Controller) -> Result<T>,
{
    let mut controller = open(config, login)?;
    let result = f(&mut controller);
    let mutated = controller.session().map(Session::mutated).unwrap_or(false);
    let closed = controller.logout();
    let value = result?;
    match closed {
        Err(e) if !mutated => warn!("{e}"),
        closed => closed?,
    }
    Ok(value)
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::LoadFailed(e) => warn!("The ledger could not be read: {e}"),
        SessionEvent::FlushFailed(e) => warn!("The ledger could not be saved: {e}"),
        SessionEvent::Opened { user, records } => {
            debug!("Session opened for '{user}' with {records} records")
        }
        SessionEvent::Closed { user } => debug!("Session closed for '{user}'"),
        SessionEvent::StoreChanged { len } => debug!("The ledger now has {len} records"),
        SessionEvent::AggregatesChanged(aggregates) => debug!(
            "Total for {} is {}",
            aggregates.reference, aggregates.monthly_total
        ),
        SessionEvent::ViewChanged { rows } => debug!("{rows} rows are shown"),
    }
}
