//! The login state machine.
//!
//! The [`Controller`] is either logged out or holds exactly one [`Session`]. Logging in as a
//! different user closes the current session first, so one user's records are never visible to
//! the next.

use crate::accounts::Accounts;
use crate::error::{Error, ErrorType, Result};
use crate::export::ExportFormat;
use crate::model::{Categories, ExpenseDraft, ExpensePatch, ExpenseRecord, RecordId};
use crate::session::{Session, SessionEvent, SessionSettings, Subscribers};
use crate::storage::Storage;
use crate::view::Filter;
use crate::Config;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

#[derive(Debug)]
pub struct Controller {
    accounts: Accounts,
    settings: SessionSettings,
    note_width: usize,
    subscribers: Subscribers,
    state: SessionState,
}

impl Controller {
    /// Builds a logged-out controller from the configuration.
    pub fn new(config: &Config) -> Self {
        Self::from_parts(
            config.accounts(),
            config.storage(),
            config.categories(),
            config.report_note_width(),
        )
    }

    pub fn from_parts(
        accounts: Accounts,
        storage: Storage,
        categories: Categories,
        note_width: usize,
    ) -> Self {
        Self {
            accounts,
            settings: SessionSettings {
                storage,
                categories,
                reference_date: None,
            },
            note_width,
            subscribers: Subscribers::default(),
            state: SessionState::LoggedOut,
        }
    }

    /// Pins the date used to pick the month of the monthly total in every session opened after
    /// this call.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.settings.reference_date = Some(date);
        self
    }

    /// Registers `observer` for the events of this and all later sessions.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.subscribers.subscribe(observer)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    pub fn session(&self) -> Result<&Session> {
        match &self.state {
            SessionState::LoggedIn(session) => Ok(session),
            SessionState::LoggedOut => Err(not_logged_in()),
        }
    }

    pub fn session_mut(&mut self) -> Result<&mut Session> {
        match &mut self.state {
            SessionState::LoggedIn(session) => Ok(session),
            SessionState::LoggedOut => Err(not_logged_in()),
        }
    }

    /// Creates an account and an empty ledger for it. A ledger that cannot be created is only
    /// warned about; the ledger is created on the first save instead.
    pub fn register(&self, username: &str, secret: &str) -> Result<String> {
        let username = self.accounts.register(username, secret)?;
        if let Err(e) = self.settings.storage.create_empty(&username) {
            warn!("Account '{username}' was created but its ledger could not be: {e}");
        }
        Ok(username)
    }

    /// Verifies the credentials and opens a session for the user. A previous session is closed
    /// first. If the credentials are wrong, the current state is kept.
    pub fn login(&mut self, username: &str, secret: &str) -> Result<&mut Session> {
        let username = self.accounts.verify(username, secret)?;
        if let Err(e) = self.logout() {
            if e.error_type() != ErrorType::NotLoggedIn {
                warn!("The previous session did not close cleanly: {e}");
            }
        }
        info!("Logged in as '{username}'");
        let session = Session::open(username, self.settings.clone(), self.subscribers.clone());
        self.state = SessionState::LoggedIn(session);
        self.session_mut()
    }

    /// Closes the session with a final save and returns to the logged-out state. The state is
    /// logged out afterwards even if the save fails.
    pub fn logout(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            SessionState::LoggedIn(session) => session.close(),
            SessionState::LoggedOut => Err(not_logged_in()),
        }
    }

    pub fn add(&mut self, draft: &ExpenseDraft) -> Result<RecordId> {
        self.session_mut()?.add(draft)
    }

    pub fn edit(&mut self, id: RecordId, patch: &ExpensePatch) -> Result<()> {
        self.session_mut()?.edit(id, patch)
    }

    pub fn delete(&mut self, id: RecordId) -> Result<ExpenseRecord> {
        self.session_mut()?.delete(id)
    }

    pub fn set_filter(&mut self, filter: Filter) -> Result<()> {
        self.session_mut()?.set_filter(filter);
        Ok(())
    }

    pub fn clear_filter(&mut self) -> Result<()> {
        self.session_mut()?.clear_filter();
        Ok(())
    }

    /// Exports the rows currently on display.
    pub fn export(&self, format: ExportFormat, path: &Path) -> Result<usize> {
        self.session()?.export(format, path, self.note_width)
    }
}

fn not_logged_in() -> Error {
    Error::msg(ErrorType::NotLoggedIn, "Please log in first")
}
