//! The logged-in state of one user.
//!
//! A [`Session`] owns the user's [`RecordStore`] and is the only thing that mutates it. Every
//! mutation runs the same sequence: validate, mutate, save, aggregate, project, notify. A failed
//! validation stops before anything changes. A failed save does not undo the mutation; the
//! summaries and the view are still refreshed and subscribers are told about the failure.
//!
//! Subscribers are plain closures that receive [`SessionEvent`]s. They are shared between the
//! sessions a [`crate::Controller`] opens, so a front end subscribes once.

use crate::aggregate::AggregateView;
use crate::error::{Error, ErrorType, Result};
use crate::export::{self, ExportFormat};
use crate::model::{Categories, ExpenseDraft, ExpensePatch, ExpenseRecord, RecordId};
use crate::storage::Storage;
use crate::store::{self, RecordStore};
use crate::view::{DisplayRow, Filter, View};
use chrono::{Local, NaiveDate};
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Something subscribers are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was opened and the user's ledger was loaded.
    Opened { user: String, records: usize },
    /// The store was mutated or reloaded.
    StoreChanged { len: usize },
    AggregatesChanged(AggregateView),
    /// The displayed rows were recomputed.
    ViewChanged { rows: usize },
    /// The store was mutated but could not be saved.
    FlushFailed(String),
    /// The ledger exists but could not be read. The session continues with an empty store.
    LoadFailed(String),
    Closed { user: String },
}

pub type Observer = Box<dyn FnMut(&SessionEvent)>;

/// The list of subscribers. Clones share the same list.
#[derive(Clone, Default)]
pub struct Subscribers {
    observers: Rc<RefCell<Vec<Observer>>>,
}

impl Subscribers {
    pub fn subscribe<F>(&self, observer: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn notify(&self, event: SessionEvent) {
        for observer in self.observers.borrow_mut().iter_mut() {
            observer(&event);
        }
    }
}

impl Debug for Subscribers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscribers({})", self.len())
    }
}

/// What a session needs besides the username.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub storage: Storage,
    pub categories: Categories,
    /// Pins the date that picks the month of the monthly total. The local date is used when
    /// `None`.
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct Session {
    user: String,
    store: RecordStore,
    settings: SessionSettings,
    filter: Filter,
    view: View,
    aggregates: AggregateView,
    subscribers: Subscribers,
    load_failed: bool,
    mutated: bool,
    /// Ids were given to rows loaded without one and are not in the file yet.
    unsaved_ids: bool,
}

impl Session {
    /// Opens a session for `user` and loads the user's ledger.
    ///
    /// A ledger that cannot be read does not prevent the session from opening. Subscribers get a
    /// `LoadFailed` event, the store starts empty, and the unreadable file is left alone unless
    /// the user changes something.
    pub fn open(
        user: impl Into<String>,
        settings: SessionSettings,
        subscribers: Subscribers,
    ) -> Self {
        let user = user.into();
        let today = reference_date(&settings);
        let mut session = Self {
            user,
            store: RecordStore::new(),
            filter: Filter::All,
            view: View::default(),
            aggregates: AggregateView::compute(no_records(), no_records(), today),
            settings,
            subscribers,
            load_failed: false,
            mutated: false,
            unsaved_ids: false,
        };
        if let Err(e) = session.load() {
            warn!("Starting with an empty ledger for '{}': {e}", session.user);
            session.load_failed = true;
            session.subscribers.notify(SessionEvent::LoadFailed(e.to_string()));
        }
        session.refresh();
        info!("Opened session for '{}' with {} records", session.user, session.store.len());
        session.subscribers.notify(SessionEvent::Opened {
            user: session.user.clone(),
            records: session.store.len(),
        });
        session
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        self.store.records()
    }

    pub fn snapshot(&self) -> Vec<ExpenseRecord> {
        self.store.snapshot()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn rows(&self) -> &[DisplayRow] {
        self.view.rows()
    }

    pub fn aggregates(&self) -> &AggregateView {
        &self.aggregates
    }

    pub fn categories(&self) -> &Categories {
        &self.settings.categories
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.settings.storage.path(&self.user)
    }

    /// Whether the ledger could not be read when the session was opened.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Whether a command changed the records since the session was opened.
    pub fn mutated(&self) -> bool {
        self.mutated
    }

    /// Validates `draft` and appends it.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the draft is invalid. Nothing changes.
    /// - `ErrorType::StorageWrite` if the record was added but could not be saved.
    pub fn add(&mut self, draft: &ExpenseDraft) -> Result<RecordId> {
        let expense = draft.validate(&self.settings.categories)?;
        let id = self.store.append(expense);
        debug!("Added expense {id}");
        self.commit()?;
        Ok(id)
    }

    /// Applies `patch` to the record with `id`.
    ///
    /// # Errors
    /// - `ErrorType::RecordNotFound` if there is no such record.
    /// - `ErrorType::Validation` if the patch is invalid. Nothing changes.
    /// - `ErrorType::StorageWrite` if the record was changed but could not be saved.
    pub fn edit(&mut self, id: RecordId, patch: &ExpensePatch) -> Result<()> {
        let current = self.store.get(id).ok_or_else(|| store::not_found(id))?;
        let updated = patch.apply(current.expense(), &self.settings.categories)?;
        self.store.replace(id, updated)?;
        debug!("Edited expense {id}");
        self.commit()
    }

    /// Removes the record with `id` and returns it.
    ///
    /// # Errors
    /// - `ErrorType::RecordNotFound` if there is no such record.
    /// - `ErrorType::StorageWrite` if the record was removed but the removal could not be saved.
    pub fn delete(&mut self, id: RecordId) -> Result<ExpenseRecord> {
        let removed = self.store.remove(id)?;
        debug!("Deleted expense {id}");
        self.commit()?;
        Ok(removed)
    }

    /// Like [`Session::edit`], addressing the record by its position in the current view.
    pub fn edit_at(&mut self, position: usize, patch: &ExpensePatch) -> Result<()> {
        let id = self.id_at(position)?;
        self.edit(id, patch)
    }

    /// Like [`Session::delete`], addressing the record by its position in the current view.
    pub fn delete_at(&mut self, position: usize) -> Result<ExpenseRecord> {
        let id = self.id_at(position)?;
        self.delete(id)
    }

    /// Shows only the records selected by `filter`. Storage is not touched.
    pub fn set_filter(&mut self, filter: Filter) {
        debug!("Filter set to {filter}");
        self.filter = filter;
        self.refresh();
    }

    /// Shows every record again.
    pub fn clear_filter(&mut self) {
        self.set_filter(Filter::All);
    }

    /// Replaces the store with the content of the ledger file.
    ///
    /// # Errors
    /// - `ErrorType::StorageRead` if the file cannot be read. The store is unchanged.
    pub fn reload(&mut self) -> Result<()> {
        if let Err(e) = self.load() {
            self.subscribers.notify(SessionEvent::LoadFailed(e.to_string()));
            return Err(e);
        }
        self.load_failed = false;
        self.subscribers.notify(SessionEvent::StoreChanged {
            len: self.store.len(),
        });
        self.refresh();
        Ok(())
    }

    /// Exports the rows currently on display.
    pub fn export(&self, format: ExportFormat, path: &Path, note_width: usize) -> Result<usize> {
        export::export(format, self.view.rows(), path, note_width)
    }

    /// Ends the session with a final save.
    ///
    /// The save is skipped when nothing was changed and every record already has its id in the
    /// file. In particular an unreadable ledger is not replaced by an empty one.
    pub fn close(self) -> Result<()> {
        let result = if !self.mutated && !self.unsaved_ids {
            if self.load_failed {
                warn!(
                    "Not saving the ledger for '{}' because it could not be read",
                    self.user
                );
            } else {
                debug!("The ledger for '{}' has no changes to save", self.user);
            }
            Ok(())
        } else {
            self.settings.storage.save(&self.user, self.store.records())
        };
        if let Err(e) = &result {
            self.subscribers.notify(SessionEvent::FlushFailed(e.to_string()));
        }
        info!("Closed session for '{}'", self.user);
        self.subscribers.notify(SessionEvent::Closed {
            user: self.user.clone(),
        });
        result
    }

    fn load(&mut self) -> Result<()> {
        let report = self.settings.storage.load(&self.user)?;
        if report.coerced > 0 {
            warn!(
                "{} amounts in the ledger of '{}' were not numbers and were read as 0",
                report.coerced, self.user
            );
        }
        let fresh_ids = self.store.replace_all(report.rows);
        self.unsaved_ids = fresh_ids > 0;
        Ok(())
    }

    /// Saves after a mutation, then refreshes the summaries and the view.
    fn commit(&mut self) -> Result<()> {
        self.mutated = true;
        let saved = self.settings.storage.save(&self.user, self.store.records());
        if saved.is_ok() {
            self.unsaved_ids = false;
        }
        self.subscribers.notify(SessionEvent::StoreChanged {
            len: self.store.len(),
        });
        self.refresh();
        if let Err(e) = &saved {
            warn!("The change is kept in memory but was not saved: {e}");
            self.subscribers.notify(SessionEvent::FlushFailed(e.to_string()));
        }
        saved
    }

    fn refresh(&mut self) {
        let today = reference_date(&self.settings);
        let visible = self.filter.apply(self.store.records());
        self.aggregates =
            AggregateView::compute(self.store.records(), visible.iter().copied(), today);
        self.view = View::new(visible);
        self.subscribers
            .notify(SessionEvent::AggregatesChanged(self.aggregates.clone()));
        self.subscribers.notify(SessionEvent::ViewChanged {
            rows: self.view.len(),
        });
    }

    fn id_at(&self, position: usize) -> Result<RecordId> {
        self.view.id_at(position).ok_or_else(|| {
            Error::msg(
                ErrorType::IndexOutOfRange,
                format!(
                    "No expense is shown at position {position}, {} rows are shown",
                    self.view.len()
                ),
            )
        })
    }
}

fn no_records<'a>() -> std::iter::Empty<&'a ExpenseRecord> {
    std::iter::empty()
}

fn reference_date(settings: &SessionSettings) -> NaiveDate {
    settings
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive())
}
