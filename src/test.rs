//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::{Config, Controller};
use chrono::NaiveDate;
use std::path::Path;
use tempfile::TempDir;

/// Test environment that sets up an expense home directory with a config and a credential file.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::create(temp_dir.path().join("expenses")).unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// The date the monthly total refers to in tests.
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
    }

    /// A logged-out controller whose reference month is February 2024.
    pub fn controller(&self) -> Controller {
        Controller::new(&self.config).with_reference_date(Self::today())
    }

    pub fn register(&self, username: &str, secret: &str) {
        self.config.accounts().register(username, secret).unwrap();
    }

    /// Replaces the ledger file of `username` with `content`.
    pub fn write_ledger(&self, username: &str, content: &str) {
        std::fs::write(self.config.storage().path(username), content).unwrap();
    }
}
