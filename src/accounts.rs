//! The credential file behind the login gate.
//!
//! The file holds one `username:secret` line per account. Registration appends a line and login
//! scans the lines in order. Lines without a `:` are ignored. Secrets are stored as given.

use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::fs;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The default name of the credential file inside the home directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "users.txt";

const SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accounts {
    path: PathBuf,
}

impl Accounts {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty credential file if there is none.
    ///
    /// # Errors
    /// - `ErrorType::Config` if the file cannot be created. Nothing works without it.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.is_file() {
            return Ok(());
        }
        fs::write(&self.path, "")
            .context("Unable to create the credential file")
            .pub_result(ErrorType::Config)?;
        debug!("Created credential file {}", self.path.display());
        Ok(())
    }

    /// Adds an account. Surrounding whitespace is removed from both values. Returns the username
    /// as stored.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if either value is empty, if the username contains `:`, a path
    ///   separator or a control character, or if the secret contains a control character.
    /// - `ErrorType::DuplicateAccount` if the username is taken. The file is left untouched.
    /// - `ErrorType::StorageWrite` if the file cannot be appended to.
    pub fn register(&self, username: &str, secret: &str) -> Result<String> {
        let (username, secret) = check_input(username, secret)?;
        validate_username(username)?;
        if secret.chars().any(char::is_control) {
            return Err(Error::msg(
                ErrorType::Validation,
                "The password must not contain control characters",
            ));
        }
        let existing = self.entries().pub_result(ErrorType::StorageRead)?;
        if existing.iter().any(|(name, _)| name == username) {
            return Err(Error::msg(
                ErrorType::DuplicateAccount,
                format!("Username '{username}' already exists"),
            ));
        }
        fs::append(&self.path, format!("{username}{SEPARATOR}{secret}\n"))
            .context("Unable to register the account")
            .pub_result(ErrorType::StorageWrite)?;
        info!("Registered account '{username}'");
        Ok(username.to_string())
    }

    /// Checks `username` and `secret` against the file. Returns the matching username.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if either value is empty.
    /// - `ErrorType::Authentication` if no line matches both.
    pub fn verify(&self, username: &str, secret: &str) -> Result<String> {
        let (username, secret) = check_input(username, secret)?;
        let entries = self.entries().pub_result(ErrorType::StorageRead)?;
        if entries.iter().any(|(u, s)| u == username && s == secret) {
            Ok(username.to_string())
        } else {
            Err(Error::msg(
                ErrorType::Authentication,
                "Incorrect username or password",
            ))
        }
    }

    /// All registered usernames in file order.
    pub fn usernames(&self) -> Result<Vec<String>> {
        let entries = self.entries().pub_result(ErrorType::StorageRead)?;
        Ok(entries.into_iter().map(|(u, _)| u).collect())
    }

    fn entries(&self) -> Res<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter_map(|line| line.trim().split_once(SEPARATOR))
            .map(|(u, s)| (u.to_string(), s.to_string()))
            .collect())
    }
}

fn check_input<'a>(username: &'a str, secret: &'a str) -> Result<(&'a str, &'a str)> {
    let (username, secret) = (username.trim(), secret.trim());
    if username.is_empty() || secret.is_empty() {
        return Err(Error::msg(
            ErrorType::Validation,
            "Please enter both username and password",
        ));
    }
    Ok((username, secret))
}

fn validate_username(username: &str) -> Result<()> {
    let bad = username
        .chars()
        .find(|c| *c == SEPARATOR || std::path::is_separator(*c) || c.is_control());
    match bad {
        Some(c) => Err(Error::msg(
            ErrorType::Validation,
            format!("The username must not contain {c:?}"),
        )),
        None => Ok(()),
    }
}
