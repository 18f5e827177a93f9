//! The public error type.
//!
//! Internally the crate works with `anyhow` and attaches context as errors bubble up. At the
//! boundary of each component the `anyhow::Error` is wrapped into an [`Error`] that carries an
//! [`ErrorType`], so that callers (the CLI, tests, any other front end) can decide how to react
//! without string matching.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{Debug, Display, Formatter};

/// The result type used inside the crate.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The result type returned across the public API.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies a failure so that the front end can decide how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// User input was rejected before anything was mutated.
    Validation,
    /// The ledger could not be written. In-memory state is retained.
    StorageWrite,
    /// The ledger exists but could not be read.
    StorageRead,
    /// A positional address was outside of the store.
    IndexOutOfRange,
    /// A record id does not exist in the store.
    RecordNotFound,
    /// Registration with a username that is already taken.
    DuplicateAccount,
    /// The username or secret did not match.
    Authentication,
    /// A command that needs an active session was issued while logged out.
    NotLoggedIn,
    /// The configuration or home directory is missing or invalid.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error with a classification and an `anyhow` source chain.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    /// Wraps `source` with `error_type`. If `source` already is an [`Error`], it is returned
    /// unchanged so that the innermost classification wins.
    pub fn new(error_type: ErrorType, source: impl Into<anyhow::Error>) -> Self {
        match source.into().downcast::<Error>() {
            Ok(inner) => inner,
            Err(source) => Self { error_type, source },
        }
    }

    /// Creates an error from a plain message.
    pub fn msg<M>(error_type: ErrorType, message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self {
            error_type,
            source: anyhow::Error::msg(message),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("error_type", &self.error_type)
            .field("source", &self.source)
            .finish()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Converts an internal result into a public [`Result`] with the given classification.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
