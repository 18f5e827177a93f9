mod accounts;
pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod controller;
mod error;
pub mod export;
mod fs;
pub mod model;
pub mod session;
pub mod storage;
pub mod store;
#[cfg(test)]
mod test;
pub mod view;

pub use accounts::Accounts;
pub use config::Config;
pub use controller::{Controller, SessionState};
pub use error::{Error, ErrorType, Result};
pub use session::{Session, SessionEvent, SessionSettings, Subscribers};
