//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSE_HOME/config.json`. It names the currency, any
//! categories beyond the built-in ones, and where the credential file and the per-user ledgers
//! live within the home directory.

use crate::accounts::{Accounts, DEFAULT_CREDENTIALS_FILE};
use crate::error::{ErrorType, IntoResult, Res, Result};
use crate::export::DEFAULT_NOTE_WIDTH;
use crate::fs;
use crate::model::Categories;
use crate::storage::{Storage, DEFAULT_LEDGER_PREFIX};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_NAME: &str = "expense";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_CURRENCY: &str = "₹";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_HOME` and from there it loads `$EXPENSE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, an initial `config.json` and an empty credential file.
    ///
    /// An existing configuration is validated and kept as it is.
    ///
    /// # Errors
    /// - `ErrorType::Config` if any file operation fails or an existing config is invalid.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        create_inner(dir.into()).pub_result(ErrorType::Config)
    }

    /// Loads `config.json` from `home` and makes sure the credential file exists.
    ///
    /// # Errors
    /// - `ErrorType::Config` if the home directory or the config file is missing or invalid, or
    ///   if the credential file cannot be created.
    pub fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let config = load_inner(home.into()).pub_result(ErrorType::Config)?;
        config.accounts().ensure_exists()?;
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    pub fn ledger_prefix(&self) -> &str {
        &self.config_file.ledger_prefix
    }

    pub fn report_note_width(&self) -> usize {
        self.config_file.report_note_width
    }

    /// The built-in categories plus `extra_categories`.
    pub fn categories(&self) -> Categories {
        Categories::new(self.config_file.extra_categories.iter().cloned())
    }

    /// Returns the stored `credentials_file` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn credentials_path(&self) -> PathBuf {
        let p = &self.config_file.credentials_file;
        if p.is_absolute() {
            return p.clone();
        }
        self.root.join(p)
    }

    pub fn accounts(&self) -> Accounts {
        Accounts::new(self.credentials_path())
    }

    /// Ledgers live directly in the home directory.
    pub fn storage(&self) -> Storage {
        Storage::new(&self.root, self.ledger_prefix())
    }
}

fn create_inner(dir: PathBuf) -> Res<Config> {
    fs::create_dir_all(&dir).context("Unable to create the expense home directory")?;
    let root = fs::canonicalize(&dir)?;
    let config_path = root.join(CONFIG_JSON);

    let config_file = if config_path.is_file() {
        info!("Keeping the existing config at {}", config_path.display());
        ConfigFile::load(&config_path)?
    } else {
        let config_file = ConfigFile::default();
        config_file.save(&config_path)?;
        debug!("Wrote {}", config_path.display());
        config_file
    };

    let config = Config {
        root,
        config_path,
        config_file,
    };
    config.accounts().ensure_exists()?;
    Ok(config)
}

fn load_inner(home: PathBuf) -> Res<Config> {
    let root = fs::canonicalize(&home)
        .context("The expense home directory is missing, run `expense init` first")?;
    let config_path = root.join(CONFIG_JSON);
    if !config_path.is_file() {
        bail!(
            "The config file is missing '{}', run `expense init` first",
            config_path.display()
        )
    }
    let config_file = ConfigFile::load(&config_path)?;
    Ok(Config {
        root,
        config_path,
        config_file,
    })
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense",
///   "config_version": 1,
///   "currency": "₹",
///   "extra_categories": ["Rent", "Health"],
///   "ledger_prefix": "expenses_",
///   "credentials_file": "users.txt",
///   "report_note_width": 38
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Symbol printed in front of totals
    #[serde(default = "default_currency")]
    currency: String,

    /// Categories offered in addition to the built-in ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extra_categories: Vec<String>,

    /// Ledger files are named `<ledger_prefix><username>.csv`
    #[serde(default = "default_ledger_prefix")]
    ledger_prefix: String,

    /// Path to the credential file, relative to the home directory or absolute
    #[serde(default = "default_credentials_file")]
    credentials_file: PathBuf,

    /// Number of note characters kept in the printable report
    #[serde(default = "default_report_note_width")]
    report_note_width: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency: default_currency(),
            extra_categories: Vec::new(),
            ledger_prefix: default_ledger_prefix(),
            credentials_file: default_credentials_file(),
            report_note_width: default_report_note_width(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            !config.ledger_prefix.contains(std::path::is_separator),
            "Invalid ledger_prefix in config file: '{}' contains a path separator",
            config.ledger_prefix
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        fs::write(p, data).context("Unable to write config file")
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_ledger_prefix() -> String {
    DEFAULT_LEDGER_PREFIX.to_string()
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_FILE)
}

fn default_report_note_width() -> usize {
    DEFAULT_NOTE_WIDTH
}
