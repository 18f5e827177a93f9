//! These structs provide the CLI interface for the expense CLI.

use crate::export::ExportFormat;
use crate::model::{ExpenseDate, ExpenseDraft, ExpensePatch, RecordId};
use crate::view::Filter;
use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expense: A personal expense ledger for the command line.
///
/// Every user has their own ledger file in the expense home directory. Register once, then pass
/// --user and --password (or set EXPENSE_USER and EXPENSE_PASSWORD) to add, edit, delete, list,
/// summarize and export your expenses.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory, the configuration file and the credential file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/expenses; pass --home or set EXPENSE_HOME to put it somewhere else. Running it again
    /// keeps an existing configuration.
    Init,
    /// Create an account and an empty ledger for it.
    Register(LoginArgs),
    /// Add an expense.
    Add(AddArgs),
    /// Change some fields of an expense.
    Edit(EditArgs),
    /// Delete an expense.
    Delete(DeleteArgs),
    /// List expenses, optionally filtered.
    List(ListArgs),
    /// Show the total for a month, the current month by default.
    Total(TotalArgs),
    /// Show the totals per category and per month.
    Analytics(LoginArgs),
    /// Export the listed expenses as CSV or as a printable report.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration, the credential file and the ledgers are held.
    /// Defaults to ~/expenses
    #[arg(long, env = "EXPENSE_HOME", default_value_t = default_expense_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// The credentials of the account a command acts on.
#[derive(Debug, ClapArgs, Clone)]
pub struct LoginArgs {
    /// The username.
    #[arg(long, env = "EXPENSE_USER")]
    user: String,

    /// The password.
    #[arg(long, env = "EXPENSE_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `expense add` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct AddArgs {
    #[clap(flatten)]
    login: LoginArgs,

    /// The date as MM/DD/YY or YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// One of Food, Transport, Bills-Card, Shopping, Bills-Electricity, Other, or a category from
    /// extra_categories in the config.
    #[arg(long, default_value = "Food")]
    category: String,

    /// The amount, e.g. 250 or 12.50.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// A free text note.
    #[arg(long, default_value = "")]
    note: String,
}

impl AddArgs {
    pub fn new(login: LoginArgs, draft: ExpenseDraft) -> Self {
        Self {
            login,
            date: Some(draft.date),
            category: draft.category,
            amount: draft.amount,
            note: draft.note,
        }
    }

    pub fn login(&self) -> &LoginArgs {
        &self.login
    }

    /// The unvalidated expense. A missing date becomes today's date.
    pub fn draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            date: self
                .date
                .clone()
                .unwrap_or_else(|| ExpenseDate::from_naive(Local::now().date_naive()).to_string()),
            category: self.category.clone(),
            amount: self.amount.clone(),
            note: self.note.clone(),
        }
    }
}

/// (Not shown): Args for the `expense edit` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct EditArgs {
    #[clap(flatten)]
    login: LoginArgs,

    /// The ID of the expense, as shown by `expense list`.
    id: RecordId,

    /// The new date as MM/DD/YY or YYYY-MM-DD.
    #[arg(long)]
    date: Option<String>,

    /// The new category.
    #[arg(long)]
    category: Option<String>,

    /// The new amount.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    /// The new note. Pass an empty string to clear it.
    #[arg(long)]
    note: Option<String>,
}

impl EditArgs {
    pub fn new(login: LoginArgs, id: RecordId, patch: ExpensePatch) -> Self {
        Self {
            login,
            id,
            date: patch.date,
            category: patch.category,
            amount: patch.amount,
            note: patch.note,
        }
    }

    pub fn login(&self) -> &LoginArgs {
        &self.login
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn patch(&self) -> ExpensePatch {
        ExpensePatch {
            date: self.date.clone(),
            category: self.category.clone(),
            amount: self.amount.clone(),
            note: self.note.clone(),
        }
    }
}

/// (Not shown): Args for the `expense delete` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct DeleteArgs {
    #[clap(flatten)]
    login: LoginArgs,

    /// The ID of the expense, as shown by `expense list`.
    id: RecordId,
}

impl DeleteArgs {
    pub fn new(login: LoginArgs, id: RecordId) -> Self {
        Self { login, id }
    }

    pub fn login(&self) -> &LoginArgs {
        &self.login
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
}

/// Selects the expenses that are listed or exported.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct FilterArgs {
    /// Only expenses whose category or note contains this text, ignoring case.
    #[arg(long, conflicts_with = "date")]
    keyword: Option<String>,

    /// Only expenses on this date, MM/DD/YY or YYYY-MM-DD.
    #[arg(long)]
    date: Option<String>,
}

impl FilterArgs {
    pub fn new(keyword: Option<String>, date: Option<String>) -> Self {
        Self { keyword, date }
    }

    pub fn filter(&self) -> Filter {
        match (&self.keyword, &self.date) {
            (Some(keyword), _) => Filter::Keyword(keyword.clone()),
            (None, Some(date)) => Filter::Date(ExpenseDate::normalize_or_verbatim(date)),
            (None, None) => Filter::All,
        }
    }
}

/// (Not shown): Args for the `expense list` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    login: LoginArgs,

    #[clap(flatten)]
    filter: FilterArgs,
}

impl ListArgs {
    pub fn new(login: LoginArgs, filter: FilterArgs) -> Self {
        Self { login, filter }
    }

    pub fn login(&self) -> &LoginArgs {
        &self.login
    }

    pub fn filter(&self) -> Filter {
        self.filter.filter()
    }
}

/// (Not shown): Args for the `expense total` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct TotalArgs {
    #[clap(flatten)]
    login: LoginArgs,

    /// The month, 1 to 12.
    #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// The four digit year.
    #[arg(long, requires = "month")]
    year: Option<i32>,
}

impl TotalArgs {
    pub fn new(login: LoginArgs, month: Option<u32>, year: Option<i32>) -> Self {
        Self { login, month, year }
    }

    pub fn login(&self) -> &LoginArgs {
        &self.login
    }

    /// `Some((month, year))` when both were given.
    pub fn month_year(&self) -> Option<(u32, i32)> {
        self.month.zip(self.year)
    }
}

/// (Not shown): Args for the `expense export` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    login: LoginArgs,

    /// The output format.
    format: ExportFormat,

    /// The file to write. It is overwritten if it exists.
    path: PathBuf,

    #[clap(flatten)]
    filter: FilterArgs,
}

impl ExportArgs {
    pub fn new(login: LoginArgs, format: ExportFormat, path: PathBuf, filter: FilterArgs) -> Self {
        Self {
            login,
            format,
            path,
            filter,
        }
    }

    pub fn login(&self) -> &LoginArgs {
        &self.login
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filter(&self) -> Filter {
        self.filter.filter()
    }
}

fn default_expense_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or EXPENSE_HOME instead of relying on the default \
                expense home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
