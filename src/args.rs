//! These structs provide the CLI interface for the budget CLI.

use crate::model::{Amount, Label};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// budget: ingest monthly spreadsheets into a normalized budget dataset.
///
/// The purpose of this program is to load a directory of monthly `.xlsx`
/// workbooks, normalize their transactions into one dataset, and serve that
/// dataset to consumers: a month summary printed here, a CSV export, or an
/// embedding dashboard.
///
/// Run `budget init` once to create the home directory, drop monthly files
/// (Jan.xlsx, Feb.xlsx, ...) into its data directory or add them with
/// `budget add`, then `budget load`.
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
    /// Create the home directory and initialize the configuration file.
    ///
    /// This is the first command you should run. The config file it writes
    /// carries the ingestion policy settings (income anchor cell, income
    /// fallback ratio, default year) which you can edit afterwards.
    Init,
    /// Reload every monthly workbook and print the month summaries.
    Load,
    /// Reload and write the transaction corpus to a CSV file.
    Export(ExportArgs),
    /// Change the label on transactions, by composite key or by category.
    Relabel(RelabelArgs),
    /// Copy workbook files into the data directory.
    Add(AddArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where budget data and configuration is held.
    /// Defaults to ~/budget
    #[arg(long, env = "BUDGET_HOME", default_value_t = default_budget_home())]
    budget_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, budget_home: PathBuf) -> Self {
        Self {
            log_level,
            budget_home: budget_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn budget_home(&self) -> &DisplayPath {
        &self.budget_home
    }
}

/// Args for the `budget export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Where to write the CSV file.
    #[arg(long, short = 'o', default_value = "transactions.csv")]
    out: PathBuf,
}

impl ExportArgs {
    pub fn new(out: impl Into<PathBuf>) -> Self {
        Self { out: out.into() }
    }

    pub fn out(&self) -> &Path {
        &self.out
    }
}

/// Args for the `budget relabel` command.
///
/// Either select one transaction by the full composite key (`--date`,
/// `--description`, `--amount`, `--who`), or every transaction in a category
/// with `--category`.
#[derive(Debug, Parser, Clone)]
pub struct RelabelArgs {
    /// The label to apply: Needs, Wants, Luxury, Savings, Investment, or an
    /// empty string to clear.
    #[arg(long)]
    label: Label,

    /// Select every transaction in this category.
    #[arg(long, conflicts_with_all = ["date", "description", "amount", "who"])]
    category: Option<String>,

    /// Transaction date, e.g. 2025-01-05
    #[arg(long, requires = "description", requires = "amount", requires = "who")]
    date: Option<NaiveDate>,

    /// Transaction description, matched exactly.
    #[arg(long)]
    description: Option<String>,

    /// Transaction amount, e.g. 500 or 512.50
    #[arg(long)]
    amount: Option<Amount>,

    /// Who made the transaction.
    #[arg(long)]
    who: Option<String>,

    /// Optionally write the edited corpus to this CSV file.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

impl RelabelArgs {
    pub fn new_by_category(category: impl Into<String>, label: Label) -> Self {
        Self {
            label,
            category: Some(category.into()),
            date: None,
            description: None,
            amount: None,
            who: None,
            out: None,
        }
    }

    pub fn new_by_key(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        who: impl Into<String>,
        label: Label,
    ) -> Self {
        Self {
            label,
            category: None,
            date: Some(date),
            description: Some(description.into()),
            amount: Some(amount),
            who: Some(who.into()),
            out: None,
        }
    }

    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        self.out = Some(out.into());
        self
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn who(&self) -> Option<&str> {
        self.who.as_deref()
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// Args for the `budget add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The workbook files to copy into the data directory.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl AddArgs {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn default_budget_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --budget-home or BUDGET_HOME instead of relying on the default \
                budget home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("budget")
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
