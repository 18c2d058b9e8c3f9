//! Configuration file handling.
//!
//! The configuration file is stored at `$BUDGET_HOME/config.json` and carries
//! the ingestion policy knobs that were historically hard-coded into the
//! spreadsheet template: the income anchor cell, the income fallback ratio
//! and the year assumed for defaulted dates.

use crate::{utils, Result};
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const APP_NAME: &str = "budget";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA_DIR: &str = "data";

/// Year used when a defaulted date has no other source.
const DEFAULT_YEAR: i32 = 2025;

/// Zero-indexed cell on the first sheet holding the month's income figure.
/// The historical template keeps it at O3.
const DEFAULT_INCOME_ANCHOR: CellRef = CellRef { row: 2, col: 14 };

/// Multiplier applied to regular expenses when the anchor cell is unusable.
/// A heuristic inherited from the template, not a measured value.
const DEFAULT_INCOME_FALLBACK_RATIO: &str = "1.5";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$BUDGET_HOME` and from there it
/// loads `$BUDGET_HOME/config.json`. It provides the data directory path and
/// the ingestion policy values.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    data_dir: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its data subdirectory, and an initial
    /// `config.json` with default policy settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the budget home,
    ///   e.g. `$HOME/budget`
    ///
    /// # Errors
    /// - Returns an error if any file operation fails.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative).context("Unable to create the budget home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_file = ConfigFile::default();
        let data_dir = root.join(config_file.data_dir());
        utils::make_dir(&data_dir)?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path)?;

        Ok(Self {
            root,
            config_path,
            data_dir,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the data directory exists
    /// - return the loaded configuration object
    pub fn load(budget_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = budget_home.into();
        let root = utils::canonicalize(&maybe_relative).context("Budget home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path)?;

        let data_dir = root.join(config_file.data_dir());
        if !data_dir.is_dir() {
            bail!("The data directory is missing '{}'", data_dir.display())
        }

        Ok(Self {
            root,
            config_path,
            data_dir,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The directory scanned for monthly `.xlsx` files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn default_year(&self) -> i32 {
        self.config_file.default_year
    }

    pub fn income_anchor(&self) -> CellRef {
        self.config_file.income_anchor
    }

    pub fn income_fallback_ratio(&self) -> Decimal {
        self.config_file.income_fallback_ratio
    }
}

/// A zero-indexed (row, column) cell position on a sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

/// Represents the serialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget",
///   "config_version": 1,
///   "data_dir": "data",
///   "default_year": 2025,
///   "income_anchor": { "row": 2, "col": 14 },
///   "income_fallback_ratio": "1.5"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "budget"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Directory holding the monthly workbooks, relative to the home
    /// directory unless absolute
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,

    /// Year assumed when filling defaulted dates
    #[serde(default = "default_year")]
    default_year: i32,

    /// Zero-indexed cell on the first sheet carrying the month's income
    #[serde(default = "default_income_anchor")]
    income_anchor: CellRef,

    /// Expense multiplier used when the income anchor cell is unusable,
    /// written as a quoted decimal string
    #[serde(default = "default_income_fallback_ratio")]
    income_fallback_ratio: Decimal,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR)
}

fn default_year() -> i32 {
    DEFAULT_YEAR
}

fn default_income_anchor() -> CellRef {
    DEFAULT_INCOME_ANCHOR
}

fn default_income_fallback_ratio() -> Decimal {
    // The literal is a compile-time constant spelling; parsing cannot fail.
    Decimal::from_str(DEFAULT_INCOME_FALLBACK_RATIO).unwrap_or(Decimal::ONE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            data_dir: default_data_dir(),
            default_year: default_year(),
            income_anchor: default_income_anchor(),
            income_fallback_ratio: default_income_fallback_ratio(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).context("Unable to write config file")
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
