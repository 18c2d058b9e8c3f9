//! The ingestion pipeline: file discovery, per-file reading and
//! normalization, and the batch driver that feeds the aggregator.
//!
//! No per-file failure escapes the batch loop. Every failure is converted to
//! an [`IngestionError`](crate::dataset::IngestionError) naming the file, and
//! the remaining files still load.

mod normalize;
mod workbook;

pub use normalize::normalize;
pub use workbook::{MissingSheetError, RawRow, RawValue, Workbook};

use crate::config::Config;
use crate::dataset::{Dataset, IngestionError, MonthSummary};
use crate::model::{Month, Transaction};
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reference workbooks kept in the data directory for download; never
/// ingested as data.
pub const TEMPLATE_FILES: [&str; 2] = ["Template.xlsx", "BlankTemplate.xlsx"];

const XLSX_EXT: &str = "xlsx";

/// Lists the monthly workbooks in the data directory, resolved and in
/// processing order: chronological by month rank, unrecognized stems last.
pub fn discover_files(data_dir: &Path) -> Result<Vec<(PathBuf, Month)>> {
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Unable to read data directory {}", data_dir.display()))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Unable to read entry in {}", data_dir.display()))?
            .path();
        let is_xlsx = path
            .extension()
            .map(|e| e == XLSX_EXT)
            .unwrap_or(false);
        let is_template = path
            .file_name()
            .map(|n| TEMPLATE_FILES.iter().any(|t| n == *t))
            .unwrap_or(false);
        if path.is_file() && is_xlsx && !is_template {
            files.push(path);
        }
    }

    // Directory iteration order is platform-dependent; sort by name first so
    // repeated loads of the same directory are identical, then stable-sort
    // into chronological order.
    files.sort();
    let mut resolved: Vec<(PathBuf, Month)> = files
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let month = Month::resolve(stem);
            (path, month)
        })
        .collect();
    resolved.sort_by_key(|(_, month)| month.rank());
    Ok(resolved)
}

/// Loads every monthly workbook and builds the dataset snapshot.
///
/// This never fails as a whole: per-file problems land in the dataset's
/// error ledger and the batch continues. A batch that produced no data at
/// all yields empty-but-well-shaped structures with a non-empty ledger.
pub fn load_all(config: &Config) -> Dataset {
    info!("Loading data from {}", config.data_dir().display());

    let mut errors: Vec<IngestionError> = Vec::new();
    let files = match discover_files(config.data_dir()) {
        Ok(files) => files,
        Err(e) => {
            errors.push(IngestionError::new(config.data_dir(), &e));
            return Dataset::aggregate(&[], Vec::new(), errors);
        }
    };

    let months: Vec<Month> = files.iter().map(|(_, month)| month.clone()).collect();
    let mut loads: Vec<(Vec<Transaction>, MonthSummary)> = Vec::new();
    for (path, month) in &files {
        info!("Processing {}", path.display());
        match load_file(path, month, config) {
            Ok(load) => loads.push(load),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                errors.push(IngestionError::new(path, &e));
            }
        }
    }

    Dataset::aggregate(&months, loads, errors)
}

/// Reads and normalizes one workbook. Any `Err` here fails only this file.
fn load_file(
    path: &Path,
    month: &Month,
    config: &Config,
) -> Result<(Vec<Transaction>, MonthSummary)> {
    let mut workbook = Workbook::open(path)?;
    let (rows, sheet_name) = workbook.transaction_rows()?;
    debug!("Reading sheet: {sheet_name}");
    let anchor_income = workbook.income_anchor(config.income_anchor());
    normalize(rows, month, anchor_income, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;
    use crate::test::{test_config, SheetFixture};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn write_month(config: &Config, stem: &str, rows: Vec<Vec<&str>>) {
        let mut data = vec![vec!["Category", "Amount", "Label"]];
        data.extend(rows);
        SheetFixture::new()
            .sheet("Summary", vec![vec!["overview"]])
            .sheet("Transactions", data)
            .save(&config.data_dir().join(format!("{stem}.xlsx")))
    }

    #[test]
    fn test_discover_excludes_templates_and_sorts() {
        let (_dir, config) = test_config();
        for stem in ["Mar", "Jan", "Template", "BlankTemplate", "Foo"] {
            write_month(&config, stem, vec![vec!["Rent", "100", "N"]]);
        }
        std::fs::write(config.data_dir().join("notes.txt"), "skip me").unwrap();

        let files = discover_files(config.data_dir()).unwrap();
        let names: Vec<&str> = files.iter().map(|(_, m)| m.name()).collect();
        assert_eq!(names, vec!["January", "March", "Foo"]);
    }

    #[test]
    fn test_load_all_merges_valid_files() {
        let (_dir, config) = test_config();
        write_month(
            &config,
            "Jan",
            vec![vec!["Groceries", "500", "N"], vec!["Investment - SIP", "1000", ""]],
        );
        write_month(&config, "Feb", vec![vec!["Rent", "900", "N"]]);

        let dataset = load_all(&config);
        assert!(dataset.errors().is_empty());
        assert_eq!(dataset.transactions().len(), 3);
        assert_eq!(dataset.summary().len(), 2);
        assert_eq!(dataset.summary()[0].month, "January");
        assert_eq!(dataset.summary()[1].month, "February");
        // The investment row was auto-labeled at ingestion.
        assert_eq!(dataset.transactions()[1].label, Label::Savings);
    }

    #[test]
    fn test_bad_file_is_skipped_but_siblings_load() {
        let (_dir, config) = test_config();
        write_month(&config, "Jan", vec![vec!["Groceries", "500", "N"]]);
        // Feb lacks the Amount column.
        SheetFixture::new()
            .sheet("Summary", vec![vec!["overview"]])
            .sheet(
                "Transactions",
                vec![vec!["Category", "Label"], vec!["Rent", "N"]],
            )
            .save(&config.data_dir().join("Feb.xlsx"));

        let dataset = load_all(&config);
        assert_eq!(dataset.summary().len(), 1);
        assert_eq!(dataset.summary()[0].month, "January");
        assert_eq!(dataset.errors().len(), 1);
        let message = dataset.errors()[0].to_string();
        assert!(message.contains("Feb.xlsx"));
        assert!(message.contains("Required column 'Amount'"));
        // The failed month still has a matrix column.
        let months: Vec<&str> = dataset.matrix().months().iter().map(String::as_str).collect();
        assert_eq!(months, vec!["January", "February"]);
    }

    #[test]
    fn test_corrupt_workbook_is_skipped() {
        let (_dir, config) = test_config();
        write_month(&config, "Jan", vec![vec!["Groceries", "500", "N"]]);
        std::fs::write(config.data_dir().join("Feb.xlsx"), b"not really xlsx").unwrap();

        let dataset = load_all(&config);
        assert_eq!(dataset.summary().len(), 1);
        assert_eq!(dataset.errors().len(), 1);
        assert!(dataset.errors()[0].to_string().contains("Feb.xlsx"));
    }

    #[test]
    fn test_empty_directory_yields_shaped_empty_dataset() {
        let (_dir, config) = test_config();
        let dataset = load_all(&config);
        assert!(dataset.transactions().is_empty());
        assert!(dataset.summary().is_empty());
        assert!(dataset.matrix().months().is_empty());
        assert!(!dataset.errors().is_empty());
    }

    #[test]
    fn test_load_all_is_deterministic() {
        let (_dir, config) = test_config();
        write_month(&config, "Jan", vec![vec!["Groceries", "500", "N"]]);
        write_month(
            &config,
            "Mar",
            vec![vec!["Rent", "900", "N"], vec!["Fuel", "300", "W"]],
        );

        let first = load_all(&config);
        let second = load_all(&config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_income_anchor_feeds_summary() {
        let (_dir, config) = test_config();
        SheetFixture::new()
            .sheet("Summary", vec![vec!["overview"]])
            .sheet(
                "Transactions",
                vec![vec!["Category", "Amount", "Label"], vec!["Rent", "900", "N"]],
            )
            .cell_number("Summary", 2, 14, 60000.0)
            .save(&config.data_dir().join("Jan.xlsx"));

        let dataset = load_all(&config);
        assert_eq!(
            dataset.summary()[0].total_income.value(),
            Decimal::from(60000)
        );
        assert_eq!(
            dataset.summary()[0].surplus.value(),
            Decimal::from_str("59100").unwrap()
        );
    }
}
