//! The dataset snapshot: the aggregated, presentation-ready output of one
//! ingestion pass, plus the bulk-edit reconciliation rule.
//!
//! A `Dataset` is built in full by [`Dataset::aggregate`] and never mutated
//! after publication; label edits produce a modified copy that the session
//! swaps in atomically.

use crate::model::{Amount, EditKey, Label, Month, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Ledger message used when no file produced any data.
const NO_DATA_MESSAGE: &str =
    "Failed to load any data from Excel files. Please check file format and try again.";

/// One row of the month summary table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthSummary {
    pub month: String,
    pub total_income: Amount,
    /// Sum of non-investment amounts.
    pub total_expenses: Amount,
    /// Sum of investment-prefixed amounts.
    pub investments: Amount,
    /// `total_income - total_expenses`.
    pub surplus: Amount,
    pub top_expense_category: String,
    pub top_expense_amount: Amount,
}

/// Month-by-category expense matrix. Rows are the distinct categories across
/// all months, sorted; columns are canonical month names in chronological
/// order; a cell with no transactions is zero, never absent.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryMatrix {
    months: Vec<String>,
    rows: Vec<CategoryRow>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryRow {
    pub category: String,
    /// One cell per month, aligned with `CategoryMatrix::months`.
    pub cells: Vec<Amount>,
}

impl CategoryMatrix {
    fn build(months: &[Month], transactions: &[Transaction]) -> Self {
        let month_names: Vec<String> = months.iter().map(|m| m.name().to_string()).collect();

        let categories: BTreeSet<&str> = transactions
            .iter()
            .filter(|t| !t.is_investment())
            .map(|t| t.category.as_str())
            .collect();

        let rows = categories
            .into_iter()
            .map(|category| {
                let cells = month_names
                    .iter()
                    .map(|month| {
                        transactions
                            .iter()
                            .filter(|t| {
                                !t.is_investment() && t.category == category && &t.month == month
                            })
                            .map(|t| t.amount)
                            .sum()
                    })
                    .collect();
                CategoryRow {
                    category: category.to_string(),
                    cells,
                }
            })
            .collect();

        Self {
            months: month_names,
            rows,
        }
    }

    /// Canonical month names, one per column, chronological.
    pub fn months(&self) -> &[String] {
        &self.months
    }

    /// Category rows, lexicographic by category.
    pub fn rows(&self) -> &[CategoryRow] {
        &self.rows
    }

    /// The cell for `(category, month)`; zero when the row or column exists,
    /// `None` only when the category or month itself is unknown.
    pub fn cell(&self, category: &str, month: &str) -> Option<Amount> {
        let col = self.months.iter().position(|m| m == month)?;
        let row = self.rows.iter().find(|r| r.category == category)?;
        row.cells.get(col).copied()
    }
}

/// One non-fatal ingestion failure, tagged with the file it came from.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestionError {
    file: PathBuf,
    cause: String,
}

impl IngestionError {
    pub fn new(file: impl Into<PathBuf>, error: &crate::Error) -> Self {
        Self {
            file: file.into(),
            // Alternate formatting includes the context chain.
            cause: format!("{error:#}"),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

impl Display for IngestionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.file.as_os_str().is_empty() {
            // Batch-level entries carry no file.
            write!(f, "{}", self.cause)
        } else {
            write!(f, "Error processing {}: {}", self.file.display(), self.cause)
        }
    }
}

/// A single label change addressed by composite key.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LabelEdit {
    pub key: EditKey,
    pub label: Label,
}

/// The immutable output bundle of one ingestion pass.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Dataset {
    summary: Vec<MonthSummary>,
    transactions: Vec<Transaction>,
    matrix: CategoryMatrix,
    errors: Vec<IngestionError>,
}

impl Dataset {
    /// Merges per-file results into one snapshot.
    ///
    /// `months` is every discovered month in processing order, including ones
    /// whose file failed; failed months still get a matrix column. When no
    /// file yielded data the structures come back empty but fully shaped and
    /// the ledger is guaranteed non-empty.
    pub fn aggregate(
        months: &[Month],
        loads: Vec<(Vec<Transaction>, MonthSummary)>,
        mut errors: Vec<IngestionError>,
    ) -> Dataset {
        if loads.is_empty() {
            errors.push(IngestionError {
                file: PathBuf::new(),
                cause: NO_DATA_MESSAGE.to_string(),
            });
            return Dataset {
                summary: Vec::new(),
                transactions: Vec::new(),
                matrix: CategoryMatrix {
                    months: months.iter().map(|m| m.name().to_string()).collect(),
                    rows: Vec::new(),
                },
                errors,
            };
        }

        let mut summary = Vec::with_capacity(loads.len());
        let mut transactions = Vec::new();
        for (file_transactions, file_summary) in loads {
            // Relative order within and across files is preserved; months
            // arrived in processing order already.
            transactions.extend(file_transactions);
            summary.push(file_summary);
        }

        let matrix = CategoryMatrix::build(months, &transactions);
        Dataset {
            summary,
            transactions,
            matrix,
            errors,
        }
    }

    pub fn summary(&self) -> &[MonthSummary] {
        &self.summary
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn matrix(&self) -> &CategoryMatrix {
        &self.matrix
    }

    pub fn errors(&self) -> &[IngestionError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Applies label edits to a copy of this snapshot and returns it with the
    /// number of transactions that changed.
    ///
    /// Edits address transactions by `(date, description, amount, who)`; a
    /// key that matches nothing is a silent no-op because the editing view
    /// may be filtered or stale. The investment auto-label rule re-runs after
    /// the edits, so clearing the label of an investment-prefixed row snaps
    /// it back to `Savings`.
    pub fn with_label_edits(&self, edits: &[LabelEdit]) -> (Dataset, usize) {
        let mut next = self.clone();
        let mut updated = 0;
        for edit in edits {
            for transaction in &mut next.transactions {
                if transaction.edit_key() == edit.key && transaction.label != edit.label {
                    transaction.label = edit.label;
                    updated += 1;
                }
            }
        }
        for transaction in &mut next.transactions {
            transaction.enforce_investment_label();
        }
        (next, updated)
    }
}
