use crate::model::{Amount, Label};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category strings beginning with this prefix are treated as investments:
/// excluded from expense totals and auto-labeled `Savings` when unlabeled.
pub const INVESTMENT_PREFIX: &str = "Investment";

/// A single normalized transaction.
///
/// Every field has been validated or defaulted at the ingestion boundary;
/// consumers never see raw sheet values.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    /// Calendar date; the first of the ingestion month when the sheet had no
    /// usable value.
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: Amount,
    /// Who made the transaction. Defaults to "Unknown".
    pub who: String,
    /// The counterparty. Defaults to "Vendor".
    pub whom: String,
    pub label: Label,
    /// Canonical month name, stamped from the source filename at ingestion.
    pub month: String,
}

impl Transaction {
    /// Whether the category puts this row in the investment bucket.
    pub fn is_investment(&self) -> bool {
        self.category.starts_with(INVESTMENT_PREFIX)
    }

    /// The composite key used by bulk-edit reconciliation. Row indexes are
    /// useless across filtered or re-sorted views, so edits address rows by
    /// content instead.
    pub fn edit_key(&self) -> EditKey {
        EditKey {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            who: self.who.clone(),
        }
    }

    /// Applies the investment auto-label rule to this row: an unlabeled
    /// investment-prefixed row becomes `Savings`. Idempotent; rows that
    /// already carry a label are left alone.
    pub fn enforce_investment_label(&mut self) {
        if self.is_investment() && self.label.is_unlabeled() {
            self.label = Label::Savings;
        }
    }
}

/// Identifies transactions for label write-back: `(date, description, amount,
/// who)`. Amounts compare by numeric value.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EditKey {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Amount,
    pub who: String,
}

/// Header names for the transaction sheet. `Category`, `Amount` and `Label`
/// are required; the rest are defaulted when the column is missing.
pub const DATE_STR: &str = "Date";
pub const DESCRIPTION_STR: &str = "Description";
pub const CATEGORY_STR: &str = "Category";
pub const AMOUNT_STR: &str = "Amount";
pub const WHO_STR: &str = "Who";
pub const WHOM_STR: &str = "Whom";
pub const LABEL_STR: &str = "Label";

pub const REQUIRED_COLUMNS: [&str; 3] = [CATEGORY_STR, AMOUNT_STR, LABEL_STR];

pub const DEFAULT_WHO: &str = "Unknown";
pub const DEFAULT_WHOM: &str = "Vendor";
