//! Load command handler.

use crate::commands::Out;
use crate::dataset::Dataset;
use crate::session::Session;
use crate::{Config, Result};
use std::fmt::Write;

/// Runs a full ingestion pass and reports the month summaries plus any
/// per-file ingestion errors.
///
/// A batch where every file failed is not an error here: the empty dataset
/// and its ledger are the report.
pub fn load(config: Config) -> Result<Out<Dataset>> {
    let session = Session::open(config);
    let dataset = session.current();
    let message = render(&dataset);
    Ok(Out::new(message, (*dataset).clone()))
}

fn render(dataset: &Dataset) -> String {
    let mut message = String::new();
    if dataset.is_empty() {
        message.push_str("No data loaded.");
    } else {
        let _ = writeln!(
            message,
            "Loaded {} month{}, {} transaction{}",
            dataset.summary().len(),
            if dataset.summary().len() == 1 { "" } else { "s" },
            dataset.transactions().len(),
            if dataset.transactions().len() == 1 { "" } else { "s" },
        );
        for row in dataset.summary() {
            let _ = writeln!(
                message,
                "{:<10} income {:>12}  expenses {:>12}  investments {:>12}  surplus {:>12}  top: {} ({})",
                row.month,
                row.total_income.pretty(),
                row.total_expenses.pretty(),
                row.investments.pretty(),
                row.surplus.pretty(),
                row.top_expense_category,
                row.top_expense_amount.pretty(),
            );
        }
    }
    if !dataset.errors().is_empty() {
        let _ = writeln!(
            message,
            "\n{} ingestion error{}:",
            dataset.errors().len(),
            if dataset.errors().len() == 1 { "" } else { "s" }
        );
        for error in dataset.errors() {
            let _ = writeln!(message, "  - {error}");
        }
    }
    message
}
