//! CSV export of the canonical transaction corpus.

use crate::model::Transaction;
use crate::Result;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

const HEADERS: [&str; 8] = [
    "Date",
    "Description",
    "Category",
    "Amount",
    "Who",
    "Whom",
    "Month",
    "Label",
];

/// Writes the corpus, all columns including the resolved label, to `path`.
pub fn write_csv(transactions: &[Transaction], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    write_csv_to(transactions, file)
        .with_context(|| format!("Unable to write CSV to {}", path.display()))
}

fn write_csv_to(transactions: &[Transaction], out: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADERS)?;
    for t in transactions {
        writer.write_record([
            t.date.to_string().as_str(),
            &t.description,
            &t.category,
            &t.amount.to_string(),
            &t.who,
            &t.whom,
            &t.month,
            &t.label.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Label};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn() -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            description: "Weekly shop".to_string(),
            category: "Groceries".to_string(),
            amount: Amount::from_str("512.50").unwrap(),
            who: "Self".to_string(),
            whom: "Big Bazaar".to_string(),
            label: Label::Needs,
            month: "January".to_string(),
        }
    }

    #[test]
    fn test_csv_row_shape() {
        let mut out = Vec::new();
        write_csv_to(&[txn()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Description,Category,Amount,Who,Whom,Month,Label"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-01-05,Weekly shop,Groceries,512.50,Self,Big Bazaar,January,Needs"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_unlabeled_writes_empty_field() {
        let mut unlabeled = txn();
        unlabeled.label = Label::Unlabeled;
        let mut out = Vec::new();
        write_csv_to(&[unlabeled], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("January,"));
    }

    #[test]
    fn test_write_csv_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");
        write_csv(&[txn()], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Groceries"));
    }
}
