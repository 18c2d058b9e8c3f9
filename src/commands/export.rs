//! Export command handler.

use crate::args::ExportArgs;
use crate::commands::Out;
use crate::export::write_csv;
use crate::session::Session;
use crate::{Config, Result};

/// Runs a full ingestion pass and writes the transaction corpus to a CSV
/// file.
///
/// # Errors
///
/// - Returns an error if the CSV file cannot be written.
pub fn export(config: Config, args: ExportArgs) -> Result<Out<()>> {
    let session = Session::open(config);
    let dataset = session.current();
    write_csv(dataset.transactions(), args.out())?;
    let count = dataset.transactions().len();
    Ok(Out::new_message(format!(
        "Exported {} transaction{} to {}",
        count,
        if count == 1 { "" } else { "s" },
        args.out().display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{test_config, SheetFixture};

    #[test]
    fn test_export_writes_corpus() {
        let (dir, config) = test_config();
        SheetFixture::new()
            .sheet("Summary", vec![vec!["overview"]])
            .sheet(
                "Transactions",
                vec![
                    vec!["Category", "Amount", "Label"],
                    vec!["Rent", "900", "N"],
                    vec!["Investment - SIP", "1000", ""],
                ],
            )
            .save(&config.data_dir().join("Jan.xlsx"));

        let out_path = dir.path().join("corpus.csv");
        let out = export(config, ExportArgs::new(&out_path)).unwrap();
        assert!(out.message().contains("Exported 2 transactions"));

        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.starts_with("Date,Description,Category,Amount,Who,Whom,Month,Label"));
        // The auto-applied Savings label is part of the export.
        assert!(text.contains("Investment - SIP,1000,Unknown,Vendor,January,Savings"));
    }
}
