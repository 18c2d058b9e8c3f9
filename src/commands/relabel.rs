//! Relabel command handler.

use crate::args::RelabelArgs;
use crate::commands::Out;
use crate::dataset::{Dataset, LabelEdit};
use crate::export::write_csv;
use crate::model::EditKey;
use crate::session::Session;
use crate::{Config, Result};
use anyhow::bail;

/// Applies a label change to the loaded corpus, selecting transactions
/// either by the `(date, description, amount, who)` composite key or by
/// category.
///
/// A selection that matches nothing is reported, not an error: the caller's
/// view of the corpus may be stale. When `--out` is given the edited corpus
/// is written to CSV.
///
/// # Errors
///
/// - Returns an error if neither a category nor a full composite key was
///   provided, or if the CSV file cannot be written.
pub fn relabel(config: Config, args: RelabelArgs) -> Result<Out<Dataset>> {
    let session = Session::open(config);
    let edits = build_edits(&session.current(), &args)?;
    let (dataset, updated) = session.relabel(&edits);

    if let Some(out) = args.out() {
        write_csv(dataset.transactions(), out)?;
    }

    let message = format!(
        "Updated {} transaction{}",
        updated,
        if updated == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, (*dataset).clone()))
}

fn build_edits(dataset: &Dataset, args: &RelabelArgs) -> Result<Vec<LabelEdit>> {
    if let Some(category) = args.category() {
        // One edit per matching transaction, addressed by its own key.
        return Ok(dataset
            .transactions()
            .iter()
            .filter(|t| t.category == category)
            .map(|t| LabelEdit {
                key: t.edit_key(),
                label: args.label(),
            })
            .collect());
    }

    match (args.date(), args.description(), args.amount(), args.who()) {
        (Some(date), Some(description), Some(amount), Some(who)) => Ok(vec![LabelEdit {
            key: EditKey {
                date,
                description: description.to_string(),
                amount,
                who: who.to_string(),
            },
            label: args.label(),
        }]),
        _ => bail!(
            "Provide either --category, or all of --date, --description, --amount and --who"
        ),
    }
}
