//! Budgeting labels and the short-code scheme used in the monthly sheets.

use serde::{Deserialize, Serialize};

/// A budgeting classification, independent of the spreadsheet category.
///
/// The monthly sheets carry single-letter codes (`N`, `W`, `L`, `S`, `I`);
/// blank cells are legal and mean the row is unlabeled.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Label {
    Needs,
    Wants,
    Luxury,
    Savings,
    Investment,
    #[default]
    #[serde(rename = "")]
    Unlabeled,
}

serde_plain::derive_display_from_serialize!(Label);
serde_plain::derive_fromstr_from_deserialize!(Label);

impl Label {
    /// Maps an upper-cased sheet cell to a label.
    ///
    /// Accepts the five short codes plus the blank spellings produced by
    /// stringified empty cells (`""`, `"NAN"`, `"NONE"`). Anything else is
    /// rejected; the caller collects offenders into one per-file error.
    pub fn from_code(code: &str) -> Result<Label, InvalidLabelCode> {
        match code {
            "N" => Ok(Label::Needs),
            "W" => Ok(Label::Wants),
            "L" => Ok(Label::Luxury),
            "S" => Ok(Label::Savings),
            "I" => Ok(Label::Investment),
            "" | "NAN" | "NONE" => Ok(Label::Unlabeled),
            bad => Err(InvalidLabelCode(bad.to_string())),
        }
    }

    pub fn is_unlabeled(&self) -> bool {
        matches!(self, Label::Unlabeled)
    }
}

/// A label cell value outside the accepted code set.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidLabelCode(pub String);

impl std::fmt::Display for InvalidLabelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid label value '{}'", self.0)
    }
}

impl std::error::Error for InvalidLabelCode {}
