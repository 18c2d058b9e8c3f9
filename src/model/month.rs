//! Month resolution from workbook file stems.
//!
//! Each data file is named for its month (`Jan.xlsx`, `March.xlsx`). The stem
//! decides processing order and the column order of the category matrix.

use serde::{Deserialize, Serialize};

/// Sort rank given to stems that match no month spelling. Unrecognized months
/// sort after December, stable among themselves.
pub const UNKNOWN_RANK: u32 = 13;

/// Accepted stem spellings, the canonical name and the calendar index.
/// Matching is case-sensitive and exact.
const MONTH_TABLE: [(&[&str], &str, u32); 12] = [
    (&["Jan", "January"], "January", 1),
    (&["Feb", "February"], "February", 2),
    (&["Mar", "March"], "March", 3),
    (&["Apr", "April"], "April", 4),
    (&["May"], "May", 5),
    (&["Jun", "June"], "June", 6),
    (&["Jul", "July"], "July", 7),
    (&["Aug", "August"], "August", 8),
    (&["Sep", "Sept", "September"], "September", 9),
    (&["Oct", "October"], "October", 10),
    (&["Nov", "November"], "November", 11),
    (&["Dec", "December"], "December", 12),
];

/// The resolved month for one data file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Month {
    stem: String,
    name: String,
    rank: u32,
}

impl Month {
    /// Resolves a file stem to a canonical month name and sort rank.
    ///
    /// Unrecognized stems pass through unchanged as their own canonical name
    /// and receive [`UNKNOWN_RANK`].
    pub fn resolve(stem: impl Into<String>) -> Month {
        let stem = stem.into();
        for (spellings, name, rank) in MONTH_TABLE {
            if spellings.contains(&stem.as_str()) {
                return Month {
                    stem,
                    name: (*name).to_string(),
                    rank,
                };
            }
        }
        Month {
            name: stem.clone(),
            stem,
            rank: UNKNOWN_RANK,
        }
    }

    /// The file stem this month was resolved from.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// The canonical full month name, e.g. `March`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calendar index 1-12, or [`UNKNOWN_RANK`].
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Calendar month number for date defaulting. Unrecognized months fall
    /// back to January so a default date can always be built.
    pub fn calendar_number(&self) -> u32 {
        if self.rank <= 12 {
            self.rank
        } else {
            1
        }
    }
}
