//! Types that represent the core data model, such as `Transaction` and `Label`.
mod amount;
mod label;
mod month;
mod transaction;

pub use amount::{Amount, AmountError};
pub use label::{InvalidLabelCode, Label};
pub use month::{Month, UNKNOWN_RANK};
pub use transaction::{
    EditKey, Transaction, AMOUNT_STR, CATEGORY_STR, DATE_STR, DEFAULT_WHO, DEFAULT_WHOM,
    DESCRIPTION_STR, INVESTMENT_PREFIX, LABEL_STR, REQUIRED_COLUMNS, WHO_STR, WHOM_STR,
};
