pub mod args;
pub mod commands;
mod config;
mod dataset;
mod error;
mod export;
pub mod ingest;
pub mod model;
mod session;
#[cfg(test)]
mod test;
mod upload;
mod utils;

pub use config::{CellRef, Config};
pub use dataset::{CategoryMatrix, CategoryRow, Dataset, IngestionError, LabelEdit, MonthSummary};
pub use error::Error;
pub use error::Result;
pub use export::write_csv;
pub use session::Session;
pub use upload::{store_upload, store_uploads};
