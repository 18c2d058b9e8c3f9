//! Workbook reading.
//!
//! Opens one monthly `.xlsx` file, picks the transaction sheet, and lifts its
//! rows into `RawRow` maps keyed by header name. Date-typed cells are
//! converted through the workbook's date system here so that nothing
//! downstream ever sees an Excel serial number.

use crate::config::CellRef;
use crate::Result;
use anyhow::Context;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Sheet used when the workbook has only one sheet and it carries this name.
const TRANSACTIONS_SHEET: &str = "Transactions";

/// A scalar cell value with workbook-specific types already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    Empty,
}

impl RawValue {
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One unvalidated sheet row, keyed by header name. No invariants hold yet.
pub type RawRow = BTreeMap<String, RawValue>;

/// The workbook exposed no usable sheet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MissingSheetError {
    path: PathBuf,
}

impl Display for MissingSheetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "No sheets found in {}", self.path.display())
    }
}

impl Error for MissingSheetError {}

/// An open monthly workbook.
pub struct Workbook {
    book: Xlsx<BufReader<File>>,
    path: PathBuf,
}

impl Workbook {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let book: Xlsx<_> = open_workbook(&path)
            .with_context(|| format!("Unable to open workbook {}", path.display()))?;
        Ok(Self { book, path })
    }

    /// Reads the transaction sheet into raw rows, returning the rows and the
    /// name of the sheet that was selected.
    ///
    /// Sheet selection policy, in order:
    /// 1. the second sheet, when the workbook has two or more
    /// 2. a sheet literally named "Transactions"
    /// 3. the first sheet
    /// 4. otherwise [`MissingSheetError`]
    ///
    /// The first row of the used range is the header row. Columns with an
    /// empty header are dropped entirely.
    pub fn transaction_rows(&mut self) -> Result<(Vec<RawRow>, String)> {
        let sheet_names = self.book.sheet_names().to_vec();
        debug!("Available sheets in {}: {:?}", self.path.display(), sheet_names);

        let sheet_name = if sheet_names.len() >= 2 {
            sheet_names[1].clone()
        } else if sheet_names.iter().any(|n| n == TRANSACTIONS_SHEET) {
            TRANSACTIONS_SHEET.to_string()
        } else if let Some(first) = sheet_names.first() {
            first.clone()
        } else {
            return Err(MissingSheetError {
                path: self.path.clone(),
            }
            .into());
        };

        let range = self
            .book
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet '{sheet_name}'"))?;

        let mut rows_iter = range.rows();
        let headers: Vec<(usize, String)> = match rows_iter.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .filter_map(|(ix, cell)| {
                    let name = header_cell_name(cell);
                    if name.is_empty() {
                        None
                    } else {
                        Some((ix, name))
                    }
                })
                .collect(),
            None => Vec::new(),
        };
        debug!("Column names: {:?}", headers);

        let mut rows = Vec::new();
        for sheet_row in rows_iter {
            let mut row = RawRow::new();
            for (ix, name) in &headers {
                let value = sheet_row
                    .get(*ix)
                    .map(convert_cell)
                    .unwrap_or(RawValue::Empty);
                row.insert(name.clone(), value);
            }
            if row.values().all(RawValue::is_empty) {
                continue;
            }
            rows.push(row);
        }
        Ok((rows, sheet_name))
    }

    /// Attempts to read the income figure from a fixed cell on the *first*
    /// sheet. Returns `None` when the sheet, the cell, or a numeric value is
    /// not there; the caller falls back to its ratio heuristic.
    pub fn income_anchor(&mut self, at: CellRef) -> Option<Decimal> {
        let range: Range<Data> = self.book.worksheet_range_at(0)?.ok()?;
        let cell = range.get_value((at.row, at.col))?;
        match cell {
            Data::Float(n) => Decimal::from_f64(*n),
            Data::Int(n) => Decimal::from_i64(*n),
            Data::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }
}

fn header_cell_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn convert_cell(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(n) => RawValue::Number(*n),
        Data::Int(n) => RawValue::Number(*n as f64),
        Data::Bool(b) => RawValue::Bool(*b),
        // The date system (1900/1904 epoch) is applied by calamine here.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => RawValue::Date(dt.date()),
            None => RawValue::Empty,
        },
        Data::DateTimeIso(s) => RawValue::Text(s.clone()),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) => RawValue::Empty,
    }
}
