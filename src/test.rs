//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::config::Config;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::Path;
use tempfile::TempDir;

/// Creates a budget home in a temp directory and returns its Config.
/// The TempDir must be held for the duration of the test.
pub fn test_config() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let config = Config::create(dir.path().join("budget_home")).unwrap();
    (dir, config)
}

/// Builder for small `.xlsx` fixtures.
///
/// Sheets are written in insertion order, so the first `sheet()` call becomes
/// the workbook's first sheet. String grids cover the common case; typed
/// number and date cells can be layered on top.
#[derive(Default)]
pub struct SheetFixture {
    sheets: Vec<FixtureSheet>,
}

#[derive(Default)]
struct FixtureSheet {
    name: String,
    rows: Vec<Vec<String>>,
    numbers: Vec<(u32, u16, f64)>,
    dates: Vec<(u32, u16, ExcelDateTime)>,
}

impl SheetFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, rows: Vec<Vec<&str>>) -> Self {
        self.sheets.push(FixtureSheet {
            name: name.to_string(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
            ..Default::default()
        });
        self
    }

    pub fn cell_number(mut self, sheet: &str, row: u32, col: u16, value: f64) -> Self {
        self.sheet_mut(sheet).numbers.push((row, col, value));
        self
    }

    pub fn cell_date(mut self, sheet: &str, row: u32, col: u16, y: u16, m: u8, d: u8) -> Self {
        let dt = ExcelDateTime::from_ymd(y, m, d).unwrap();
        self.sheet_mut(sheet).dates.push((row, col, dt));
        self
    }

    pub fn save(self, path: &Path) {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = Workbook::new();
        for fixture in &self.sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&fixture.name).unwrap();
            for (row_ix, row) in fixture.rows.iter().enumerate() {
                for (col_ix, value) in row.iter().enumerate() {
                    sheet
                        .write_string(row_ix as u32, col_ix as u16, value)
                        .unwrap();
                }
            }
            for (row, col, value) in &fixture.numbers {
                sheet.write_number(*row, *col, *value).unwrap();
            }
            for (row, col, dt) in &fixture.dates {
                sheet
                    .write_datetime_with_format(*row, *col, dt, &date_format)
                    .unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    fn sheet_mut(&mut self, name: &str) -> &mut FixtureSheet {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .expect("sheet must be declared before typed cells are added")
    }
}
