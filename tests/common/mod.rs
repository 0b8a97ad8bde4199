//! Shared helpers for integration tests

#![allow(dead_code)] // each test binary uses a different subset

use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// One cell of a generated test workbook.
pub enum Cell {
    Text(&'static str),
    Number(f64),
    /// Excel date serial written with a date number format
    Date(f64),
    Blank,
}

/// Path to the checked-in sample workbook.
pub fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("fixtures");
    path.push("data.xlsx");
    path
}

/// Write `rows` to the first sheet of a new workbook at `path`.
pub fn write_workbook(path: &Path, rows: &[Vec<Cell>]) {
    write_workbook_sheets(path, &[rows])
}

/// Write one worksheet per entry of `sheets`.
pub fn write_workbook_sheets(path: &Path, sheets: &[&[Vec<Cell>]]) {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();

    for rows in sheets {
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Date(serial) => {
                        worksheet
                            .write_number_with_format(r, c, *serial, &date_format)
                            .unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }

    workbook.save(path).unwrap();
}

/// Standard header row.
pub fn header() -> Vec<Cell> {
    vec![
        Cell::Text("period"),
        Cell::Text("accountCategory"),
        Cell::Text("actualAmount"),
        Cell::Text("budgetAmount"),
    ]
}

/// A data row with text period and numeric amounts.
pub fn row(period: &'static str, category: &'static str, actual: f64, budget: Option<f64>) -> Vec<Cell> {
    vec![
        Cell::Text(period),
        Cell::Text(category),
        Cell::Number(actual),
        budget.map(Cell::Number).unwrap_or(Cell::Blank),
    ]
}
