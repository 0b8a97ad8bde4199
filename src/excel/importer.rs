//! Excel loader - Excel (.xlsx) → validated [`Table`]

use crate::error::{CopilotError, CopilotResult};
use crate::types::{LineItem, Period, Table};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Load the line-item workbook at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> CopilotResult<Table> {
    ExcelLoader::new(path).load()
}

/// The four columns a line-item sheet is read into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Period,
    Category,
    Actual,
    Budget,
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    period: usize,
    category: usize,
    actual: Option<usize>,
    budget: Option<usize>,
}

/// Reads the first non-empty worksheet of an .xlsx file into a [`Table`]
pub struct ExcelLoader {
    path: PathBuf,
}

impl ExcelLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> CopilotError {
        CopilotError::input(&self.path, reason)
    }

    pub fn load(&self) -> CopilotResult<Table> {
        if !self.path.is_file() {
            return Err(self.error("file not found"));
        }

        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| self.error(format!("cannot open workbook: {}", e)))?;

        let sheet_names = workbook.sheet_names().to_vec();
        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| self.error(format!("cannot read sheet '{}': {}", sheet_name, e)))?;

            if range.is_empty() {
                debug!(sheet = %sheet_name, "skipping empty sheet");
                continue;
            }

            let table = self.read_sheet(&range)?;
            info!(
                path = %self.path.display(),
                sheet = %sheet_name,
                rows = table.len(),
                "loaded line items"
            );
            return Ok(table);
        }

        Err(self.error("workbook has no data"))
    }

    fn read_sheet(&self, range: &Range<Data>) -> CopilotResult<Table> {
        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| self.error("missing header row"))?;
        let columns = self.column_map(header)?;

        // Spreadsheet row number (1-based) of the header
        let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut items = Vec::new();
        for (offset, row) in rows.enumerate() {
            let row_number = header_row + offset + 1;
            if row.iter().all(is_blank) {
                continue;
            }

            let period = parse_period(row.get(columns.period)).ok_or_else(|| {
                self.error(format!(
                    "row {}: cannot read period from {}",
                    row_number,
                    describe(row.get(columns.period))
                ))
            })?;

            let category = match row.get(columns.category) {
                Some(cell) if !is_blank(cell) => cell.to_string().trim().to_string(),
                _ => {
                    return Err(self.error(format!("row {}: blank accountCategory", row_number)));
                }
            };

            let actual = columns
                .actual
                .and_then(|col| parse_amount(row.get(col), row_number))
                .unwrap_or(Decimal::ZERO);
            let budget = columns
                .budget
                .and_then(|col| parse_amount(row.get(col), row_number));

            items.push(LineItem::new(period, category, actual, budget));
        }

        if items.is_empty() {
            return Err(self.error("sheet has a header but no data rows"));
        }

        Table::with_source(&self.path, items)
    }

    /// Resolve required columns from the header row.
    fn column_map(&self, header: &[Data]) -> CopilotResult<ColumnMap> {
        let mut period = None;
        let mut category = None;
        let mut actual = None;
        let mut budget = None;

        for (col, cell) in header.iter().enumerate() {
            let name = cell.to_string();
            let slot = match field_for_header(&name) {
                Some(Field::Period) => &mut period,
                Some(Field::Category) => &mut category,
                Some(Field::Actual) => &mut actual,
                Some(Field::Budget) => &mut budget,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(col);
            } else {
                debug!(column = %name, "ignoring repeated column");
            }
        }

        let period = period.ok_or_else(|| self.error("missing required column 'period'"))?;
        let category =
            category.ok_or_else(|| self.error("missing required column 'accountCategory'"))?;
        if actual.is_none() && budget.is_none() {
            return Err(self.error(
                "missing amount column (expected 'actualAmount' and/or 'budgetAmount')",
            ));
        }

        Ok(ColumnMap {
            period,
            category,
            actual,
            budget,
        })
    }
}

/// Map a header cell to a field; case, spaces and underscores are ignored.
fn field_for_header(name: &str) -> Option<Field> {
    let key: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match key.as_str() {
        "period" | "month" | "date" => Some(Field::Period),
        "accountcategory" | "category" | "account" => Some(Field::Category),
        "actualamount" | "actual" | "amount" => Some(Field::Actual),
        "budgetamount" | "budget" => Some(Field::Budget),
        _ => None,
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn describe(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => "an empty cell".to_string(),
        Some(cell) => format!("'{}'", cell),
    }
}

/// Period from a text, ISO date-time or Excel date-serial cell.
fn parse_period(cell: Option<&Data>) -> Option<Period> {
    match cell? {
        Data::String(s) | Data::DateTimeIso(s) => s.parse().ok(),
        Data::DateTime(dt) => Period::from_excel_serial(dt.as_f64()),
        Data::Float(f) => Period::from_excel_serial(*f),
        Data::Int(i) => Period::from_excel_serial(*i as f64),
        _ => None,
    }
}

/// Amount from a cell. `None` for a blank cell; unreadable values become zero.
fn parse_amount(cell: Option<&Data>, row_number: usize) -> Option<Decimal> {
    let cell = cell?;
    if is_blank(cell) {
        return None;
    }

    let amount = match cell {
        Data::Float(f) => Decimal::from_f64(*f),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => parse_amount_text(s),
        _ => None,
    };

    Some(amount.unwrap_or_else(|| {
        warn!(row = row_number, value = %cell, "non-numeric amount treated as zero");
        Decimal::ZERO
    }))
}

/// Parse text such as `$1,200.50` or `(300)`.
fn parse_amount_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
        .collect();

    match cleaned
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => Decimal::from_str(inner).ok().map(|d| -d),
        None => Decimal::from_str(&cleaned).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_for_header_aliases() {
        assert_eq!(field_for_header("period"), Some(Field::Period));
        assert_eq!(field_for_header("Month"), Some(Field::Period));
        assert_eq!(field_for_header("accountCategory"), Some(Field::Category));
        assert_eq!(field_for_header("account_category"), Some(Field::Category));
        assert_eq!(field_for_header("Account Category"), Some(Field::Category));
        assert_eq!(field_for_header("actualAmount"), Some(Field::Actual));
        assert_eq!(field_for_header("amount"), Some(Field::Actual));
        assert_eq!(field_for_header("budget_amount"), Some(Field::Budget));
        assert_eq!(field_for_header("currency"), None);
    }

    #[test]
    fn test_parse_period_cells() {
        let june = Period::new(2025, 6).unwrap();
        assert_eq!(parse_period(Some(&Data::String("2025-06".into()))), Some(june));
        assert_eq!(parse_period(Some(&Data::String("June 2025".into()))), Some(june));
        assert_eq!(
            parse_period(Some(&Data::DateTimeIso("2025-06-01T00:00:00".into()))),
            Some(june)
        );
        assert_eq!(parse_period(Some(&Data::Float(45809.0))), Some(june));
        assert_eq!(parse_period(Some(&Data::Bool(true))), None);
        assert_eq!(parse_period(Some(&Data::Empty)), None);
        assert_eq!(parse_period(None), None);
    }

    #[test]
    fn test_parse_amount_numbers() {
        assert_eq!(
            parse_amount(Some(&Data::Float(120000.0)), 2),
            Some(Decimal::from(120_000))
        );
        assert_eq!(parse_amount(Some(&Data::Int(-5)), 2), Some(Decimal::from(-5)));
        assert_eq!(
            parse_amount(Some(&Data::Float(0.1)), 2),
            Some(Decimal::new(1, 1))
        );
    }

    #[test]
    fn test_parse_amount_blank_is_absent() {
        assert_eq!(parse_amount(Some(&Data::Empty), 2), None);
        assert_eq!(parse_amount(Some(&Data::String("  ".into())), 2), None);
        assert_eq!(parse_amount(None, 2), None);
    }

    #[test]
    fn test_parse_amount_non_numeric_is_zero() {
        assert_eq!(
            parse_amount(Some(&Data::String("n/a".into())), 2),
            Some(Decimal::ZERO)
        );
        assert_eq!(parse_amount(Some(&Data::Bool(true)), 2), Some(Decimal::ZERO));
    }

    #[test]
    fn test_parse_amount_text_formats() {
        assert_eq!(parse_amount_text("$1,200.50"), Some(Decimal::new(120050, 2)));
        assert_eq!(parse_amount_text("(300)"), Some(Decimal::from(-300)));
        assert_eq!(parse_amount_text(" 42 "), Some(Decimal::from(42)));
        assert_eq!(parse_amount_text("abc"), None);
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = load("does/not/exist.xlsx").unwrap_err();
        assert!(matches!(err, CopilotError::Input { .. }));
        assert!(err.to_string().contains("does/not/exist.xlsx"));
    }
}
