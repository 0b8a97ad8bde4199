use crate::error::{CopilotError, CopilotResult};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

//==============================================================================
// Period
//==============================================================================

/// A calendar month (`YYYY-MM`), ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> CopilotResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CopilotError::InvalidPeriod(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Convert an Excel serial date (1900 date system) to its month.
    ///
    /// The fractional part (time of day) is ignored.
    pub fn from_excel_serial(serial: f64) -> Option<Self> {
        if !serial.is_finite() || serial < 1.0 {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch
            .checked_add_days(Days::new(serial.floor() as u64))
            .map(Self::from_date)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl FromStr for Period {
    type Err = CopilotError;

    /// Accepts `2025-06`, `2025-06-01`, `2025-06-01T00:00:00`,
    /// `June 2025` and `Jun 2025` (month names are case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        // A date followed by a time, never by other text
        let date_part = match (text.get(..10), text.get(10..)) {
            (Some(date), Some(rest)) if rest.is_empty() || rest.starts_with('T') => date,
            _ => text,
        };
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        // %B also accepts the abbreviated month name when parsing
        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {text}"), "%d %B %Y") {
            return Ok(Self::from_date(date));
        }

        Err(CopilotError::InvalidPeriod(s.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//==============================================================================
// Line items and the loaded table
//==============================================================================

/// One row of the source workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub period: Period,
    pub account_category: String,
    pub actual_amount: Decimal,
    /// `None` when the workbook has no budget for this row.
    pub budget_amount: Option<Decimal>,
}

impl LineItem {
    pub fn new(
        period: Period,
        account_category: impl Into<String>,
        actual_amount: Decimal,
        budget_amount: Option<Decimal>,
    ) -> Self {
        Self {
            period,
            account_category: account_category.into(),
            actual_amount,
            budget_amount,
        }
    }

    /// True when the category equals `prefix` or sits below it
    /// (ASCII case-insensitive).
    pub fn is_under(&self, prefix: &str) -> bool {
        let category = self.account_category.as_bytes();
        category.len() >= prefix.len()
            && category[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }
}

/// The loaded line items, immutable once built.
#[derive(Debug, Clone)]
pub struct Table {
    items: Vec<LineItem>,
    source: PathBuf,
}

impl Table {
    /// Build a table that did not come from a file.
    pub fn new(items: Vec<LineItem>) -> CopilotResult<Self> {
        Self::with_source("<memory>", items)
    }

    /// Build a table, rejecting duplicate `(period, category)` rows.
    /// Categories compare case-insensitively, as they do in every query.
    pub fn with_source(source: impl Into<PathBuf>, items: Vec<LineItem>) -> CopilotResult<Self> {
        let source = source.into();
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert((item.period, item.account_category.to_ascii_lowercase())) {
                return Err(CopilotError::input(
                    &source,
                    format!(
                        "duplicate row for period {} and category '{}'",
                        item.period, item.account_category
                    ),
                ));
            }
        }
        Ok(Self { items, source })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
