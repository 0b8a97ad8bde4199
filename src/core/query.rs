//! Filters and sums over loaded line items
//!
//! Every function borrows; nothing here mutates a [`Table`]. Filters take any
//! iterator of `&LineItem` and return the matching rows, so they compose:
//!
//! ```
//! use cfo_copilot::core::query::{filter_by_category_prefix, filter_by_period, sum_actual};
//! use cfo_copilot::types::{LineItem, Period, Table};
//! use rust_decimal::Decimal;
//!
//! let june: Period = "2025-06".parse()?;
//! let table = Table::new(vec![
//!     LineItem::new(june, "Opex:Marketing", Decimal::from(500), None),
//!     LineItem::new(june, "Revenue", Decimal::from(9000), None),
//! ])?;
//!
//! let opex = filter_by_category_prefix(filter_by_period(&table, june), "Opex");
//! assert_eq!(sum_actual(opex), Decimal::from(500));
//! # Ok::<(), cfo_copilot::error::CopilotError>(())
//! ```

use crate::types::{LineItem, Period, Table};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Rows borrowed from a [`Table`].
pub type Rows<'a> = Vec<&'a LineItem>;

/// Rows whose period is exactly `period`. Empty when none match.
pub fn filter_by_period<'a, I>(rows: I, period: Period) -> Rows<'a>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    rows.into_iter().filter(|item| item.period == period).collect()
}

/// Rows whose category starts with `prefix` ("Opex" matches "Opex:Marketing").
pub fn filter_by_category_prefix<'a, I>(rows: I, prefix: &str) -> Rows<'a>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    rows.into_iter().filter(|item| item.is_under(prefix)).collect()
}

pub fn sum_actual<'a, I>(rows: I) -> Decimal
where
    I: IntoIterator<Item = &'a LineItem>,
{
    rows.into_iter().map(|item| item.actual_amount).sum()
}

/// Absent budgets count as zero.
pub fn sum_budget<'a, I>(rows: I) -> Decimal
where
    I: IntoIterator<Item = &'a LineItem>,
{
    rows.into_iter()
        .map(|item| item.budget_amount.unwrap_or(Decimal::ZERO))
        .sum()
}

/// Every period in the table once, oldest first.
pub fn distinct_periods_sorted(table: &Table) -> Vec<Period> {
    table
        .iter()
        .map(|item| item.period)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
