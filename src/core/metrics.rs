//! Finance metrics built from [`query`](super::query) calls
//!
//! Each calculator takes the loaded [`Table`] explicitly and fails with
//! [`CopilotError::PeriodNotFound`] when a requested month has no rows at all.
//! A month that exists but has zero revenue is a valid answer, not an error.

use super::query::{
    distinct_periods_sorted, filter_by_category_prefix, filter_by_period, sum_actual, sum_budget,
    Rows,
};
use crate::error::{CopilotError, CopilotResult};
use crate::types::{Period, Table};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

pub const REVENUE: &str = "Revenue";
pub const COGS: &str = "COGS";
pub const OPEX: &str = "Opex";
pub const CASH_BALANCE: &str = "Cash:Balance";
pub const CASH_INFLOW: &str = "Cash:Inflow";
pub const CASH_OUTFLOW: &str = "Cash:Outflow";

/// Number of trailing months averaged for the burn rate.
pub const RUNWAY_WINDOW: usize = 3;

//==============================================================================
// Result types
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueVsBudget {
    pub period: Period,
    pub actual: Decimal,
    pub budget: Decimal,
    pub variance: Decimal,
    variance_pct: Option<Decimal>,
}

impl RevenueVsBudget {
    /// `variance / budget` as a ratio (0.111 = 11.1%).
    pub fn variance_pct(&self) -> CopilotResult<Decimal> {
        self.variance_pct
            .ok_or_else(|| CopilotError::DivisionUndefined {
                what: "Revenue variance %".to_string(),
                period: self.period,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrossMarginPoint {
    pub period: Period,
    pub revenue: Decimal,
    pub cogs: Decimal,
    /// Percentage points (60 = 60%); `None` when revenue is zero.
    pub gross_margin_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpexLine {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpexBreakdown {
    pub period: Period,
    /// One line per category, in first-seen order.
    pub lines: Vec<OpexLine>,
    pub total: Decimal,
}

impl OpexBreakdown {
    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|line| line.category == category)
            .map(|line| line.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EbitdaProxy {
    pub period: Period,
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub opex: Decimal,
    pub ebitda: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodValue {
    pub period: Period,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashRunway {
    pub as_of: Period,
    pub current_cash: Decimal,
    pub average_monthly_burn: Decimal,
    /// Net burn (outflow - inflow) per month in the averaging window.
    pub monthly_burn: Vec<PeriodValue>,
    runway_months: Option<Decimal>,
}

impl CashRunway {
    pub fn runway_months(&self) -> CopilotResult<Decimal> {
        self.runway_months
            .ok_or(CopilotError::RunwayUndefined {
                average_monthly_burn: self.average_monthly_burn,
            })
    }
}

//==============================================================================
// Calculators
//==============================================================================

/// Rows for `period`, or `PeriodNotFound` when there are none.
fn rows_for_period(table: &Table, period: Period) -> CopilotResult<Rows<'_>> {
    let rows = filter_by_period(table, period);
    if rows.is_empty() {
        return Err(CopilotError::PeriodNotFound { period });
    }
    Ok(rows)
}

/// Distinct periods up to and including `end` (all when `end` is `None`).
fn periods_ending_at(table: &Table, end: Option<Period>) -> CopilotResult<Vec<Period>> {
    let mut periods = distinct_periods_sorted(table);
    if let Some(end) = end {
        if !periods.contains(&end) {
            return Err(CopilotError::PeriodNotFound { period: end });
        }
        periods.retain(|period| *period <= end);
    }
    Ok(periods)
}

fn sum_under(rows: &Rows<'_>, prefix: &str) -> Decimal {
    sum_actual(filter_by_category_prefix(rows.iter().copied(), prefix))
}

pub fn revenue_vs_budget(table: &Table, period: Period) -> CopilotResult<RevenueVsBudget> {
    let rows = rows_for_period(table, period)?;
    let revenue = filter_by_category_prefix(rows, REVENUE);

    let actual = sum_actual(revenue.iter().copied());
    let budget = sum_budget(revenue);
    let variance = actual - budget;
    // None for a zero budget or an overflowing ratio
    let variance_pct = variance.checked_div(budget);

    Ok(RevenueVsBudget {
        period,
        actual,
        budget,
        variance,
        variance_pct,
    })
}

/// Gross margin % for the last `n_months` periods present in the table,
/// oldest first, optionally ending at `end`.
pub fn gross_margin_trend(
    table: &Table,
    n_months: usize,
    end: Option<Period>,
) -> CopilotResult<Vec<GrossMarginPoint>> {
    let periods = periods_ending_at(table, end)?;
    let start = periods.len().saturating_sub(n_months);

    let trend = periods[start..]
        .iter()
        .map(|&period| {
            let rows = filter_by_period(table, period);
            let revenue = sum_under(&rows, REVENUE);
            let cogs = sum_under(&rows, COGS);
            let gross_margin_pct = (revenue - cogs)
                .checked_div(revenue)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
            GrossMarginPoint {
                period,
                revenue,
                cogs,
                gross_margin_pct,
            }
        })
        .collect();

    Ok(trend)
}

pub fn opex_breakdown(table: &Table, period: Period) -> CopilotResult<OpexBreakdown> {
    let rows = rows_for_period(table, period)?;
    let opex = filter_by_category_prefix(rows, OPEX);

    let mut lines: Vec<OpexLine> = Vec::new();
    for item in &opex {
        match lines
            .iter_mut()
            .find(|line| line.category == item.account_category)
        {
            Some(line) => line.amount += item.actual_amount,
            None => lines.push(OpexLine {
                category: item.account_category.clone(),
                amount: item.actual_amount,
            }),
        }
    }

    Ok(OpexBreakdown {
        period,
        lines,
        total: sum_actual(opex),
    })
}

/// Revenue - COGS - Opex for one month.
pub fn ebitda_proxy(table: &Table, period: Period) -> CopilotResult<EbitdaProxy> {
    let rows = rows_for_period(table, period)?;
    let revenue = sum_under(&rows, REVENUE);
    let cogs = sum_under(&rows, COGS);
    let opex = sum_under(&rows, OPEX);

    Ok(EbitdaProxy {
        period,
        revenue,
        cogs,
        opex,
        ebitda: revenue - cogs - opex,
    })
}

/// Months of cash left at the average net burn of the last
/// [`RUNWAY_WINDOW`] periods (ending at `as_of` when given).
pub fn cash_runway(table: &Table, as_of: Option<Period>) -> CopilotResult<CashRunway> {
    let periods = periods_ending_at(table, as_of)?;
    let window = &periods[periods.len().saturating_sub(RUNWAY_WINDOW)..];
    let Some(&latest) = window.last() else {
        return Err(CopilotError::input(table.source(), "table has no rows"));
    };

    let monthly_burn: Vec<PeriodValue> = window
        .iter()
        .map(|&period| {
            let rows = filter_by_period(table, period);
            PeriodValue {
                period,
                value: sum_under(&rows, CASH_OUTFLOW) - sum_under(&rows, CASH_INFLOW),
            }
        })
        .collect();
    let total_burn: Decimal = monthly_burn.iter().map(|burn| burn.value).sum();
    let average_monthly_burn = total_burn / Decimal::from(monthly_burn.len());

    // Latest balance in the window carries forward to `latest`
    let (balance_period, current_cash) = window
        .iter()
        .rev()
        .find_map(|&period| {
            let balances =
                filter_by_category_prefix(filter_by_period(table, period), CASH_BALANCE);
            (!balances.is_empty()).then(|| (period, sum_actual(balances)))
        })
        .ok_or_else(|| CopilotError::CategoryNotFound {
            category: CASH_BALANCE.to_string(),
            period: latest,
        })?;

    let runway_months = if average_monthly_burn > Decimal::ZERO {
        current_cash.checked_div(average_monthly_burn)
    } else {
        None
    };
    debug!(
        %latest,
        %balance_period,
        %average_monthly_burn,
        %current_cash,
        "cash runway window computed"
    );

    Ok(CashRunway {
        as_of: latest,
        current_cash,
        average_monthly_burn,
        monthly_burn,
        runway_months,
    })
}
