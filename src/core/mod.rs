//! Query engine, metric calculators and the question dispatcher

pub mod metrics;
pub mod query;

pub use metrics::{
    cash_runway, ebitda_proxy, gross_margin_trend, opex_breakdown, revenue_vs_budget, CashRunway,
    EbitdaProxy, GrossMarginPoint, OpexBreakdown, OpexLine, PeriodValue, RevenueVsBudget,
};

use crate::error::CopilotResult;
use crate::types::{Period, Table};
use serde::Serialize;

/// Default number of months in a gross-margin trend.
pub const DEFAULT_TREND_MONTHS: usize = 3;

/// A finance question in structured form, one variant per calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    RevenueVsBudget { period: Period },
    GrossMarginTrend { months: usize, end: Option<Period> },
    OpexBreakdown { period: Period },
    EbitdaProxy { period: Period },
    CashRunway { as_of: Option<Period> },
}

impl Question {
    /// Human name of the calculator behind this question.
    pub fn intent(&self) -> &'static str {
        match self {
            Question::RevenueVsBudget { .. } => "revenue vs budget",
            Question::GrossMarginTrend { .. } => "gross margin trend",
            Question::OpexBreakdown { .. } => "opex breakdown",
            Question::EbitdaProxy { .. } => "EBITDA proxy",
            Question::CashRunway { .. } => "cash runway",
        }
    }
}

/// Structured answer produced by a calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricResult {
    RevenueVsBudget(RevenueVsBudget),
    GrossMarginTrend { points: Vec<GrossMarginPoint> },
    OpexBreakdown(OpexBreakdown),
    EbitdaProxy(EbitdaProxy),
    CashRunway(CashRunway),
}

/// Route a question to its calculator.
pub fn answer(table: &Table, question: &Question) -> CopilotResult<MetricResult> {
    let result = match *question {
        Question::RevenueVsBudget { period } => {
            MetricResult::RevenueVsBudget(revenue_vs_budget(table, period)?)
        }
        Question::GrossMarginTrend { months, end } => MetricResult::GrossMarginTrend {
            points: gross_margin_trend(table, months, end)?,
        },
        Question::OpexBreakdown { period } => {
            MetricResult::OpexBreakdown(opex_breakdown(table, period)?)
        }
        Question::EbitdaProxy { period } => MetricResult::EbitdaProxy(ebitda_proxy(table, period)?),
        Question::CashRunway { as_of } => MetricResult::CashRunway(cash_runway(table, as_of)?),
    };
    Ok(result)
}
