//! Metric calculator tests against the sample workbook and small in-memory tables

mod common;

use cfo_copilot::core::metrics::{CASH_BALANCE, CASH_INFLOW, CASH_OUTFLOW};
use cfo_copilot::core::query::{distinct_periods_sorted, filter_by_category_prefix, filter_by_period, sum_actual};
use cfo_copilot::core::{
    answer, cash_runway, ebitda_proxy, gross_margin_trend, opex_breakdown, revenue_vs_budget,
    MetricResult, Question,
};
use cfo_copilot::error::CopilotError;
use cfo_copilot::excel::load;
use cfo_copilot::types::{LineItem, Period, Table};
use common::fixture_path;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn p(s: &str) -> Period {
    s.parse().unwrap()
}

fn d(n: i64) -> Decimal {
    Decimal::from(n)
}

fn fixture() -> Table {
    load(fixture_path()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// SAMPLE WORKBOOK
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_june_revenue_vs_budget() {
    let result = revenue_vs_budget(&fixture(), p("2025-06")).unwrap();
    assert_eq!(result.actual, d(120_000));
    assert_eq!(result.budget, d(110_000));
    assert_eq!(result.variance, d(10_000));
    assert_eq!(result.variance_pct().unwrap().round_dp(3), Decimal::new(91, 3));
}

#[test]
fn test_variance_is_actual_minus_budget_every_month() {
    let table = fixture();
    for period in distinct_periods_sorted(&table) {
        let result = revenue_vs_budget(&table, period).unwrap();
        assert_eq!(result.variance, result.actual - result.budget, "{}", period);
    }
}

#[test]
fn test_gross_margin_trend_last_three_months() {
    let trend = gross_margin_trend(&fixture(), 3, None).unwrap();
    let periods: Vec<String> = trend.iter().map(|pt| pt.period.to_string()).collect();
    assert_eq!(periods, vec!["2025-04", "2025-05", "2025-06"]);

    let june = &trend[2];
    assert_eq!(june.revenue, d(120_000));
    assert_eq!(june.cogs, d(48_000));
    assert_eq!(june.gross_margin_pct, Some(d(60)));
}

#[test]
fn test_gross_margin_trend_window_and_end() {
    let table = fixture();

    let all = gross_margin_trend(&table, 12, None).unwrap();
    assert_eq!(all.len(), 6);
    assert!(all.windows(2).all(|w| w[0].period < w[1].period));

    let ending_march = gross_margin_trend(&table, 2, Some(p("2025-03"))).unwrap();
    let periods: Vec<String> = ending_march.iter().map(|pt| pt.period.to_string()).collect();
    assert_eq!(periods, vec!["2025-02", "2025-03"]);

    assert!(gross_margin_trend(&table, 0, None).unwrap().is_empty());
}

#[test]
fn test_june_opex_breakdown() {
    let breakdown = opex_breakdown(&fixture(), p("2025-06")).unwrap();
    assert_eq!(breakdown.get("Opex:Marketing"), Some(d(9_000)));
    assert_eq!(breakdown.get("Opex:Payroll"), Some(d(30_000)));
    assert_eq!(breakdown.get("Opex:R&D"), Some(d(12_000)));
    assert_eq!(breakdown.get("Opex:G&A"), Some(d(6_000)));
    assert_eq!(breakdown.total, d(57_000));

    let line_sum: Decimal = breakdown.lines.iter().map(|l| l.amount).sum();
    assert_eq!(line_sum, breakdown.total);
}

#[test]
fn test_ebitda_matches_components_every_month() {
    let table = fixture();
    for period in distinct_periods_sorted(&table) {
        let rows = filter_by_period(&table, period);
        let revenue = sum_actual(filter_by_category_prefix(rows.iter().copied(), "Revenue"));
        let cogs = sum_actual(filter_by_category_prefix(rows.iter().copied(), "COGS"));
        let opex = sum_actual(filter_by_category_prefix(rows.iter().copied(), "Opex"));

        let result = ebitda_proxy(&table, period).unwrap();
        assert_eq!(result.ebitda, revenue - cogs - opex, "{}", period);
    }

    assert_eq!(ebitda_proxy(&table, p("2025-06")).unwrap().ebitda, d(15_000));
}

#[test]
fn test_cash_runway_on_sample() {
    let runway = cash_runway(&fixture(), None).unwrap();
    assert_eq!(runway.as_of, p("2025-06"));
    assert_eq!(runway.current_cash, d(120_000));
    assert_eq!(runway.average_monthly_burn, d(20_000));
    assert_eq!(runway.runway_months().unwrap(), d(6));

    let burns: Vec<Decimal> = runway.monthly_burn.iter().map(|b| b.value).collect();
    assert_eq!(burns, vec![d(20_000), d(25_000), d(15_000)]);
}

#[test]
fn test_cash_runway_as_of_earlier_month() {
    // Feb-Apr burns are 15k, 15k, 20k; April balance is 160k
    let runway = cash_runway(&fixture(), Some(p("2025-04"))).unwrap();
    assert_eq!(runway.as_of, p("2025-04"));
    assert_eq!(runway.current_cash, d(160_000));
    assert_eq!(
        runway.average_monthly_burn.round_dp(2),
        Decimal::new(1_666_667, 2)
    );
    assert_eq!(runway.runway_months().unwrap().round_dp(1), Decimal::new(96, 1));
}

#[test]
fn test_unknown_period_everywhere() {
    let table = fixture();
    let missing = p("2099-01");

    let is_not_found =
        |err: CopilotError| matches!(err, CopilotError::PeriodNotFound { period } if period == missing);

    assert!(is_not_found(revenue_vs_budget(&table, missing).unwrap_err()));
    assert!(is_not_found(opex_breakdown(&table, missing).unwrap_err()));
    assert!(is_not_found(ebitda_proxy(&table, missing).unwrap_err()));
    assert!(is_not_found(gross_margin_trend(&table, 3, Some(missing)).unwrap_err()));
    assert!(is_not_found(cash_runway(&table, Some(missing)).unwrap_err()));
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKED EXAMPLES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_variance_example() {
    let table = Table::new(vec![LineItem::new(
        p("2025-06"),
        "Revenue",
        d(100_000),
        Some(d(90_000)),
    )])
    .unwrap();

    let result = revenue_vs_budget(&table, p("2025-06")).unwrap();
    assert_eq!(result.variance, d(10_000));
    assert_eq!(result.variance_pct().unwrap().round_dp(3), Decimal::new(111, 3));
}

#[test]
fn test_runway_example() {
    let mut items = Vec::new();
    for (month, burn) in [("2025-04", 20_000), ("2025-05", 25_000), ("2025-06", 15_000)] {
        items.push(LineItem::new(p(month), CASH_OUTFLOW, d(burn), None));
        items.push(LineItem::new(p(month), CASH_INFLOW, Decimal::ZERO, None));
    }
    items.push(LineItem::new(p("2025-06"), CASH_BALANCE, d(120_000), None));
    let table = Table::new(items).unwrap();

    let runway = cash_runway(&table, None).unwrap();
    assert_eq!(runway.average_monthly_burn, d(20_000));
    assert_eq!(runway.runway_months().unwrap(), d(6));
}

#[test]
fn test_runway_with_fewer_months_than_window() {
    let table = Table::new(vec![
        LineItem::new(p("2025-06"), CASH_OUTFLOW, d(50), None),
        LineItem::new(p("2025-06"), CASH_BALANCE, d(200), None),
    ])
    .unwrap();

    let runway = cash_runway(&table, None).unwrap();
    assert_eq!(runway.monthly_burn.len(), 1);
    assert_eq!(runway.runway_months().unwrap(), d(4));
}

#[test]
fn test_case_insensitive_category_match() {
    let table = Table::new(vec![
        LineItem::new(p("2025-06"), "revenue", d(10), Some(d(5))),
        LineItem::new(p("2025-06"), "OPEX:Rent", d(3), None),
    ])
    .unwrap();

    assert_eq!(revenue_vs_budget(&table, p("2025-06")).unwrap().actual, d(10));
    assert_eq!(opex_breakdown(&table, p("2025-06")).unwrap().total, d(3));
}

// ═══════════════════════════════════════════════════════════════════════════
// DISPATCH
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_answer_dispatches_each_question() {
    let table = fixture();
    let june = p("2025-06");

    match answer(&table, &Question::RevenueVsBudget { period: june }).unwrap() {
        MetricResult::RevenueVsBudget(r) => assert_eq!(r.actual, d(120_000)),
        other => panic!("unexpected {:?}", other),
    }
    match answer(&table, &Question::GrossMarginTrend { months: 2, end: None }).unwrap() {
        MetricResult::GrossMarginTrend { points } => assert_eq!(points.len(), 2),
        other => panic!("unexpected {:?}", other),
    }
    match answer(&table, &Question::OpexBreakdown { period: june }).unwrap() {
        MetricResult::OpexBreakdown(b) => assert_eq!(b.total, d(57_000)),
        other => panic!("unexpected {:?}", other),
    }
    match answer(&table, &Question::EbitdaProxy { period: june }).unwrap() {
        MetricResult::EbitdaProxy(e) => assert_eq!(e.ebitda, d(15_000)),
        other => panic!("unexpected {:?}", other),
    }
    match answer(&table, &Question::CashRunway { as_of: None }).unwrap() {
        MetricResult::CashRunway(c) => assert_eq!(c.current_cash, d(120_000)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_answer_without_budget_still_reports_amounts() {
    let table = Table::new(vec![LineItem::new(p("2025-06"), "Revenue", d(10), None)]).unwrap();
    let result = answer(&table, &Question::RevenueVsBudget { period: p("2025-06") }).unwrap();

    let MetricResult::RevenueVsBudget(revenue) = result else {
        panic!("expected revenue vs budget");
    };
    assert_eq!(revenue.variance, d(10));
    assert!(matches!(
        revenue.variance_pct(),
        Err(CopilotError::DivisionUndefined { .. })
    ));
}
