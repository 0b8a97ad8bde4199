//! Text rendering of metric answers

use crate::core::{
    CashRunway, EbitdaProxy, GrossMarginPoint, MetricResult, OpexBreakdown, RevenueVsBudget,
};
use colored::Colorize;
use rust_decimal::Decimal;

/// Whole-currency amount with thousands separators: `$120,000`, `-$4,500`.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round();
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Percentage with one decimal from percentage points (`60` → `60.0%`).
pub fn format_pct(points: Decimal) -> String {
    format!("{:.1}%", points)
}

/// Percentage from a ratio (`0.111` → `11.1%`).
pub fn format_ratio(ratio: Decimal) -> String {
    format_pct(ratio * Decimal::ONE_HUNDRED)
}

/// Render any answer as terminal text.
pub fn render_text(result: &MetricResult) -> String {
    match result {
        MetricResult::RevenueVsBudget(r) => revenue_text(r),
        MetricResult::GrossMarginTrend { points } => margin_text(points),
        MetricResult::OpexBreakdown(b) => opex_text(b),
        MetricResult::EbitdaProxy(e) => ebitda_text(e),
        MetricResult::CashRunway(c) => runway_text(c),
    }
}

/// Join rendered lines, one per terminal line.
fn lines(rows: Vec<String>) -> String {
    let mut out = rows.join("\n");
    out.push('\n');
    out
}

fn revenue_text(r: &RevenueVsBudget) -> String {
    let pct = r
        .variance_pct()
        .map(format_ratio)
        .unwrap_or_else(|_| "N/A".to_string());
    let variance = format!("{} ({})", format_money(r.variance), pct);
    let variance = if r.variance.is_sign_negative() {
        variance.red()
    } else {
        variance.green()
    };

    lines(vec![
        format!("📊 Revenue vs Budget: {}", r.period).bold().cyan().to_string(),
        format!("   Actual:   {}", format_money(r.actual).bold()),
        format!("   Budget:   {}", format_money(r.budget)),
        format!("   Variance: {}", variance),
    ])
}

fn margin_text(points: &[GrossMarginPoint]) -> String {
    let title = format!("📈 Gross Margin % (last {} months)", points.len())
        .bold()
        .cyan()
        .to_string();
    if points.is_empty() {
        return lines(vec![title, "   No periods to show".to_string()]);
    }

    let mut out = vec![
        title,
        format!("   {:<9} {:>14} {:>14} {:>8}", "Month", "Revenue", "COGS", "GM %"),
        format!("   {}", "─".repeat(48)),
    ];
    out.extend(points.iter().map(|point| {
        let gm = point
            .gross_margin_pct
            .map(format_pct)
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "   {:<9} {:>14} {:>14} {:>8}",
            point.period.to_string(),
            format_money(point.revenue),
            format_money(point.cogs),
            gm
        )
    }));
    lines(out)
}

fn opex_text(b: &OpexBreakdown) -> String {
    let mut out = vec![format!("💸 Opex breakdown: {}", b.period).bold().cyan().to_string()];
    if b.lines.is_empty() {
        out.push("   No opex recorded".to_string());
    }
    out.extend(
        b.lines
            .iter()
            .map(|line| format!("   {:<28} {:>14}", line.category, format_money(line.amount))),
    );
    out.push(format!("   {}", "─".repeat(43)));
    out.push(format!("   {:<28} {:>14}", "Total", format_money(b.total)));
    lines(out)
}

fn ebitda_text(e: &EbitdaProxy) -> String {
    lines(vec![
        format!("🧮 EBITDA proxy: {}", e.period).bold().cyan().to_string(),
        format!("   EBITDA:  {}", format_money(e.ebitda).bold()),
        format!(
            "   Revenue: {}, COGS: {}, Opex: {}",
            format_money(e.revenue),
            format_money(e.cogs),
            format_money(e.opex)
        ),
    ])
}

fn runway_text(c: &CashRunway) -> String {
    let runway = match c.runway_months() {
        Ok(months) => format!("{:.1} months", months).bold(),
        Err(_) => "N/A (not burning cash)".green(),
    };

    lines(vec![
        format!("🛫 Cash runway (as of {})", c.as_of).bold().cyan().to_string(),
        format!("   Current cash:     {}", format_money(c.current_cash)),
        format!(
            "   Avg monthly burn: {} ({}-month average)",
            format_money(c.average_monthly_burn),
            c.monthly_burn.len()
        ),
        format!("   Runway:           {}", runway),
    ])
}
