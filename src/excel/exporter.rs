//! Chart exporter - metric answer → .xlsx workbook with a native Excel chart

use crate::core::MetricResult;
use crate::error::{CopilotError, CopilotResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Chart, ChartType, Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::info;

const DATA_SHEET: &str = "Data";

/// One plotted series; `None` leaves a gap (undefined value).
struct Series {
    name: String,
    values: Vec<Option<f64>>,
}

/// Everything needed to lay out the data sheet and its chart.
struct ChartData {
    title: String,
    chart_type: ChartType,
    label_header: &'static str,
    y_axis: &'static str,
    labels: Vec<String>,
    series: Vec<Series>,
    /// Key/value rows written under the series table.
    summary: Vec<(&'static str, String)>,
}

fn to_f64(value: Decimal) -> Option<f64> {
    value.to_f64()
}

fn export_error(e: XlsxError) -> CopilotError {
    CopilotError::Export(e.to_string())
}

/// Writes a [`MetricResult`] as a data sheet plus chart
pub struct ChartExporter<'a> {
    result: &'a MetricResult,
}

impl<'a> ChartExporter<'a> {
    pub fn new(result: &'a MetricResult) -> Self {
        Self { result }
    }

    /// Export the chart workbook to `output_path` (must end in `.xlsx`).
    pub fn export(&self, output_path: &Path) -> CopilotResult<()> {
        let extension = output_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !extension.eq_ignore_ascii_case("xlsx") {
            return Err(CopilotError::Export(format!(
                "Unsupported chart format: '{}'. Use .xlsx",
                output_path.display()
            )));
        }

        let data = self.chart_data();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(DATA_SHEET).map_err(export_error)?;

        let last_row = self.write_data(worksheet, &data)?;
        if last_row > 0 {
            let chart = self.build_chart(&data, last_row);
            let chart_col = (data.series.len() + 2) as u16;
            worksheet
                .insert_chart(1, chart_col, &chart)
                .map_err(export_error)?;
        }

        workbook.save(output_path).map_err(|e| {
            CopilotError::Export(format!(
                "Failed to save chart workbook {}: {}",
                output_path.display(),
                e
            ))
        })?;

        info!(path = %output_path.display(), title = %data.title, "chart exported");
        Ok(())
    }

    /// Write the label/series table and summary rows.
    /// Returns the last data row (0 when there is nothing to plot).
    fn write_data(&self, worksheet: &mut Worksheet, data: &ChartData) -> CopilotResult<u32> {
        let header_format = Format::new().set_bold();
        let number_format = Format::new().set_num_format("#,##0.00");

        worksheet.set_column_width(0, 22).map_err(export_error)?;
        worksheet
            .write_string_with_format(0, 0, data.label_header, &header_format)
            .map_err(export_error)?;
        for (i, series) in data.series.iter().enumerate() {
            let col = (i + 1) as u16;
            worksheet.set_column_width(col, 16).map_err(export_error)?;
            worksheet
                .write_string_with_format(0, col, &series.name, &header_format)
                .map_err(export_error)?;
        }

        for (i, label) in data.labels.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, label).map_err(export_error)?;
            for (j, series) in data.series.iter().enumerate() {
                if let Some(Some(value)) = series.values.get(i) {
                    worksheet
                        .write_number_with_format(row, (j + 1) as u16, *value, &number_format)
                        .map_err(export_error)?;
                }
            }
        }

        let last_row = data.labels.len() as u32;
        let mut row = last_row + 2;
        for (key, value) in &data.summary {
            worksheet
                .write_string_with_format(row, 0, *key, &header_format)
                .map_err(export_error)?;
            worksheet.write_string(row, 1, value).map_err(export_error)?;
            row += 1;
        }

        Ok(last_row)
    }

    fn build_chart(&self, data: &ChartData, last_row: u32) -> Chart {
        let mut chart = Chart::new(data.chart_type);
        chart.title().set_name(data.title.as_str());
        chart.y_axis().set_name(data.y_axis);

        for (i, series) in data.series.iter().enumerate() {
            let col = (i + 1) as u16;
            chart
                .add_series()
                .set_name((DATA_SHEET, 0, col))
                .set_categories((DATA_SHEET, 1, 0, last_row, 0))
                .set_values((DATA_SHEET, 1, col, last_row, col));
        }
        if data.series.len() == 1 {
            chart.legend().set_hidden();
        }

        chart
    }

    fn chart_data(&self) -> ChartData {
        match self.result {
            MetricResult::RevenueVsBudget(r) => ChartData {
                title: format!("Revenue vs Budget ({})", r.period),
                chart_type: ChartType::Column,
                label_header: "Revenue",
                y_axis: "USD",
                labels: vec!["Actual".to_string(), "Budget".to_string()],
                series: vec![Series {
                    name: "Amount".to_string(),
                    values: vec![to_f64(r.actual), to_f64(r.budget)],
                }],
                summary: vec![
                    ("Variance", r.variance.round_dp(2).to_string()),
                    (
                        "Variance %",
                        r.variance_pct()
                            .map(|pct| format!("{}%", (pct * Decimal::ONE_HUNDRED).round_dp(1)))
                            .unwrap_or_else(|_| "N/A".to_string()),
                    ),
                ],
            },
            MetricResult::GrossMarginTrend { points } => ChartData {
                title: "Gross Margin %".to_string(),
                chart_type: ChartType::Line,
                label_header: "Month",
                y_axis: "Gross margin (%)",
                labels: points.iter().map(|p| p.period.to_string()).collect(),
                series: vec![Series {
                    name: "Gross margin %".to_string(),
                    values: points
                        .iter()
                        .map(|p| p.gross_margin_pct.and_then(to_f64))
                        .collect(),
                }],
                summary: Vec::new(),
            },
            MetricResult::OpexBreakdown(b) => ChartData {
                title: format!("Opex breakdown ({})", b.period),
                chart_type: ChartType::Bar,
                label_header: "Category",
                y_axis: "USD",
                labels: b.lines.iter().map(|l| l.category.clone()).collect(),
                series: vec![Series {
                    name: "Amount".to_string(),
                    values: b.lines.iter().map(|l| to_f64(l.amount)).collect(),
                }],
                summary: vec![("Total opex", b.total.round_dp(2).to_string())],
            },
            MetricResult::EbitdaProxy(e) => ChartData {
                title: format!("EBITDA proxy ({})", e.period),
                chart_type: ChartType::Column,
                label_header: "Component",
                y_axis: "USD",
                labels: ["Revenue", "COGS", "Opex", "EBITDA"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                series: vec![Series {
                    name: "Amount".to_string(),
                    values: vec![
                        to_f64(e.revenue),
                        to_f64(e.cogs),
                        to_f64(e.opex),
                        to_f64(e.ebitda),
                    ],
                }],
                summary: Vec::new(),
            },
            MetricResult::CashRunway(c) => ChartData {
                title: format!("Monthly net burn (as of {})", c.as_of),
                chart_type: ChartType::Column,
                label_header: "Month",
                y_axis: "USD",
                labels: c.monthly_burn.iter().map(|b| b.period.to_string()).collect(),
                series: vec![Series {
                    name: "Net burn".to_string(),
                    values: c.monthly_burn.iter().map(|b| to_f64(b.value)).collect(),
                }],
                summary: vec![
                    ("Current cash", c.current_cash.round_dp(2).to_string()),
                    (
                        "Avg monthly burn",
                        c.average_monthly_burn.round_dp(2).to_string(),
                    ),
                    (
                        "Runway (months)",
                        c.runway_months()
                            .map(|m| m.round_dp(1).to_string())
                            .unwrap_or_else(|_| "N/A".to_string()),
                    ),
                ],
            },
        }
    }
}
