use super::format::render_text;
use crate::core::{self, MetricResult, Question};
use crate::error::{CopilotError, CopilotResult};
use crate::excel::{self, ChartExporter};
use crate::planner;
use crate::types::Table;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default input workbook, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "fixtures/data.xlsx";

/// How answers are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured terminal text
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

/// Per-invocation presentation switches
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Optional chart workbook (.xlsx) to write the answer into
    pub chart: Option<PathBuf>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            chart: None,
        }
    }
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> CopilotResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| CopilotError::Export(format!("JSON serialization failed: {}", e))),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| CopilotError::Export(format!("YAML serialization failed: {}", e))),
        OutputFormat::Text => Err(CopilotError::Export(
            "text output is rendered, not serialized".to_string(),
        )),
    }
}

/// Execute the ask command: classify free text, then answer it
pub fn ask(file: &Path, question: &str, output: &OutputOptions) -> CopilotResult<()> {
    let question = planner::classify(question)?;
    debug!(?question, "classified question");

    if output.format == OutputFormat::Text {
        println!("{} {}", "Intent:".bold(), question.intent().bright_blue());
        println!();
    }

    answer(file, &question, output)
}

/// Load the workbook and answer a structured question
pub fn answer(file: &Path, question: &Question, output: &OutputOptions) -> CopilotResult<()> {
    let table = excel::load(file)?;
    answer_with_table(&table, question, output)
}

/// Answer against an already loaded table.
///
/// Data-dependent failures (unknown period, undefined ratio) are printed as
/// the answer; only input/output failures are returned.
pub fn answer_with_table(
    table: &Table,
    question: &Question,
    output: &OutputOptions,
) -> CopilotResult<()> {
    match core::answer(table, question) {
        Ok(result) => {
            print_result(&result, output.format)?;
            if let Some(chart) = &output.chart {
                ChartExporter::new(&result).export(chart)?;
                if output.format == OutputFormat::Text {
                    println!(
                        "{}",
                        format!("✅ Chart written to {}", chart.display()).green()
                    );
                }
            }
            Ok(())
        }
        Err(e) if e.is_recoverable() => print_recoverable(&e, output.format),
        Err(e) => Err(e),
    }
}

fn print_result(result: &MetricResult, format: OutputFormat) -> CopilotResult<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(result)),
        _ => println!("{}", serialize(result, format)?),
    }
    Ok(())
}

#[derive(Serialize)]
struct Unanswered {
    answered: bool,
    reason: String,
}

fn print_recoverable(error: &CopilotError, format: OutputFormat) -> CopilotResult<()> {
    match format {
        OutputFormat::Text => println!("{} {}", "⚠️".yellow(), error.to_string().yellow()),
        _ => {
            let body = Unanswered {
                answered: false,
                reason: error.to_string(),
            };
            println!("{}", serialize(&body, format)?);
        }
    }
    Ok(())
}

/// Execute the periods command: list months present in the workbook
pub fn periods(file: &Path, format: OutputFormat) -> CopilotResult<()> {
    let table = excel::load(file)?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for period in core::query::distinct_periods_sorted(&table) {
        let rows = core::query::filter_by_period(&table, period);
        counts.insert(period.to_string(), rows.len());
    }

    match format {
        OutputFormat::Text => {
            println!(
                "{}",
                format!("📅 Periods in {}", table.source().display()).bold().cyan()
            );
            for (period, rows) in &counts {
                println!("   {}  ({} line items)", period.bright_blue(), rows);
            }
        }
        _ => println!("{}", serialize(&counts, format)?),
    }
    Ok(())
}
