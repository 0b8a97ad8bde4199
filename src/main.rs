use cfo_copilot::cli::{self, OutputFormat, OutputOptions, DEFAULT_DATA_PATH};
use cfo_copilot::core::{Question, DEFAULT_TREND_MONTHS};
use cfo_copilot::error::CopilotError;
use cfo_copilot::types::Period;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Mini FP&A assistant: answers finance questions from one Excel workbook.")]
#[command(long_about = "CFO Copilot - mini FP&A assistant

Reads monthly actual/budget line items from an Excel workbook and answers
a fixed set of finance questions.

INPUT:
  One sheet with columns period, accountCategory, actualAmount, budgetAmount.
  Categories are hierarchical: Revenue, COGS, Opex:<name>,
  Cash:Balance, Cash:Inflow, Cash:Outflow.

COMMANDS:
  ask          - Free-text question (routed to one of the metrics)
  revenue      - Revenue vs budget for a month
  gross-margin - Gross margin % trend
  opex         - Opex breakdown by category for a month
  ebitda       - EBITDA proxy (revenue - COGS - opex) for a month
  runway       - Cash runway from the last 3 months of net burn
  periods      - List months present in the workbook

EXAMPLES:
  copilot ask \"What was June 2025 revenue vs budget?\"
  copilot revenue --period 2025-06
  copilot gross-margin --months 6 --chart margin.xlsx
  copilot --file q2.xlsx --format json runway")]
#[command(version)]
struct Cli {
    /// Path to the line-item workbook (.xlsx)
    #[arg(short, long, global = true, env = "COPILOT_DATA", default_value = DEFAULT_DATA_PATH)]
    file: PathBuf,

    /// Output format for answers
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also write the answer as a chart workbook (.xlsx)
    #[arg(long, global = true)]
    chart: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Ask a finance question in plain English.

RECOGNIZED QUESTIONS:
  What was June 2025 revenue vs budget?
  Show gross margin % trend for the last 3 months
  Break down opex by category for 2025-06
  What is our cash runway right now?
  What was EBITDA in Jun 2025?

Months may be written as 'June 2025', 'Jun 2025', '2025-06' or '2025-06-01'.")]
    /// Ask a free-text finance question
    Ask {
        /// The question (quote it, or pass it as several words)
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Revenue actual vs budget for a month
    Revenue {
        /// Month, e.g. 2025-06 or "June 2025"
        #[arg(short, long)]
        period: Period,
    },

    /// Gross margin % for the last N months in the workbook
    GrossMargin {
        /// Number of months
        #[arg(short, long, default_value_t = DEFAULT_TREND_MONTHS)]
        months: usize,

        /// Last month of the trend (defaults to the latest month)
        #[arg(short, long)]
        end: Option<Period>,
    },

    /// Opex breakdown by category for a month
    Opex {
        /// Month, e.g. 2025-06
        #[arg(short, long)]
        period: Period,
    },

    /// EBITDA proxy (revenue - COGS - opex) for a month
    Ebitda {
        /// Month, e.g. 2025-06
        #[arg(short, long)]
        period: Period,
    },

    /// Cash runway from the average net burn of the last 3 months
    Runway {
        /// Latest month to consider (defaults to the latest month)
        #[arg(long)]
        as_of: Option<Period>,
    },

    /// List the months present in the workbook
    Periods,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "cfo_copilot=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = OutputOptions {
        format: cli.format,
        chart: cli.chart,
    };

    let question = match cli.command {
        Commands::Ask { question } => {
            cli::ask(&cli.file, &question.join(" "), &output)?;
            return Ok(());
        }
        Commands::Periods => {
            cli::periods(&cli.file, output.format)?;
            return Ok(());
        }
        Commands::Revenue { period } => Question::RevenueVsBudget { period },
        Commands::GrossMargin { months, end } => Question::GrossMarginTrend { months, end },
        Commands::Opex { period } => Question::OpexBreakdown { period },
        Commands::Ebitda { period } => Question::EbitdaProxy { period },
        Commands::Runway { as_of } => Question::CashRunway { as_of },
    };

    cli::answer(&cli.file, &question, &output)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "❌".red(), err);
            let code = err
                .downcast_ref::<CopilotError>()
                .map(CopilotError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
