//! CFO Copilot - mini FP&A assistant over a single Excel workbook
//!
//! Loads monthly actual/budget line items from an `.xlsx` file and answers a
//! fixed set of finance questions.
//!
//! # Features
//!
//! - Validated line-item schema at load time (period, category, actual, budget)
//! - Composable filters and sums over the loaded table
//! - Revenue vs budget, gross-margin trend, opex breakdown, EBITDA proxy,
//!   cash runway
//! - Keyword routing of free-text questions
//! - Text, JSON and YAML answers; native Excel charts
//!
//! # Example
//!
//! ```no_run
//! use cfo_copilot::core::revenue_vs_budget;
//! use cfo_copilot::excel::load;
//!
//! let table = load("fixtures/data.xlsx")?;
//! let june = "June 2025".parse()?;
//! let result = revenue_vs_budget(&table, june)?;
//!
//! println!("Actual: {}", result.actual);
//! println!("Variance: {}", result.variance);
//! # Ok::<(), cfo_copilot::error::CopilotError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod planner;
pub mod types;

// Re-export commonly used types
pub use error::{CopilotError, CopilotResult};
pub use types::{LineItem, Period, Table};
