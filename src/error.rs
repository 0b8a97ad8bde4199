use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::Period;

pub type CopilotResult<T> = Result<T, CopilotError>;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("Failed to load {}: {reason}", .path.display())]
    Input { path: PathBuf, reason: String },

    #[error("No data for period {period}")]
    PeriodNotFound { period: Period },

    #[error("No '{category}' rows for period {period}")]
    CategoryNotFound { category: String, period: Period },

    #[error("{what} is undefined for {period}: division by zero")]
    DivisionUndefined { what: String, period: Period },

    #[error("Runway is undefined: average monthly burn is {average_monthly_burn} (not burning cash)")]
    RunwayUndefined { average_monthly_burn: Decimal },

    #[error("Invalid period '{0}' (expected e.g. 2025-06 or June 2025)")]
    InvalidPeriod(String),

    #[error("Please specify a month for {intent} (e.g. 'June 2025' or '2025-06')")]
    MissingPeriod { intent: String },

    #[error("Could not classify question: '{0}'")]
    UnrecognizedQuestion(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CopilotError {
    /// Shorthand for a load failure tied to the input file.
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CopilotError::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Errors that describe the data rather than a broken run.
    ///
    /// These are shown to the user as an answer ("no data", "N/A") and the
    /// process still exits successfully.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CopilotError::PeriodNotFound { .. }
                | CopilotError::CategoryNotFound { .. }
                | CopilotError::DivisionUndefined { .. }
                | CopilotError::RunwayUndefined { .. }
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            e if e.is_recoverable() => 0,
            CopilotError::InvalidPeriod(_)
            | CopilotError::MissingPeriod { .. }
            | CopilotError::UnrecognizedQuestion(_) => 2,
            _ => 1,
        }
    }
}
