//! Free-text question → [`Question`]
//!
//! Keyword routing only. Recognized phrasings:
//!
//! - "What was June 2025 revenue vs budget?"
//! - "Show gross margin % trend for the last 3 months"
//! - "Break down opex by category for 2025-06"
//! - "What is our cash runway right now?"
//! - "EBITDA for Jun 2025"

use crate::core::{Question, DEFAULT_TREND_MONTHS};
use crate::error::{CopilotError, CopilotResult};
use crate::types::Period;
use regex::Regex;

fn pattern(re: &str) -> CopilotResult<Regex> {
    Regex::new(re).map_err(|e| CopilotError::UnrecognizedQuestion(format!("pattern error: {}", e)))
}

/// First month mentioned in the question (`2025-06`, `2025-06-01`, `June 2025`).
fn find_month(question: &str) -> CopilotResult<Option<Period>> {
    let iso = pattern(r"\b\d{4}-\d{2}(?:-\d{2})?\b")?;
    let named = pattern(r"\b[a-z]{3,9} \d{4}\b")?;

    let period = iso
        .find_iter(question)
        .chain(named.find_iter(question))
        .find_map(|m| m.as_str().parse::<Period>().ok());
    Ok(period)
}

/// `N` in "last N months".
fn find_trailing_months(question: &str) -> CopilotResult<Option<usize>> {
    let re = pattern(r"last (\d+) months?")?;
    Ok(re
        .captures(question)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok()))
}

fn require_month(month: Option<Period>, intent: &str) -> CopilotResult<Period> {
    month.ok_or_else(|| CopilotError::MissingPeriod {
        intent: intent.to_string(),
    })
}

/// Classify a finance question.
pub fn classify(question: &str) -> CopilotResult<Question> {
    let q = question.trim().to_lowercase();
    let month = find_month(&q)?;

    if q.contains("revenue") && q.contains("budget") {
        return Ok(Question::RevenueVsBudget {
            period: require_month(month, "revenue vs budget")?,
        });
    }

    if q.contains("gross margin") {
        let months = find_trailing_months(&q)?.unwrap_or(DEFAULT_TREND_MONTHS);
        return Ok(Question::GrossMarginTrend { months, end: month });
    }

    if q.contains("opex") || q.contains("operating expense") {
        return Ok(Question::OpexBreakdown {
            period: require_month(month, "opex breakdown")?,
        });
    }

    if q.contains("runway") {
        return Ok(Question::CashRunway { as_of: month });
    }

    if q.contains("ebitda") || q.contains("earnings") || q.contains("operating profit") {
        return Ok(Question::EbitdaProxy {
            period: require_month(month, "EBITDA proxy")?,
        });
    }

    Err(CopilotError::UnrecognizedQuestion(question.trim().to_string()))
}
