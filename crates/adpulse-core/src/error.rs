use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which of the two compared windows a set of totals belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowLabel {
    Current,
    Previous,
}

impl WindowLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowLabel::Current => "current",
            WindowLabel::Previous => "previous",
        }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    /// The sequence ended before this index.
    Missing { len: usize },
    NonFinite { value: f64 },
    Negative { value: f64 },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Missing { len } => write!(f, "missing (sequence has {len} values)"),
            InvalidReason::NonFinite { value } => write!(f, "not finite ({value})"),
            InvalidReason::Negative { value } => write!(f, "negative ({value})"),
        }
    }
}

/// A `ReportTotals` sequence failed validation in `compute`.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[error("invalid {window} totals at index {index}: {reason}")]
pub struct InvalidInputError {
    pub window: WindowLabel,
    pub index: usize,
    pub reason: InvalidReason,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("window end {end} is before start {start}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("window length must be at least one day")]
    EmptyWindow,

    #[error("date range falls outside the supported calendar")]
    DateOutOfRange,

    #[error("report row {row} has {found} metric values, expected {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}
