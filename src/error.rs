// =============================================================================
// Error types for the analysis engine
// =============================================================================
//
// Only structural problems are errors. A window longer than the available
// history is not an error: the affected metric is simply `None`.

use chrono::NaiveDate;
use thiserror::Error;

/// Hard failures raised before any indicator is computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The series contains no bars at all.
    #[error("price series is empty")]
    EmptySeries,

    /// Dates must strictly increase from one bar to the next.
    #[error("bar {index} dated {date} does not follow previous bar dated {previous}")]
    NonMonotonicDates {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    /// Two bars share the same date.
    #[error("duplicate bar for {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    /// A price column is NaN/infinite, or high/low are inverted.
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    /// The payload could not be decoded into bars (missing columns etc).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}
