//! Structured error types for the normalization pipeline.
//!
//! Every variant is terminal for the series being built. Payloads carry the
//! raw context (preview rows, column names, counts) needed to fix the input
//! without re-running under a debugger.

use crate::domain::MonthKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "could not locate the data header within the first {window} rows; first rows:\n{}",
        .preview.join("\n")
    )]
    HeaderNotFound { window: usize, preview: Vec<String> },

    #[error("no column found for role '{role}'; columns present: {available:?}")]
    ColumnNotFound { role: String, available: Vec<String> },

    #[error("no usable rows remained after cleaning {context} ({scanned} rows scanned)")]
    NoUsableRows { context: String, scanned: usize },

    #[error("series has {observed} points, fewer than the required minimum of {minimum}")]
    InsufficientRows { observed: usize, minimum: usize },

    #[error("non-positive price {price} at {month}: cannot compound through it")]
    InvalidPriorPrice { month: MonthKey, price: f64 },

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationFailure),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("failed to read {what}: {reason}")]
    Read { what: String, reason: String },

    #[error("failed to write {what}: {reason}")]
    Write { what: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset '{name}' failed: {source}")]
    Dataset {
        name: String,
        #[source]
        source: Box<PipelineError>,
    },
}

/// Why the final gate rejected a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("series is empty")]
    EmptySeries,

    #[error("dates not strictly increasing at index {index}: {previous} then {current}")]
    NotIncreasing {
        index: usize,
        previous: MonthKey,
        current: MonthKey,
    },

    #[error("non-finite value {value} at index {index} ({date})")]
    NonFinite {
        index: usize,
        date: MonthKey,
        value: f64,
    },

    #[error("envelope {field} is {declared} but the series says {actual}")]
    EnvelopeMismatch {
        field: &'static str,
        declared: MonthKey,
        actual: MonthKey,
    },
}

impl PipelineError {
    /// Attach the dataset name for batch reporting.
    pub fn in_dataset(self, name: &str) -> Self {
        PipelineError::Dataset {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_not_found_prints_preview() {
        let err = PipelineError::HeaderNotFound {
            window: 200,
            preview: vec!["\"TERMS AND CONDITIONS\"".into(), "junk,1".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("first 200 rows"));
        assert!(msg.contains("TERMS AND CONDITIONS"));
        assert!(msg.contains("junk,1"));
    }

    #[test]
    fn column_not_found_lists_columns() {
        let err = PipelineError::ColumnNotFound {
            role: "dividend".into(),
            available: vec!["Date".into(), "P".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("dividend"));
        assert!(msg.contains("\"Date\""));
        assert!(msg.contains("\"P\""));
    }

    #[test]
    fn dataset_wrapper_keeps_inner_message() {
        let err = PipelineError::InsufficientRows {
            observed: 5,
            minimum: 100,
        }
        .in_dataset("usdcad");
        let msg = err.to_string();
        assert!(msg.contains("usdcad"));
        assert!(msg.contains("5 points"));
    }
}
