//! Fatal error conditions for the benchmark gate
//!
//! Anything in here means the input contract was violated and no comparison
//! is meaningful. Expected findings (regressions, variance breaches, missing
//! groups) are not errors; see [`crate::regression::Failure`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a gate run
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid {encoding} byte sequence", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("{}:{line} invalid JSON object: {source}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing {family} fields in row {row}: {missing:?}")]
    MissingFields {
        family: &'static str,
        row: usize,
        missing: Vec<String>,
    },

    #[error("Record on line {line} carries the fields of both AM and Cluster benchmarks")]
    AmbiguousRecord { line: usize },

    #[error("Field '{field}' on line {line} is not a valid {expected}: {value}")]
    InvalidField {
        field: String,
        line: usize,
        expected: &'static str,
        value: String,
    },

    #[error("Invalid baseline {}: {reason}", path.display())]
    InvalidBaseline { path: PathBuf, reason: String },

    #[error("Invalid gate configuration: {0}")]
    InvalidConfig(String),
}

impl GateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GateError::Io {
            path: path.into(),
            source,
        }
    }
}
