use crate::types::radiation::Unit;
use chrono::NaiveDateTime;
use polars::error::PolarsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A linked record that breaks a global invariant of the output table. The record is dropped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Sample '{sample_id}' has a negative or non-finite result {value}")]
    InvalidResult { sample_id: String, value: f64 },

    #[error("Sample '{sample_id}' is expressed in {unit}, which is not a radioactivity unit")]
    UnsupportedUnit { sample_id: String, unit: Unit },

    #[error("Sample id '{sample_id}' already used at {kept}, dropping the one at {dropped}")]
    DuplicateSampleId {
        sample_id: String,
        kept: NaiveDateTime,
        dropped: NaiveDateTime,
    },
}

impl ValidationError {
    pub fn reason(&self) -> ValidationReason {
        match self {
            ValidationError::InvalidResult { .. } => ValidationReason::InvalidResult,
            ValidationError::UnsupportedUnit { .. } => ValidationReason::UnsupportedUnit,
            ValidationError::DuplicateSampleId { .. } => ValidationReason::DuplicateSampleId,
        }
    }
}

/// Aggregation key for validation failures in the quality report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationReason {
    InvalidResult,
    UnsupportedUnit,
    DuplicateSampleId,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::InvalidResult => write!(f, "invalid_result"),
            ValidationReason::UnsupportedUnit => write!(f, "unsupported_unit"),
            ValidationReason::DuplicateSampleId => write!(f, "duplicate_sample_id"),
        }
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory '{0}'")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to create temporary output file in '{0}'")]
    TempFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode the output table")]
    Encode(#[source] PolarsError),

    #[error("Failed to move the output table into place at '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("Failed to remove the stale output table at '{0}'")]
    RemoveStale(PathBuf, #[source] std::io::Error),
}
