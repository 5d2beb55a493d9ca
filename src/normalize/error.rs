use crate::types::source::SourceKind;
use polars::error::PolarsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single raw row could not become a typed record. The row is dropped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Required field '{column}' is empty")]
    MissingField { column: &'static str },

    #[error("Field '{column}' is not a number: '{value}'")]
    InvalidNumber { column: &'static str, value: String },

    #[error("Unrecognised timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Unrecognised date '{0}'")]
    InvalidDate(String),

    #[error("Unit '{0}' is not one of Bq, Bq/kg dry, Bq/L, mm")]
    UnknownUnit(String),

    #[error("Collection medium '{0}' is neither soil nor water")]
    UnknownEnvironment(String),

    #[error("Row has neither town hall nor centre coordinates")]
    MissingCoordinates,
}

/// Aggregation key for dropped rows in the quality report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectReason {
    MalformedSchema,
    ProjectionFailure,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MalformedSchema => write!(f, "malformed_schema"),
            RejectReason::ProjectionFailure => write!(f, "projection_failure"),
        }
    }
}

/// A source that cannot be read at all. Unlike [`SchemaError`] this is fatal.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {kind} file '{path}'")]
    Read {
        kind: SourceKind,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' not found in {kind} file '{path}'")]
    MissingColumn {
        kind: SourceKind,
        path: PathBuf,
        column: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to list raw data directory '{0}'")]
    ListDirectory(PathBuf, #[source] std::io::Error),

    #[error("No radiation files matching '{pattern}' in '{dir}'")]
    NoRadiationFiles { dir: PathBuf, pattern: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
