use crate::config::ConfigError;
use crate::consolidate::error::OutputError;
use crate::normalize::error::SourceError;
use crate::quality::QualityThresholdExceeded;
use thiserror::Error;

/// Any failure that stops a pipeline run. No run that fails leaves an output file behind.
#[derive(Debug, Error)]
pub enum RadiolinkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    QualityThreshold(#[from] QualityThresholdExceeded),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
