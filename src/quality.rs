//! Rejection counters, the quality threshold and the summary emitted as log lines.

use crate::consolidate::error::ValidationReason;
use crate::matcher::UnmatchedReason;
use crate::normalize::error::RejectReason;
use crate::types::source::SourceKind;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Row counts for one raw source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTally {
    pub rows_read: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl SourceTally {
    pub(crate) fn accept(&mut self) {
        self.rows_read += 1;
        self.accepted += 1;
    }

    pub(crate) fn reject(&mut self, reason: RejectReason) {
        self.rows_read += 1;
        *self.rejected.entry(reason).or_default() += 1;
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn merge(&mut self, other: &SourceTally) {
        self.rows_read += other.rows_read;
        self.accepted += other.accepted;
        for (reason, count) in &other.rejected {
            *self.rejected.entry(*reason).or_default() += count;
        }
    }
}

/// Pipeline stage a quality check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityStage {
    Source(SourceKind),
    Consolidation,
}

impl fmt::Display for QualityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityStage::Source(kind) => write!(f, "{} source", kind),
            QualityStage::Consolidation => write!(f, "consolidation"),
        }
    }
}

/// Too large a share of a stage's rows was unusable; the run must not emit output.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{rejected} of {total} rows rejected at the {stage} stage, above the allowed fraction {max_fraction}")]
pub struct QualityThresholdExceeded {
    pub stage: QualityStage,
    pub rejected: usize,
    pub total: usize,
    pub max_fraction: f64,
}

/// Fails when strictly more than `max_fraction` of `total` rows were rejected.
///
/// An empty stage never fails.
pub fn check_threshold(
    stage: QualityStage,
    rejected: usize,
    total: usize,
    max_fraction: f64,
) -> Result<(), QualityThresholdExceeded> {
    if total == 0 || (rejected as f64 / total as f64) <= max_fraction {
        return Ok(());
    }
    Err(QualityThresholdExceeded {
        stage,
        rejected,
        total,
        max_fraction,
    })
}

/// Everything a run dropped, degraded or wrote, by reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
    pub sources: BTreeMap<SourceKind, SourceTally>,
    /// Gazetteer names that collapsed onto an already-used key.
    pub gazetteer_collisions: usize,
    /// Records kept without any coordinates.
    pub unresolved_locations: usize,
    /// Records kept without weather data, by cause.
    pub unmatched_weather: BTreeMap<UnmatchedReason, usize>,
    /// Exact (sample id, timestamp) repeats collapsed by deduplication.
    pub duplicates_removed: usize,
    pub validation_failures: BTreeMap<ValidationReason, usize>,
    pub records_written: usize,
}

impl QualityReport {
    pub fn unmatched_weather_total(&self) -> usize {
        self.unmatched_weather.values().sum()
    }

    pub fn validation_failures_total(&self) -> usize {
        self.validation_failures.values().sum()
    }

    /// Emits the report as one structured line per counter.
    pub fn log_summary(&self) {
        for (kind, tally) in &self.sources {
            info!(
                "quality: source={} rows_read={} accepted={}",
                kind, tally.rows_read, tally.accepted
            );
            for (reason, count) in &tally.rejected {
                warn!("quality: source={} reason={} dropped={}", kind, reason, count);
            }
        }
        if self.gazetteer_collisions > 0 {
            warn!(
                "quality: source=gazetteer reason=name_collision resolved={}",
                self.gazetteer_collisions
            );
        }
        if self.unresolved_locations > 0 {
            warn!(
                "quality: reason=unresolved_location retained={}",
                self.unresolved_locations
            );
        }
        for (reason, count) in &self.unmatched_weather {
            warn!(
                "quality: reason=unmatched_weather cause={} retained={}",
                reason, count
            );
        }
        info!("quality: duplicates_removed={}", self.duplicates_removed);
        for (reason, count) in &self.validation_failures {
            warn!(
                "quality: stage=consolidation reason={} dropped={}",
                reason, count
            );
        }
        info!("quality: records_written={}", self.records_written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict_and_ignores_empty_stages() {
        let stage = QualityStage::Source(SourceKind::Weather);
        assert!(check_threshold(stage, 5, 10, 0.5).is_ok());
        assert!(check_threshold(stage, 0, 0, 0.0).is_ok());
        let err = check_threshold(stage, 6, 10, 0.5).unwrap_err();
        assert_eq!(err.rejected, 6);
        assert_eq!(err.total, 10);
        assert_eq!(err.stage, stage);
    }

    #[test]
    fn tallies_merge_by_reason() {
        let mut a = SourceTally::default();
        a.accept();
        a.reject(RejectReason::MalformedSchema);
        let mut b = SourceTally::default();
        b.reject(RejectReason::MalformedSchema);
        b.reject(RejectReason::ProjectionFailure);
        a.merge(&b);
        assert_eq!(a.rows_read, 4);
        assert_eq!(a.accepted, 1);
        assert_eq!(a.rejected_total(), 3);
        assert_eq!(a.rejected[&RejectReason::MalformedSchema], 2);
    }
}
