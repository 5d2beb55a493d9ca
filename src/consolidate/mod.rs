//! Deduplication, validation and ordering of linked records before they are written.

pub mod error;
pub mod writer;

use crate::consolidate::error::{ValidationError, ValidationReason};
use crate::quality::{check_threshold, QualityStage, QualityThresholdExceeded};
use crate::types::matched::MatchedRecord;
use chrono::NaiveDateTime;
use log::{debug, info};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Records ready to be written, with what was removed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    /// Sorted by sampling timestamp, then sample id (then source file).
    pub records: Vec<MatchedRecord>,
    pub duplicates_removed: usize,
    pub validation_failures: BTreeMap<ValidationReason, usize>,
}

fn canonical_order(a: &MatchedRecord, b: &MatchedRecord) -> std::cmp::Ordering {
    let (a, b) = (&a.measurement, &b.measurement);
    (a.sampled_at, &a.sample_id, &a.source_file).cmp(&(b.sampled_at, &b.sample_id, &b.source_file))
}

/// Collapses records sharing a (sample id, timestamp) pair.
///
/// The first record in canonical order (timestamp, sample id, source file)
/// survives. Returns the survivors in that order and the number removed.
pub fn deduplicate(mut records: Vec<MatchedRecord>) -> (Vec<MatchedRecord>, usize) {
    records.sort_by(canonical_order);
    let before = records.len();
    records.dedup_by(|later, kept| {
        later.measurement.sample_id == kept.measurement.sample_id
            && later.measurement.sampled_at == kept.measurement.sampled_at
    });
    let removed = before - records.len();
    if removed > 0 {
        debug!("Removed {} duplicate samples", removed);
    }
    (records, removed)
}

fn check_record(
    record: &MatchedRecord,
    seen: &mut HashMap<String, NaiveDateTime>,
) -> Result<(), ValidationError> {
    let m = &record.measurement;
    if !m.result.is_finite() || m.result < 0.0 {
        return Err(ValidationError::InvalidResult {
            sample_id: m.sample_id.clone(),
            value: m.result,
        });
    }
    if !m.unit.is_radioactivity() {
        return Err(ValidationError::UnsupportedUnit {
            sample_id: m.sample_id.clone(),
            unit: m.unit,
        });
    }
    match seen.entry(m.sample_id.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(m.sampled_at);
            Ok(())
        }
        Entry::Occupied(slot) => Err(ValidationError::DuplicateSampleId {
            sample_id: m.sample_id.clone(),
            kept: *slot.get(),
            dropped: m.sampled_at,
        }),
    }
}

/// Drops records that break an output invariant, counting them by reason.
///
/// Expects deduplicated input in canonical order, so that the earliest
/// occurrence of a reused sample id is the one kept.
pub fn validate(
    records: Vec<MatchedRecord>,
) -> (Vec<MatchedRecord>, BTreeMap<ValidationReason, usize>) {
    let mut seen = HashMap::with_capacity(records.len());
    let mut failures: BTreeMap<ValidationReason, usize> = BTreeMap::new();
    let mut valid = Vec::with_capacity(records.len());

    for record in records {
        match check_record(&record, &mut seen) {
            Ok(()) => valid.push(record),
            Err(e) => {
                debug!("Dropping record: {}", e);
                *failures.entry(e.reason()).or_default() += 1;
            }
        }
    }
    (valid, failures)
}

/// Runs deduplication and validation, then applies the consolidation quality gate.
pub fn consolidate(
    records: Vec<MatchedRecord>,
    max_rejected_fraction: f64,
) -> Result<Consolidated, QualityThresholdExceeded> {
    let (unique, duplicates_removed) = deduplicate(records);
    let checked = unique.len();
    let (valid, validation_failures) = validate(unique);

    let rejected: usize = validation_failures.values().sum();
    check_threshold(
        QualityStage::Consolidation,
        rejected,
        checked,
        max_rejected_fraction,
    )?;

    info!(
        "Consolidated {} records ({} duplicates, {} invalid)",
        valid.len(),
        duplicates_removed,
        rejected
    );
    Ok(Consolidated {
        records: valid,
        duplicates_removed,
        validation_failures,
    })
}
