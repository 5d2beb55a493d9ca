//! Schema normalization: raw CSV files → typed records plus rejection tallies.

pub mod error;
pub mod gazetteer;
pub mod radiation;
pub(crate) mod reader;
pub mod weather;

use crate::quality::SourceTally;

/// The typed rows of one source and the tally of rows that did not make it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub tally: SourceTally,
}

impl<T> Normalized<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            tally: SourceTally::default(),
        }
    }

    /// Concatenates several partial results, e.g. one per radiation file.
    pub fn concat(parts: impl IntoIterator<Item = Normalized<T>>) -> Self {
        let mut merged = Normalized {
            records: Vec::new(),
            tally: SourceTally::default(),
        };
        for part in parts {
            merged.records.extend(part.records);
            merged.tally.merge(&part.tally);
        }
        merged
    }
}
