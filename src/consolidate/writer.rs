//! Renders consolidated records to the `;`-separated output table and writes it atomically.

use crate::consolidate::error::OutputError;
use crate::types::matched::MatchedRecord;
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Output columns, in order.
pub const OUTPUT_COLUMNS: [&str; 16] = [
    "sample_id",
    "sampled_at",
    "sampling_date",
    "radionuclide",
    "result",
    "unit",
    "environment",
    "municipality",
    "population",
    "latitude",
    "longitude",
    "rainfall_mm",
    "snowfall_mm",
    "distance_m",
    "location_unresolved",
    "weather_unmatched",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn cells(record: &MatchedRecord) -> [Option<String>; 16] {
    let m = &record.measurement;
    let weather = record.weather.as_ref();
    [
        Some(m.sample_id.clone()),
        Some(m.sampled_at.format(TIMESTAMP_FORMAT).to_string()),
        Some(m.sampling_date().format(DATE_FORMAT).to_string()),
        Some(m.radionuclide.clone()),
        Some(m.result.to_string()),
        Some(m.unit.to_string()),
        Some(m.environment.to_string()),
        Some(record.municipality_name().to_string()).filter(|name| !name.is_empty()),
        record.population.map(|p| p.to_string()),
        record.location.map(|l| format!("{:.6}", l.latitude())),
        record.location.map(|l| format!("{:.6}", l.longitude())),
        weather.map(|w| w.precipitation_mm.to_string()),
        weather.map(|w| w.snowfall_mm.to_string()),
        weather.map(|w| format!("{:.1}", w.distance_m)),
        Some(record.location_unresolved().to_string()),
        Some(record.weather_unmatched().to_string()),
    ]
}

/// Builds the output table. Every column is a string column; missing values are null.
pub fn render(records: &[MatchedRecord]) -> PolarsResult<DataFrame> {
    let mut values: Vec<Vec<Option<String>>> = (0..OUTPUT_COLUMNS.len())
        .map(|_| Vec::with_capacity(records.len()))
        .collect();
    for record in records {
        for (column, cell) in values.iter_mut().zip(cells(record)) {
            column.push(cell);
        }
    }

    let columns = OUTPUT_COLUMNS
        .iter()
        .zip(values)
        .map(|(name, column)| Column::new((*name).into(), column))
        .collect();
    DataFrame::new(columns)
}

fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Writes `records` to `path` through a temporary file in the same directory.
///
/// Readers never observe a partial table: the file at `path` is either the
/// previous version or the complete new one.
pub fn write_atomic(records: &[MatchedRecord], path: &Path) -> Result<(), OutputError> {
    let dir = output_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| OutputError::CreateDir(dir.clone(), e))?;

    let mut df = render(records).map_err(OutputError::Encode)?;
    let mut file = NamedTempFile::new_in(&dir).map_err(|e| OutputError::TempFile(dir.clone(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b';')
        .finish(&mut df)
        .map_err(OutputError::Encode)?;
    file.persist(path)
        .map_err(|e| OutputError::Persist(path.to_path_buf(), e.error))?;

    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

/// Deletes a table left at `path` by an earlier run. A missing file is fine.
pub fn remove_stale(path: &Path) -> Result<(), OutputError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            warn!("Removed stale output table {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(OutputError::RemoveStale(path.to_path_buf(), e)),
    }
}
