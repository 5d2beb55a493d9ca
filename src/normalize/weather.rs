//! SIM2 daily weather grid.

use crate::normalize::error::{RejectReason, SchemaError, SourceError};
use crate::normalize::reader::{read_raw_frame, RawTable};
use crate::normalize::Normalized;
use crate::projection::error::ProjectionError;
use crate::projection::project;
use crate::types::source::weather_columns as cols;
use crate::types::source::SourceKind;
use crate::types::weather::{ProjectedPoint, WeatherObservation};
use chrono::NaiveDate;
use log::{debug, info};
use std::path::Path;

const DATE_FORMAT: &str = "%Y%m%d";

/// Why a weather row was dropped.
enum RowError {
    Schema(SchemaError),
    Projection(ProjectionError),
}

impl From<SchemaError> for RowError {
    fn from(e: SchemaError) -> Self {
        RowError::Schema(e)
    }
}

/// Normalizes the SIM2 grid file.
///
/// `coordinate_scale` converts the raw `LAMBX`/`LAMBY` values to metres (SIM2
/// publishes hectometres, so the default is 100).
pub fn normalize_weather_file(
    path: &Path,
    coordinate_scale: f64,
) -> Result<Normalized<WeatherObservation>, SourceError> {
    let df = read_raw_frame(SourceKind::Weather, path)?;
    let table = RawTable::bind(&df, SourceKind::Weather, path)?;

    let mut out = Normalized::with_capacity(table.height());
    for row in 0..table.height() {
        match parse_row(&table, row, coordinate_scale) {
            Ok(observation) => {
                out.tally.accept();
                out.records.push(observation);
            }
            Err(RowError::Schema(e)) => {
                debug!("weather row {}: {}", row + 1, e);
                out.tally.reject(RejectReason::MalformedSchema);
            }
            Err(RowError::Projection(e)) => {
                debug!("weather row {}: {}", row + 1, e);
                out.tally.reject(RejectReason::ProjectionFailure);
            }
        }
    }

    info!(
        "Normalized {} weather observations from {:?} ({} dropped)",
        out.records.len(),
        path,
        out.tally.rejected_total()
    );
    Ok(out)
}

fn parse_row(
    table: &RawTable<'_>,
    row: usize,
    coordinate_scale: f64,
) -> Result<WeatherObservation, RowError> {
    let raw_x = table.required(cols::X, row)?;
    let raw_y = table.required(cols::Y, row)?;
    let projected = ProjectedPoint {
        x: table.required_number(cols::X, row)? * coordinate_scale,
        y: table.required_number(cols::Y, row)? * coordinate_scale,
    };

    let raw_date = table.required(cols::DATE, row)?;
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .map_err(|_| SchemaError::InvalidDate(raw_date.to_string()))?;

    let precipitation_mm = table.required_number(cols::RAIN, row)?;
    let snowfall_mm = table.required_number(cols::SNOW, row)?;

    let position = project(projected).map_err(RowError::Projection)?;

    Ok(WeatherObservation {
        station_id: format!("{raw_x}-{raw_y}"),
        date,
        projected,
        position,
        precipitation_mm,
        snowfall_mm,
    })
}
