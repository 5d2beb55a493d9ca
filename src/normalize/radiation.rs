//! ASNR radioactivity exports.

use crate::normalize::error::{RejectReason, SchemaError, SourceError};
use crate::normalize::reader::{read_raw_frame, RawTable};
use crate::normalize::Normalized;
use crate::types::location::LatLon;
use crate::types::radiation::{Environment, RadiationMeasurement, Unit};
use crate::types::source::radiation_columns as cols;
use crate::types::source::SourceKind;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Marker every radiation export carries after its medium token.
const RADIATION_FILE_MARKER: &str = "_radiation_data";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Lists the radiation exports in `dir`, sorted by file name.
///
/// A file qualifies when its name looks like `<prefix><medium>_radiation_data*.csv`.
pub fn discover_radiation_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, SourceError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| SourceError::ListDirectory(dir.to_path_buf(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| SourceError::ListDirectory(dir.to_path_buf(), e))?
            .path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file()
            && name.starts_with(prefix)
            && name.contains(RADIATION_FILE_MARKER)
            && name.ends_with(".csv")
        {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(SourceError::NoRadiationFiles {
            dir: dir.to_path_buf(),
            pattern: format!("{prefix}*{RADIATION_FILE_MARKER}*.csv"),
        });
    }
    Ok(files)
}

/// Extracts the collection medium token from an export file name.
///
/// `asnr_soil_radiation_data_2021.csv` with prefix `asnr_` yields `soil`.
fn medium_token<'a>(file_name: &'a str, prefix: &str) -> &'a str {
    let rest = file_name.strip_prefix(prefix).unwrap_or(file_name);
    rest.split('_').next().unwrap_or(rest)
}

/// Parses the sampling timestamp; a bare date means midnight.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Normalizes one radiation export file.
///
/// Malformed rows are dropped and tallied; only an unreadable file or a missing
/// column is an error.
pub fn normalize_radiation_file(
    path: &Path,
    prefix: &str,
) -> Result<Normalized<RadiationMeasurement>, SourceError> {
    let df = read_raw_frame(SourceKind::Radiation, path)?;
    let table = RawTable::bind(&df, SourceKind::Radiation, path)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let medium = medium_token(&file_name, prefix);
    let environment = Environment::parse(medium);

    let mut out = Normalized::with_capacity(table.height());
    for row in 0..table.height() {
        match parse_row(&table, row, environment, medium, &file_name) {
            Ok(measurement) => {
                out.tally.accept();
                out.records.push(measurement);
            }
            Err(e) => {
                debug!("{}: dropping row {}: {}", file_name, row + 1, e);
                out.tally.reject(RejectReason::MalformedSchema);
            }
        }
    }

    info!(
        "Normalized {} radiation rows from {} ({} dropped)",
        out.records.len(),
        file_name,
        out.tally.rejected_total()
    );
    Ok(out)
}

fn parse_row(
    table: &RawTable<'_>,
    row: usize,
    environment: Option<Environment>,
    medium: &str,
    file_name: &str,
) -> Result<RadiationMeasurement, SchemaError> {
    let environment =
        environment.ok_or_else(|| SchemaError::UnknownEnvironment(medium.to_string()))?;

    let sample_id = table.required(cols::SAMPLE_ID, row)?;
    let raw_timestamp = table.required(cols::SAMPLED_AT, row)?;
    let sampled_at = parse_timestamp(raw_timestamp)
        .ok_or_else(|| SchemaError::InvalidTimestamp(raw_timestamp.to_string()))?;
    let result = table.required_number(cols::RESULT, row)?;
    let raw_unit = table.required(cols::UNIT, row)?;
    let unit = Unit::parse(raw_unit).ok_or_else(|| SchemaError::UnknownUnit(raw_unit.to_string()))?;
    let radionuclide = table.required(cols::RADIONUCLIDE, row)?;

    let location = match (
        table.lenient_number(cols::LATITUDE, row),
        table.lenient_number(cols::LONGITUDE, row),
    ) {
        (Some(lat), Some(lon)) => LatLon::checked(lat, lon),
        _ => None,
    };

    Ok(RadiationMeasurement {
        sample_id: sample_id.to_string(),
        sampled_at,
        radionuclide: radionuclide.to_string(),
        result,
        unit,
        environment,
        municipality: table
            .field(cols::MUNICIPALITY, row)
            .unwrap_or_default()
            .to_string(),
        location,
        source_file: file_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Sample reference;Sampling start date;Radionuclide;Result radioactivity;Unit radioactivity;Municipality name;Latitude;Longitude";

    fn write(dir: &TempDir, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut body = String::from(HEADER);
        for row in rows {
            body.push('\n');
            body.push_str(row);
        }
        body.push('\n');
        fs::write(&path, body).expect("write fixture");
        path
    }

    #[test]
    fn timestamps_in_every_supported_shape() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2021-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-03-01T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("01/03/2021 10:30"), Some(expected));
        assert_eq!(
            parse_timestamp("01/03/2021"),
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("March 1st"), None);
    }

    #[test]
    fn medium_comes_from_file_name() {
        assert_eq!(medium_token("asnr_soil_radiation_data_2021.csv", "asnr_"), "soil");
        assert_eq!(medium_token("asnr_eau_radiation_data.csv", "asnr_"), "eau");
    }

    #[test]
    fn discovers_only_matching_files_in_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "asnr_water_radiation_data_2021.csv", &[]);
        write(&dir, "asnr_soil_radiation_data_2021.csv", &[]);
        write(&dir, "weather.csv", &[]);
        write(&dir, "asnr_soil_notes.csv", &[]);

        let files = discover_radiation_files(dir.path(), "asnr_").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "asnr_soil_radiation_data_2021.csv",
                "asnr_water_radiation_data_2021.csv"
            ]
        );
    }

    #[test]
    fn no_matching_files_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_radiation_files(dir.path(), "asnr_").unwrap_err();
        assert!(matches!(err, SourceError::NoRadiationFiles { .. }));
    }

    #[test]
    fn malformed_rows_are_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "asnr_soil_radiation_data_2021.csv",
            &[
                "S1;2021-03-01 10:00:00;Cs137;12,5;Bq/kg sec;Saint-Étienne;45.43;4.39",
                "S2;;Cs137;3.0;Bq/kg sec;Lyon;;",
                "S3;2021-03-02;Cs137;abc;Bq/kg sec;Lyon;;",
                "S4;2021-03-02;Cs137;1.0;Sv;Lyon;;",
                "S5;2021-03-02;K40;7;bq/kg;Lyon;north;4.8",
                "S6;2021-03-02",
            ],
        );

        let normalized = normalize_radiation_file(&path, "asnr_").unwrap();
        assert_eq!(normalized.tally.rows_read, 6);
        assert_eq!(normalized.tally.accepted, 2);
        assert_eq!(
            normalized.tally.rejected[&RejectReason::MalformedSchema],
            4
        );

        let first = &normalized.records[0];
        assert_eq!(first.sample_id, "S1");
        assert_eq!(first.result, 12.5);
        assert_eq!(first.unit, Unit::BqPerKgDry);
        assert_eq!(first.environment, Environment::Soil);
        assert_eq!(first.location, Some(LatLon(45.43, 4.39)));
        assert_eq!(first.source_file, "asnr_soil_radiation_data_2021.csv");

        // An unparseable latitude leaves the sample without coordinates.
        assert_eq!(normalized.records[1].sample_id, "S5");
        assert_eq!(normalized.records[1].location, None);
    }

    #[test]
    fn empty_radionuclide_rejects_the_row() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "asnr_water_radiation_data.csv",
            &[
                "S1;2021-03-01;;1.0;Bq/L;Lyon;;",
                "S2;2021-03-01;H3;1.0;Bq/L;Lyon;;",
            ],
        );
        let normalized = normalize_radiation_file(&path, "asnr_").unwrap();
        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.records[0].sample_id, "S2");
        assert_eq!(
            normalized.tally.rejected[&RejectReason::MalformedSchema],
            1
        );
    }

    #[test]
    fn unknown_medium_rejects_every_row() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "asnr_air_radiation_data.csv",
            &["S1;2021-03-01;Cs137;1.0;Bq;Lyon;;"],
        );
        let normalized = normalize_radiation_file(&path, "asnr_").unwrap();
        assert!(normalized.records.is_empty());
        assert_eq!(normalized.tally.rejected_total(), 1);
    }

    #[test]
    fn missing_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("asnr_soil_radiation_data.csv");
        fs::write(&path, "Sample reference;Radionuclide\nS1;Cs137\n").unwrap();
        let err = normalize_radiation_file(&path, "asnr_").unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn { .. }));
    }
}
