//! French municipalities reference table.

use crate::normalize::error::{RejectReason, SchemaError, SourceError};
use crate::normalize::reader::{parse_number, read_raw_frame, RawTable};
use crate::normalize::Normalized;
use crate::types::location::LatLon;
use crate::types::municipality::MunicipalityRecord;
use crate::types::source::gazetteer_columns as cols;
use crate::types::source::SourceKind;
use log::{debug, info};
use std::path::Path;

pub fn normalize_gazetteer_file(
    path: &Path,
) -> Result<Normalized<MunicipalityRecord>, SourceError> {
    let df = read_raw_frame(SourceKind::Gazetteer, path)?;
    let table = RawTable::bind(&df, SourceKind::Gazetteer, path)?;

    let mut out = Normalized::with_capacity(table.height());
    for row in 0..table.height() {
        match parse_row(&table, row) {
            Ok(record) => {
                out.tally.accept();
                out.records.push(record);
            }
            Err(e) => {
                debug!("gazetteer row {}: {}", row + 1, e);
                out.tally.reject(RejectReason::MalformedSchema);
            }
        }
    }

    info!(
        "Normalized {} municipalities from {:?} ({} dropped)",
        out.records.len(),
        path,
        out.tally.rejected_total()
    );
    Ok(out)
}

fn parse_row(table: &RawTable<'_>, row: usize) -> Result<MunicipalityRecord, SchemaError> {
    let name = table.required(cols::NAME, row)?;

    let population = match table.field(cols::POPULATION, row) {
        None => 0,
        Some(raw) => {
            let value = parse_number(cols::POPULATION, raw)?;
            if value < 0.0 {
                return Err(SchemaError::InvalidNumber {
                    column: cols::POPULATION,
                    value: raw.to_string(),
                });
            }
            value.round() as u64
        }
    };

    let position = coordinate_pair(table, row, cols::TOWN_HALL_LATITUDE, cols::TOWN_HALL_LONGITUDE)
        .or_else(|| coordinate_pair(table, row, cols::CENTRE_LATITUDE, cols::CENTRE_LONGITUDE))
        .ok_or(SchemaError::MissingCoordinates)?;

    Ok(MunicipalityRecord::new(name, population, position))
}

fn coordinate_pair(
    table: &RawTable<'_>,
    row: usize,
    latitude: &'static str,
    longitude: &'static str,
) -> Option<LatLon> {
    let lat = table.lenient_number(latitude, row)?;
    let lon = table.lenient_number(longitude, row)?;
    LatLon::checked(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn falls_back_to_centre_and_defaults_population() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("communes.csv");
        fs::write(
            &path,
            "code_insee,nom_standard,population,latitude_mairie,longitude_mairie,latitude_centre,longitude_centre\n\
             42218,Saint-Étienne,170049,45.4397,4.3872,45.4301,4.3792\n\
             75056,Paris,,,,48.8589,2.347\n\
             99999,Nowhere,12,,,,\n\
             ,,5,45.0,4.0,,\n",
        )
        .unwrap();

        let normalized = normalize_gazetteer_file(&path).unwrap();
        assert_eq!(normalized.tally.accepted, 2);
        assert_eq!(normalized.tally.rejected_total(), 2);

        let st_etienne = &normalized.records[0];
        assert_eq!(st_etienne.name, "Saint-Étienne");
        assert_eq!(st_etienne.key, "saint etienne");
        assert_eq!(st_etienne.population, 170_049);
        assert_eq!(st_etienne.position, LatLon(45.4397, 4.3872));

        let paris = &normalized.records[1];
        assert_eq!(paris.population, 0);
        assert_eq!(paris.position, LatLon(48.8589, 2.347));
    }
}
