//! Attaches same-day weather to each located measurement.

use crate::spatial::WeatherIndex;
use crate::types::matched::{MatchedRecord, WeatherMatch};
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Why a record kept no weather data. The record itself is retained.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnmatchedWeatherError {
    #[error("No weather observations on {date} for sample '{sample_id}'")]
    NoObservations { sample_id: String, date: NaiveDate },

    #[error("Nearest station for sample '{sample_id}' is {distance_m:.1} m away, beyond {limit_m:.1} m")]
    TooFar {
        sample_id: String,
        distance_m: f64,
        limit_m: f64,
    },
}

impl UnmatchedWeatherError {
    pub fn reason(&self) -> UnmatchedReason {
        match self {
            UnmatchedWeatherError::NoObservations { .. } => UnmatchedReason::NoObservations,
            UnmatchedWeatherError::TooFar { .. } => UnmatchedReason::TooFar,
        }
    }
}

/// Aggregation key for unmatched records in the quality report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnmatchedReason {
    /// The record has no coordinates, so matching was not attempted.
    LocationUnresolved,
    NoObservations,
    TooFar,
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::LocationUnresolved => write!(f, "location_unresolved"),
            UnmatchedReason::NoObservations => write!(f, "no_observations"),
            UnmatchedReason::TooFar => write!(f, "too_far"),
        }
    }
}

/// Nearest-station matcher with a distance cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    max_distance_m: f64,
}

impl Matcher {
    pub fn new(max_distance_km: f64) -> Self {
        Self {
            max_distance_m: max_distance_km * 1000.0,
        }
    }

    pub fn max_distance_m(&self) -> f64 {
        self.max_distance_m
    }

    /// Matches one record against the index for its sampling date.
    ///
    /// Records without a location are returned untouched as
    /// [`UnmatchedReason::LocationUnresolved`].
    pub fn match_one(
        &self,
        index: &WeatherIndex,
        mut record: MatchedRecord,
    ) -> (MatchedRecord, Option<UnmatchedReason>) {
        let Some(at) = record.location else {
            return (record, Some(UnmatchedReason::LocationUnresolved));
        };
        let date = record.measurement.sampling_date();

        let outcome = match index.nearest(date, at) {
            None => Err(UnmatchedWeatherError::NoObservations {
                sample_id: record.measurement.sample_id.clone(),
                date,
            }),
            Some(found) if found.distance_m > self.max_distance_m => {
                Err(UnmatchedWeatherError::TooFar {
                    sample_id: record.measurement.sample_id.clone(),
                    distance_m: found.distance_m,
                    limit_m: self.max_distance_m,
                })
            }
            Some(found) => Ok(WeatherMatch {
                station_id: found.observation.station_id.clone(),
                precipitation_mm: found.observation.precipitation_mm,
                snowfall_mm: found.observation.snowfall_mm,
                distance_m: found.distance_m,
            }),
        };

        match outcome {
            Ok(weather) => {
                record.weather = Some(weather);
                (record, None)
            }
            Err(e) => {
                debug!("{}", e);
                record.weather = None;
                (record, Some(e.reason()))
            }
        }
    }

    /// Matches every record in parallel, keeping input order.
    pub fn match_all(
        &self,
        index: &WeatherIndex,
        records: Vec<MatchedRecord>,
    ) -> Vec<(MatchedRecord, Option<UnmatchedReason>)> {
        let dates: BTreeSet<NaiveDate> = records
            .iter()
            .filter(|r| r.location.is_some())
            .map(|r| r.measurement.sampling_date())
            .collect();
        index.prepare(&dates);

        records
            .into_par_iter()
            .map(|record| self.match_one(index, record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::location::LatLon;
    use crate::types::radiation::{Environment, RadiationMeasurement, Unit};
    use crate::types::weather::{ProjectedPoint, WeatherObservation};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, day).unwrap()
    }

    fn record(id: &str, day: u32, location: Option<LatLon>) -> MatchedRecord {
        let measurement = RadiationMeasurement {
            sample_id: id.to_string(),
            sampled_at: date(day).and_hms_opt(8, 0, 0).unwrap(),
            radionuclide: "Cs137".to_string(),
            result: 1.0,
            unit: Unit::Bq,
            environment: Environment::Water,
            municipality: "Paris".to_string(),
            location,
            source_file: "asnr_water_radiation_data.csv".to_string(),
        };
        let mut record = MatchedRecord::unlinked(measurement);
        record.location = location;
        record
    }

    fn station(id: &str, day: u32, position: LatLon, rain: f64) -> WeatherObservation {
        WeatherObservation {
            station_id: id.to_string(),
            date: date(day),
            projected: ProjectedPoint { x: 0.0, y: 0.0 },
            position,
            precipitation_mm: rain,
            snowfall_mm: 0.0,
        }
    }

    #[test]
    fn paris_sample_without_nearby_station_is_kept_and_flagged() {
        // Only Marseille reports on 2021-03-01.
        let index = WeatherIndex::new([station("marseille", 1, LatLon(43.3, 5.4), 2.0)]);
        let matcher = Matcher::new(50.0);

        let (matched, reason) = matcher.match_one(&index, record("P1", 1, Some(LatLon(48.85, 2.35))));
        assert_eq!(reason, Some(UnmatchedReason::TooFar));
        assert!(matched.weather_unmatched());
        assert!(!matched.location_unresolved());
        assert_eq!(matched.measurement.sample_id, "P1");
    }

    #[test]
    fn day_without_observations() {
        let index = WeatherIndex::new([station("paris", 2, LatLon(48.85, 2.35), 2.0)]);
        let (matched, reason) =
            Matcher::new(50.0).match_one(&index, record("P1", 1, Some(LatLon(48.85, 2.35))));
        assert_eq!(reason, Some(UnmatchedReason::NoObservations));
        assert!(matched.weather.is_none());
    }

    #[test]
    fn unresolved_location_is_not_matched() {
        let index = WeatherIndex::new([station("paris", 1, LatLon(48.85, 2.35), 2.0)]);
        let (matched, reason) = Matcher::new(50.0).match_one(&index, record("X", 1, None));
        assert_eq!(reason, Some(UnmatchedReason::LocationUnresolved));
        assert!(matched.weather_unmatched());
    }

    #[test]
    fn match_all_keeps_order_and_picks_nearest() {
        let index = WeatherIndex::new([
            station("paris", 1, LatLon(48.85, 2.35), 2.0),
            station("orly", 1, LatLon(48.72, 2.38), 5.0),
            station("lyon", 1, LatLon(45.76, 4.84), 0.5),
        ]);
        let records = vec![
            record("A", 1, Some(LatLon(48.73, 2.37))),
            record("B", 1, Some(LatLon(45.7, 4.8))),
            record("C", 1, Some(LatLon(48.86, 2.34))),
        ];
        let matched = Matcher::new(50.0).match_all(&index, records);

        let ids: Vec<_> = matched
            .iter()
            .map(|(r, _)| r.measurement.sample_id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        let stations: Vec<_> = matched
            .iter()
            .map(|(r, _)| r.weather.as_ref().unwrap().station_id.as_str())
            .collect();
        assert_eq!(stations, vec!["orly", "lyon", "paris"]);
        assert!(matched.iter().all(|(r, reason)| reason.is_none() && r.is_valid()));
        assert_eq!(matched[0].0.weather.as_ref().unwrap().precipitation_mm, 5.0);
    }
}
