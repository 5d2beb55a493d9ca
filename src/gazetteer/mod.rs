//! Municipality lookup by normalized name, and the location enrichment built on it.

pub mod error;

use crate::gazetteer::error::UnresolvedLocationError;
use crate::names::normalize_name;
use crate::types::matched::{LocationSource, MatchedRecord};
use crate::types::municipality::MunicipalityRecord;
use crate::types::radiation::RadiationMeasurement;
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Read-only map from normalized municipality name to its gazetteer entry.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    by_key: HashMap<String, MunicipalityRecord>,
}

/// Decides which of two records sharing a key stays in the gazetteer.
///
/// The more populous municipality wins; equal populations fall back to the
/// lexicographically smaller name so the outcome never depends on input order.
fn preferred(candidate: &MunicipalityRecord, current: &MunicipalityRecord) -> bool {
    match candidate.population.cmp(&current.population) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.name < current.name,
    }
}

impl Gazetteer {
    /// Builds the lookup table and returns it with the number of key collisions.
    pub fn build(records: impl IntoIterator<Item = MunicipalityRecord>) -> (Self, usize) {
        let mut by_key: HashMap<String, MunicipalityRecord> = HashMap::new();
        let mut collisions = 0;

        for record in records {
            if record.key.is_empty() {
                continue;
            }
            match by_key.entry(record.key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    collisions += 1;
                    let kept = slot.get();
                    debug!(
                        "Gazetteer key '{}' shared by '{}' ({}) and '{}' ({})",
                        record.key, kept.name, kept.population, record.name, record.population
                    );
                    if preferred(&record, kept) {
                        slot.insert(record);
                    }
                }
            }
        }

        if collisions > 0 {
            warn!(
                "{} gazetteer names collapsed onto an existing key; kept the most populous",
                collisions
            );
        }
        (Self { by_key }, collisions)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Looks a municipality up by name, exactly after normalization.
    ///
    /// # Examples
    ///
    /// ```
    /// use radiolink::{Gazetteer, LatLon, MunicipalityRecord};
    ///
    /// let (gazetteer, _) = Gazetteer::build([MunicipalityRecord::new(
    ///     "Saint-Étienne",
    ///     170_049,
    ///     LatLon(45.4397, 4.3872),
    /// )]);
    /// let found = gazetteer.resolve("ST ETIENNE");
    /// assert!(found.is_err());
    /// let found = gazetteer.resolve("saint etienne").unwrap();
    /// assert_eq!(found.name, "Saint-Étienne");
    /// ```
    pub fn resolve(&self, name: &str) -> Result<&MunicipalityRecord, UnresolvedLocationError> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(UnresolvedLocationError::EmptyName);
        }
        self.by_key
            .get(&key)
            .ok_or_else(|| UnresolvedLocationError::NotFound {
                name: name.trim().to_string(),
                key,
            })
    }

    /// Attaches location and population to a measurement.
    ///
    /// Coordinates carried by the measurement win; the gazetteer only fills them
    /// in when they are missing. Population comes from the gazetteer whenever the
    /// name resolves.
    pub fn enrich(&self, measurement: RadiationMeasurement) -> MatchedRecord {
        let mut record = MatchedRecord::unlinked(measurement);
        let resolved = self.resolve(&record.measurement.municipality);

        if let Some(own) = record.measurement.location {
            record.location = Some(own);
            record.location_source = Some(LocationSource::Measured);
        }

        match resolved {
            Ok(municipality) => {
                record.municipality = Some(municipality.name.clone());
                record.population = Some(municipality.population);
                if record.location.is_none() {
                    record.location = Some(municipality.position);
                    record.location_source = Some(LocationSource::Gazetteer);
                }
            }
            Err(e) if record.location.is_none() => {
                debug!(
                    "Sample '{}' has no location: {}",
                    record.measurement.sample_id, e
                );
            }
            Err(_) => {}
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::location::LatLon;
    use crate::types::radiation::{Environment, Unit};
    use chrono::NaiveDate;

    fn measurement(municipality: &str, location: Option<LatLon>) -> RadiationMeasurement {
        RadiationMeasurement {
            sample_id: "S1".to_string(),
            sampled_at: NaiveDate::from_ymd_opt(2021, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            radionuclide: "Cs137".to_string(),
            result: 4.2,
            unit: Unit::BqPerKgDry,
            environment: Environment::Soil,
            municipality: municipality.to_string(),
            location,
            source_file: "asnr_soil_radiation_data.csv".to_string(),
        }
    }

    fn gazetteer() -> Gazetteer {
        Gazetteer::build([
            MunicipalityRecord::new("Saint-Étienne", 170_049, LatLon(45.4397, 4.3872)),
            MunicipalityRecord::new("Lyon", 522_250, LatLon(45.767, 4.8357)),
        ])
        .0
    }

    #[test]
    fn saint_etienne_resolves_from_any_spelling() {
        let g = gazetteer();
        for spelling in ["SAINT-ETIENNE", "Saint Étienne", " saint-étienne "] {
            let record = g.enrich(measurement(spelling, None));
            assert_eq!(record.municipality.as_deref(), Some("Saint-Étienne"));
            assert_eq!(record.population, Some(170_049));
            assert_eq!(record.location, Some(LatLon(45.4397, 4.3872)));
            assert_eq!(record.location_source, Some(LocationSource::Gazetteer));
            assert!(!record.location_unresolved());
        }
    }

    #[test]
    fn measured_coordinates_win_over_gazetteer() {
        let own = LatLon(45.5, 4.4);
        let record = gazetteer().enrich(measurement("Saint-Étienne", Some(own)));
        assert_eq!(record.location, Some(own));
        assert_eq!(record.location_source, Some(LocationSource::Measured));
        assert_eq!(record.population, Some(170_049));
    }

    #[test]
    fn unknown_name_is_flagged_not_dropped() {
        let g = gazetteer();
        assert!(matches!(
            g.resolve("Atlantis"),
            Err(UnresolvedLocationError::NotFound { .. })
        ));
        assert_eq!(g.resolve("  "), Err(UnresolvedLocationError::EmptyName));

        let record = g.enrich(measurement("Atlantis", None));
        assert!(record.location_unresolved());
        assert_eq!(record.municipality_name(), "Atlantis");
        assert_eq!(record.population, None);

        // A sample with its own coordinates is still located.
        let located = g.enrich(measurement("Atlantis", Some(LatLon(45.0, 4.0))));
        assert!(!located.location_unresolved());
    }

    #[test]
    fn collisions_keep_most_populous_regardless_of_order() {
        let small = MunicipalityRecord::new("Saint-Denis", 1_000, LatLon(46.0, 1.0));
        let large = MunicipalityRecord::new("Saint Denis", 110_000, LatLon(48.93, 2.35));

        let (forward, collisions) = Gazetteer::build([small.clone(), large.clone()]);
        let (backward, _) = Gazetteer::build([large.clone(), small]);
        assert_eq!(collisions, 1);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward.resolve("saint denis").unwrap(), &large);
        assert_eq!(backward.resolve("saint denis").unwrap(), &large);
    }

    #[test]
    fn population_tie_keeps_smaller_name() {
        let a = MunicipalityRecord::new("Sainte-Marie", 500, LatLon(46.0, 1.0));
        let b = MunicipalityRecord::new("Sainte Marie", 500, LatLon(47.0, 2.0));
        let (g, _) = Gazetteer::build([a, b.clone()]);
        assert_eq!(g.resolve("Sainte-Marie").unwrap(), &b);
    }
}
