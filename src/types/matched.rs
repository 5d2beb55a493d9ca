//! The wide record produced by enrichment and matching.

use crate::types::location::LatLon;
use crate::types::radiation::RadiationMeasurement;

/// Where a record's resolved coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Coordinates shipped with the measurement itself.
    Measured,
    /// Coordinates looked up in the gazetteer by municipality name.
    Gazetteer,
}

/// The weather grid cell chosen for a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherMatch {
    pub station_id: String,
    pub precipitation_mm: f64,
    pub snowfall_mm: f64,
    /// Great-circle distance between sample and station, in metres. Never negative.
    pub distance_m: f64,
}

/// A measurement extended with its resolved location and nearest weather data.
///
/// Records are never dropped for failing to link: a missing location or weather
/// match only clears the corresponding fields, which the flags expose.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    pub measurement: RadiationMeasurement,
    pub location: Option<LatLon>,
    pub location_source: Option<LocationSource>,
    /// Canonical gazetteer name, when the municipality resolved.
    pub municipality: Option<String>,
    pub population: Option<u64>,
    pub weather: Option<WeatherMatch>,
}

impl MatchedRecord {
    /// A record with no enrichment applied yet.
    pub fn unlinked(measurement: RadiationMeasurement) -> Self {
        Self {
            measurement,
            location: None,
            location_source: None,
            municipality: None,
            population: None,
            weather: None,
        }
    }

    pub fn location_unresolved(&self) -> bool {
        self.location.is_none()
    }

    pub fn weather_unmatched(&self) -> bool {
        self.weather.is_none()
    }

    /// Fully linked: both a location and a weather match are present.
    pub fn is_valid(&self) -> bool {
        !self.location_unresolved() && !self.weather_unmatched()
    }

    /// Name to publish: the gazetteer's canonical spelling, else the raw one.
    pub fn municipality_name(&self) -> &str {
        self.municipality
            .as_deref()
            .unwrap_or_else(|| self.measurement.municipality.trim())
    }
}
