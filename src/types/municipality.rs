use crate::names::normalize_name;
use crate::types::location::LatLon;

/// An entry of the municipality gazetteer.
#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityRecord {
    /// Name as published in the reference table (e.g. "Saint-Étienne").
    pub name: String,
    /// Join key derived from `name` with [`normalize_name`].
    pub key: String,
    pub population: u64,
    /// Town hall position, or the municipality centroid when the former is missing.
    pub position: LatLon,
}

impl MunicipalityRecord {
    pub fn new(name: impl Into<String>, population: u64, position: LatLon) -> Self {
        let name = name.into();
        let key = normalize_name(&name);
        Self {
            name,
            key,
            population,
            position,
        }
    }
}
