//! Defines the three raw sources the pipeline consumes and their fixed column layouts.

use std::fmt;

/// Identifies one of the raw input sources.
///
/// Each source has a fixed, documented layout: a field separator and a set of
/// header names that must be present in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    /// ASNR radioactivity measurements, one file per collection medium.
    Radiation,
    /// Météo-France SIM2 daily grid (rain and snow per grid cell).
    Weather,
    /// Reference table of French municipalities.
    Gazetteer,
}

pub(crate) mod radiation_columns {
    pub const SAMPLE_ID: &str = "Sample reference";
    pub const SAMPLED_AT: &str = "Sampling start date";
    pub const RADIONUCLIDE: &str = "Radionuclide";
    pub const RESULT: &str = "Result radioactivity";
    pub const UNIT: &str = "Unit radioactivity";
    pub const MUNICIPALITY: &str = "Municipality name";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
}

pub(crate) mod weather_columns {
    pub const X: &str = "LAMBX";
    pub const Y: &str = "LAMBY";
    pub const DATE: &str = "DATE";
    pub const RAIN: &str = "PRELIQ";
    pub const SNOW: &str = "PRENEI";
}

pub(crate) mod gazetteer_columns {
    pub const NAME: &str = "nom_standard";
    pub const POPULATION: &str = "population";
    pub const TOWN_HALL_LATITUDE: &str = "latitude_mairie";
    pub const TOWN_HALL_LONGITUDE: &str = "longitude_mairie";
    pub const CENTRE_LATITUDE: &str = "latitude_centre";
    pub const CENTRE_LONGITUDE: &str = "longitude_centre";
}

impl SourceKind {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            SourceKind::Radiation => "radiation",
            SourceKind::Weather => "weather",
            SourceKind::Gazetteer => "gazetteer",
        }
    }

    pub(crate) fn separator(&self) -> u8 {
        match self {
            SourceKind::Radiation | SourceKind::Weather => b';',
            SourceKind::Gazetteer => b',',
        }
    }

    pub(crate) fn required_columns(&self) -> Vec<&'static str> {
        match self {
            SourceKind::Radiation => vec![
                radiation_columns::SAMPLE_ID,
                radiation_columns::SAMPLED_AT,
                radiation_columns::RADIONUCLIDE,
                radiation_columns::RESULT,
                radiation_columns::UNIT,
                radiation_columns::MUNICIPALITY,
                radiation_columns::LATITUDE,
                radiation_columns::LONGITUDE,
            ],
            SourceKind::Weather => vec![
                weather_columns::X,
                weather_columns::Y,
                weather_columns::DATE,
                weather_columns::RAIN,
                weather_columns::SNOW,
            ],
            SourceKind::Gazetteer => vec![
                gazetteer_columns::NAME,
                gazetteer_columns::POPULATION,
                gazetteer_columns::TOWN_HALL_LATITUDE,
                gazetteer_columns::TOWN_HALL_LONGITUDE,
                gazetteer_columns::CENTRE_LATITUDE,
                gazetteer_columns::CENTRE_LONGITUDE,
            ],
        }
    }
}

/// Formats a `SourceKind` using its lowercase label.
///
/// # Examples
///
/// ```
/// use radiolink::SourceKind;
///
/// assert_eq!(SourceKind::Weather.to_string(), "weather");
/// ```
impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
