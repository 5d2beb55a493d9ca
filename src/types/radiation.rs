//! Radioactivity measurements and the closed enumerations they carry.

use crate::types::location::LatLon;
use chrono::NaiveDateTime;
use std::fmt;

/// Measurement unit. The set is closed: anything else is a schema error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Becquerel.
    Bq,
    /// Becquerel per kilogram of dry matter.
    BqPerKgDry,
    /// Becquerel per litre.
    BqPerLitre,
    /// Millimetres (precipitation).
    Millimetre,
}

impl Unit {
    /// Parses the spellings found in the raw exports, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use radiolink::Unit;
    ///
    /// assert_eq!(Unit::parse("Bq/kg sec"), Some(Unit::BqPerKgDry));
    /// assert_eq!(Unit::parse(" bq/l "), Some(Unit::BqPerLitre));
    /// assert_eq!(Unit::parse("Sv"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Unit> {
        let compact = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match compact.as_str() {
            "bq" => Some(Unit::Bq),
            "bq/kg dry" | "bq/kg sec" | "bq/kg" | "bq/kg ms" => Some(Unit::BqPerKgDry),
            "bq/l" => Some(Unit::BqPerLitre),
            "mm" => Some(Unit::Millimetre),
            _ => None,
        }
    }

    /// Whether this unit can express a radioactivity result.
    pub fn is_radioactivity(&self) -> bool {
        !matches!(self, Unit::Millimetre)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Bq => "Bq",
            Unit::BqPerKgDry => "Bq/kg dry",
            Unit::BqPerLitre => "Bq/L",
            Unit::Millimetre => "mm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection medium of a radioactivity sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Soil,
    Water,
}

impl Environment {
    /// Parses the medium token used in export file names (`asnr_<medium>_...`).
    pub fn parse(raw: &str) -> Option<Environment> {
        match raw.trim().to_lowercase().as_str() {
            "soil" | "sol" => Some(Environment::Soil),
            "water" | "eau" => Some(Environment::Water),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Soil => "soil",
            Environment::Water => "water",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single radioactivity sample as read from an export file.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiationMeasurement {
    pub sample_id: String,
    pub sampled_at: NaiveDateTime,
    pub radionuclide: String,
    pub result: f64,
    pub unit: Unit,
    pub environment: Environment,
    /// Municipality name exactly as written in the export.
    pub municipality: String,
    /// Coordinates reported with the sample, if any.
    pub location: Option<LatLon>,
    /// File name the row was read from.
    pub source_file: String,
}

impl RadiationMeasurement {
    pub fn sampling_date(&self) -> chrono::NaiveDate {
        self.sampled_at.date()
    }
}
