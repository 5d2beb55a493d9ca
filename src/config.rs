//! Pipeline settings, built in code or read from a TOML file.

use bon::Builder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/processed/radiation_weather.csv")
}

fn default_radiation_file_prefix() -> String {
    "asnr_".to_string()
}

fn default_weather_file_name() -> String {
    "weather.csv".to_string()
}

fn default_gazetteer_file_name() -> String {
    "communes.csv".to_string()
}

fn default_weather_coordinate_scale() -> f64 {
    100.0
}

fn default_max_match_distance_km() -> f64 {
    50.0
}

fn default_max_rejected_fraction() -> f64 {
    0.5
}

/// Settings for one pipeline run.
///
/// Every field has a default, so a TOML file only needs the keys it overrides.
///
/// # Examples
///
/// ```
/// use radiolink::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .raw_dir("fixtures/raw")
///     .max_match_distance_km(25.0)
///     .build();
/// assert_eq!(config.radiation_file_prefix, "asnr_");
/// assert_eq!(config.max_match_distance_km, 25.0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding the three raw sources.
    #[builder(into, default = default_raw_dir())]
    pub raw_dir: PathBuf,

    /// Where the consolidated table is written.
    #[builder(into, default = default_output_path())]
    pub output_path: PathBuf,

    #[builder(into, default = default_radiation_file_prefix())]
    pub radiation_file_prefix: String,

    #[builder(into, default = default_weather_file_name())]
    pub weather_file_name: String,

    #[builder(into, default = default_gazetteer_file_name())]
    pub gazetteer_file_name: String,

    /// Multiplier from raw SIM2 grid units to metres.
    #[builder(default = default_weather_coordinate_scale())]
    pub weather_coordinate_scale: f64,

    /// Samples farther than this from every same-day station stay unmatched.
    #[builder(default = default_max_match_distance_km())]
    pub max_match_distance_km: f64,

    /// Largest tolerated share of rejected rows per source and at consolidation.
    #[builder(default = default_max_rejected_fraction())]
    pub max_rejected_fraction: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PipelineConfig {
    /// Reads settings from a TOML file; missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: PipelineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn weather_path(&self) -> PathBuf {
        self.raw_dir.join(&self.weather_file_name)
    }

    pub fn gazetteer_path(&self) -> PathBuf {
        self.raw_dir.join(&self.gazetteer_file_name)
    }

    /// Rejects settings no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if !(self.weather_coordinate_scale.is_finite() && self.weather_coordinate_scale > 0.0) {
            return invalid("weather_coordinate_scale", "must be a positive number");
        }
        if !(self.max_match_distance_km.is_finite() && self.max_match_distance_km >= 0.0) {
            return invalid("max_match_distance_km", "must be a non-negative number");
        }
        if !(0.0..=1.0).contains(&self.max_rejected_fraction) {
            return invalid("max_rejected_fraction", "must lie between 0 and 1");
        }
        if self.radiation_file_prefix.is_empty() {
            return invalid("radiation_file_prefix", "must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("radiolink.toml");
        fs::write(
            &path,
            "raw_dir = \"/srv/raw\"\nmax_match_distance_km = 20.0\n",
        )
        .unwrap();

        let config = PipelineConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.raw_dir, PathBuf::from("/srv/raw"));
        assert_eq!(config.max_match_distance_km, 20.0);
        assert_eq!(config.weather_coordinate_scale, 100.0);
        assert_eq!(config.max_rejected_fraction, 0.5);
        assert_eq!(config.weather_path(), PathBuf::from("/srv/raw/weather.csv"));
    }

    #[test]
    fn builder_and_default_agree() {
        assert_eq!(PipelineConfig::default(), PipelineConfig::builder().build());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let dir = TempDir::new().unwrap();
        let typo = dir.path().join("typo.toml");
        fs::write(&typo, "max_distance = 3\n").unwrap();
        assert!(matches!(
            PipelineConfig::from_toml_file(&typo),
            Err(ConfigError::Parse(..))
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "max_rejected_fraction = 1.5\n").unwrap();
        assert!(matches!(
            PipelineConfig::from_toml_file(&bad),
            Err(ConfigError::Invalid {
                field: "max_rejected_fraction",
                ..
            })
        ));

        assert!(matches!(
            PipelineConfig::from_toml_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read(..))
        ));
    }
}
