mod config;
mod consolidate;
mod error;
mod gazetteer;
mod matcher;
mod names;
mod normalize;
mod pipeline;
mod projection;
mod quality;
mod spatial;
mod types;

pub use config::{ConfigError, PipelineConfig};
pub use error::RadiolinkError;
pub use pipeline::Pipeline;

pub use consolidate::error::{OutputError, ValidationError, ValidationReason};
pub use consolidate::writer::{remove_stale, render, write_atomic, OUTPUT_COLUMNS};
pub use consolidate::{consolidate, deduplicate, validate, Consolidated};

pub use gazetteer::error::UnresolvedLocationError;
pub use gazetteer::Gazetteer;

pub use matcher::{Matcher, UnmatchedReason, UnmatchedWeatherError};
pub use names::normalize_name;

pub use normalize::error::{RejectReason, SchemaError, SourceError};
pub use normalize::gazetteer::normalize_gazetteer_file;
pub use normalize::radiation::{discover_radiation_files, normalize_radiation_file};
pub use normalize::weather::normalize_weather_file;
pub use normalize::Normalized;

pub use projection::error::ProjectionError;
pub use projection::lambert::LambertIIExtended;
pub use projection::{project, unproject};

pub use quality::{
    check_threshold, QualityReport, QualityStage, QualityThresholdExceeded, SourceTally,
};

pub use spatial::{DatePartition, Neighbour, StationIndex, WeatherIndex, TIE_TOLERANCE_M};

pub use types::location::LatLon;
pub use types::matched::{LocationSource, MatchedRecord, WeatherMatch};
pub use types::municipality::MunicipalityRecord;
pub use types::radiation::{Environment, RadiationMeasurement, Unit};
pub use types::source::SourceKind;
pub use types::weather::{ProjectedPoint, WeatherObservation};
