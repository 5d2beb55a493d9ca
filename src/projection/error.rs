use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Coordinate ({x}, {y}) is not a finite number")]
    NonFinite { x: f64, y: f64 },

    #[error("Projected coordinate ({x:.0}, {y:.0}) lies outside the Lambert II étendu envelope")]
    OutsideEnvelope { x: f64, y: f64 },

    #[error("Position ({latitude:.5}, {longitude:.5}) lies outside metropolitan France")]
    OutsideTerritory { latitude: f64, longitude: f64 },
}
