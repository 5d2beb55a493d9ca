//! Weather grid observations and their spatial-index representation.

use crate::types::location::LatLon;
use chrono::NaiveDate;
use rstar::{PointDistance, RTreeObject, AABB};

/// A planar point in NTF Lambert II étendu, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

/// One day of precipitation at one SIM2 grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Grid cell identifier built from the raw Lambert tokens (e.g. "6000-24280").
    pub station_id: String,
    pub date: NaiveDate,
    pub projected: ProjectedPoint,
    /// WGS84 position obtained by projecting `projected`.
    pub position: LatLon,
    /// Liquid precipitation total in millimetres.
    pub precipitation_mm: f64,
    /// Solid precipitation total in millimetres.
    pub snowfall_mm: f64,
}

/// A weather observation placed on the unit sphere for nearest-neighbour search.
///
/// `slot` indexes the owning [`crate::spatial::StationIndex`]'s observation list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StationPoint {
    pub slot: usize,
    pub xyz: [f64; 3],
}

/// Stations are points, so the envelope is a degenerate box around the unit vector.
impl RTreeObject for StationPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xyz)
    }
}

/// Squared chord length between two unit vectors.
///
/// Unlike a lat/lon Euclidean distance this is monotone in the great-circle
/// distance, which keeps R-tree nearest-neighbour queries exact.
impl PointDistance for StationPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.xyz[0] - point[0];
        let dy = self.xyz[1] - point[1];
        let dz = self.xyz[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}
