//! Geographic coordinates shared by every stage of the pipeline.

use haversine::{distance, Location as HaversineLocation, Units};

/// Represents a WGS84 coordinate using latitude and longitude in decimal degrees.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use radiolink::LatLon;
///
/// let paris = LatLon(48.8566, 2.3522);
/// assert_eq!(paris.0, 48.8566); // Latitude
/// assert_eq!(paris.1, 2.3522); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    /// Builds a coordinate only if both values are finite and inside the WGS84 range.
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(LatLon(latitude, longitude))
    }

    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }

    /// Great-circle distance in metres.
    pub fn haversine_m(&self, other: &LatLon) -> f64 {
        let km = distance(
            HaversineLocation {
                latitude: self.0,
                longitude: self.1,
            },
            HaversineLocation {
                latitude: other.0,
                longitude: other.1,
            },
            Units::Kilometers,
        );
        // -0.0 shows up for identical points.
        (km * 1000.0).max(0.0)
    }

    /// Position on the unit sphere.
    ///
    /// The chord between two such vectors grows monotonically with the
    /// great-circle angle, so Euclidean nearest neighbours in this space are
    /// haversine nearest neighbours.
    pub fn to_unit_vector(&self) -> [f64; 3] {
        let (lat, lon) = (self.0.to_radians(), self.1.to_radians());
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(LatLon::checked(91.0, 0.0).is_none());
        assert!(LatLon::checked(0.0, -180.5).is_none());
        assert!(LatLon::checked(f64::NAN, 0.0).is_none());
        assert_eq!(LatLon::checked(45.0, 4.0), Some(LatLon(45.0, 4.0)));
    }

    #[test]
    fn haversine_is_symmetric_and_non_negative() {
        let paris = LatLon(48.8566, 2.3522);
        let lyon = LatLon(45.764, 4.8357);
        let there = paris.haversine_m(&lyon);
        let back = lyon.haversine_m(&paris);
        assert!((there - back).abs() < 1e-6);
        // Paris - Lyon is roughly 392 km.
        assert!(there > 385_000.0 && there < 400_000.0, "got {there}");
        assert_eq!(paris.haversine_m(&paris), 0.0);
    }

    #[test]
    fn unit_vector_has_unit_length() {
        let v = LatLon(43.3, -1.5).to_unit_vector();
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }
}
