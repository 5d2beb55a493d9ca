//! NTF Lambert II étendu (EPSG:27572) ↔ WGS84 (EPSG:4326).
//!
//! The SIM2 weather grid is published in Lambert II étendu, a conformal conic
//! projection on the Clarke 1880 (IGN) ellipsoid with the Paris meridian as
//! origin. Converting to WGS84 takes three steps:
//! - inverse Lambert projection to NTF geographic coordinates
//! - geographic → geocentric Cartesian on the Clarke ellipsoid
//! - three-parameter translation to WGS84 and back to geographic coordinates
//!
//! The translation-only datum shift is accurate to a few metres, well below the
//! 8 km SIM2 grid spacing.

use crate::projection::error::ProjectionError;
use crate::types::location::LatLon;
use crate::types::weather::ProjectedPoint;
use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;
use std::ops::RangeInclusive;

const MAX_ITERATIONS: usize = 64;
const CONVERGENCE_RAD: f64 = 1e-12;

/// A reference ellipsoid described by its semi-major axis and squared eccentricity.
#[derive(Debug, Clone, Copy)]
struct Ellipsoid {
    a: f64,
    e2: f64,
}

impl Ellipsoid {
    fn e(&self) -> f64 {
        self.e2.sqrt()
    }

    fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.a / (1.0 - self.e2 * lat.sin().powi(2)).sqrt()
    }

    /// Geographic (radians, metres above the ellipsoid) → geocentric Cartesian.
    fn to_cartesian(&self, lat: f64, lon: f64, h: f64) -> [f64; 3] {
        let n = self.prime_vertical_radius(lat);
        [
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - self.e2) + h) * lat.sin(),
        ]
    }

    /// Geocentric Cartesian → geographic (radians, radians, metres).
    fn to_geographic(&self, xyz: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = xyz;
        let p = x.hypot(y);
        let lon = y.atan2(x);
        let mut lat = z.atan2(p * (1.0 - self.e2));
        let mut h = 0.0;
        for _ in 0..MAX_ITERATIONS {
            let n = self.prime_vertical_radius(lat);
            h = p / lat.cos() - n;
            let next = z.atan2(p * (1.0 - self.e2 * n / (n + h)));
            let done = (next - lat).abs() < CONVERGENCE_RAD;
            lat = next;
            if done {
                break;
            }
        }
        (lat, lon, h)
    }
}

/// Clarke 1880 as used by IGN for the NTF datum (b = 6 356 515 m).
const CLARKE_1880_IGN: Ellipsoid = Ellipsoid {
    a: 6_378_249.2,
    e2: 0.006_803_487_646_299_893,
};

/// WGS84 (1/f = 298.257223563).
const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    e2: 0.006_694_379_990_141_317,
};

/// Translation from NTF to WGS84 geocentric coordinates, in metres.
const NTF_TO_WGS84: [f64; 3] = [-168.0, -60.0, 320.0];

/// Lambert II étendu projection constants and the envelope of sane inputs.
///
/// The default value is the only configuration the SIM2 grid needs. Inputs
/// outside the envelope are rejected as corrupt.
#[derive(Debug, Clone)]
pub struct LambertIIExtended {
    /// Cone constant.
    n: f64,
    /// Projection constant, in metres.
    c: f64,
    /// False easting of the cone apex.
    xs: f64,
    /// False northing of the cone apex.
    ys: f64,
    /// Paris meridian, radians east of Greenwich.
    lon0: f64,
    grid_x: RangeInclusive<f64>,
    grid_y: RangeInclusive<f64>,
    latitude: RangeInclusive<f64>,
    longitude: RangeInclusive<f64>,
}

impl Default for LambertIIExtended {
    fn default() -> Self {
        Self {
            n: 0.728_968_627_4,
            c: 11_745_793.39,
            xs: 600_000.0,
            ys: 8_199_695.768,
            lon0: (2.0 + 20.0 / 60.0 + 14.025 / 3600.0_f64).to_radians(),
            grid_x: 0.0..=1_300_000.0,
            grid_y: 1_500_000.0..=2_800_000.0,
            latitude: 41.0..=51.6,
            longitude: -5.8..=10.0,
        }
    }
}

impl LambertIIExtended {
    /// Converts a Lambert II étendu point (metres) into WGS84 latitude/longitude.
    ///
    /// # Errors
    ///
    /// Returns a [`ProjectionError`] if the input is not finite, lies outside the
    /// grid envelope, or lands outside metropolitan France once projected.
    ///
    /// # Examples
    ///
    /// ```
    /// use radiolink::{LambertIIExtended, ProjectedPoint};
    ///
    /// let lambert = LambertIIExtended::default();
    /// let paris = lambert
    ///     .to_wgs84(ProjectedPoint { x: 601_000.0, y: 2_428_000.0 })
    ///     .unwrap();
    /// assert!((paris.0 - 48.85).abs() < 0.05);
    /// assert!((paris.1 - 2.35).abs() < 0.05);
    /// ```
    pub fn to_wgs84(&self, point: ProjectedPoint) -> Result<LatLon, ProjectionError> {
        let ProjectedPoint { x, y } = point;
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }
        if !self.grid_x.contains(&x) || !self.grid_y.contains(&y) {
            return Err(ProjectionError::OutsideEnvelope { x, y });
        }

        let (lat_ntf, lon_ntf) = self.inverse(x, y);
        let ntf = CLARKE_1880_IGN.to_cartesian(lat_ntf, lon_ntf, 0.0);
        let shifted = [
            ntf[0] + NTF_TO_WGS84[0],
            ntf[1] + NTF_TO_WGS84[1],
            ntf[2] + NTF_TO_WGS84[2],
        ];
        let (lat, lon, _) = WGS84.to_geographic(shifted);
        let (latitude, longitude) = (lat.to_degrees(), lon.to_degrees());

        if !self.latitude.contains(&latitude) || !self.longitude.contains(&longitude) {
            return Err(ProjectionError::OutsideTerritory {
                latitude,
                longitude,
            });
        }
        Ok(LatLon(latitude, longitude))
    }

    /// Converts a WGS84 position into Lambert II étendu metres.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::OutsideTerritory`] for positions outside
    /// metropolitan France, or [`ProjectionError::NonFinite`] for NaN/infinite input.
    pub fn from_wgs84(&self, position: LatLon) -> Result<ProjectedPoint, ProjectionError> {
        let LatLon(latitude, longitude) = position;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(ProjectionError::NonFinite {
                x: longitude,
                y: latitude,
            });
        }
        if !self.latitude.contains(&latitude) || !self.longitude.contains(&longitude) {
            return Err(ProjectionError::OutsideTerritory {
                latitude,
                longitude,
            });
        }

        let wgs = WGS84.to_cartesian(latitude.to_radians(), longitude.to_radians(), 0.0);
        let ntf = [
            wgs[0] - NTF_TO_WGS84[0],
            wgs[1] - NTF_TO_WGS84[1],
            wgs[2] - NTF_TO_WGS84[2],
        ];
        let (lat_ntf, lon_ntf, _) = CLARKE_1880_IGN.to_geographic(ntf);
        let (x, y) = self.forward(lat_ntf, lon_ntf);
        Ok(ProjectedPoint { x, y })
    }

    /// Inverse conic projection to NTF geographic coordinates (radians).
    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.xs;
        let dy = self.ys - y;
        let r = dx.hypot(dy);
        let gamma = dx.atan2(dy);
        let lon = self.lon0 + gamma / self.n;
        let isometric = -(r / self.c).ln() / self.n;
        (latitude_from_isometric(isometric, CLARKE_1880_IGN.e()), lon)
    }

    /// Forward conic projection from NTF geographic coordinates (radians).
    fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let isometric = isometric_latitude(lat, CLARKE_1880_IGN.e());
        let r = self.c * (-self.n * isometric).exp();
        let gamma = self.n * (lon - self.lon0);
        (self.xs + r * gamma.sin(), self.ys - r * gamma.cos())
    }
}

fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let es = e * lat.sin();
    ((FRAC_PI_4 + lat / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln()
}

fn latitude_from_isometric(isometric: f64, e: f64) -> f64 {
    let expl = isometric.exp();
    let mut lat = 2.0 * expl.atan() - FRAC_PI_2;
    for _ in 0..MAX_ITERATIONS {
        let es = e * lat.sin();
        let next = 2.0 * (((1.0 + es) / (1.0 - es)).powf(e / 2.0) * expl).atan() - FRAC_PI_2;
        let done = (next - lat).abs() < CONVERGENCE_RAD;
        lat = next;
        if done {
            break;
        }
    }
    lat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isometric_latitude_round_trips() {
        let e = CLARKE_1880_IGN.e();
        for deg in [41.5_f64, 44.0, 46.8, 49.2, 51.0] {
            let lat = deg.to_radians();
            let back = latitude_from_isometric(isometric_latitude(lat, e), e);
            assert!((back - lat).abs() < 1e-11, "{deg}: {back} vs {lat}");
        }
    }

    #[test]
    fn projection_origin_maps_to_paris_meridian() {
        // The false origin (600 km, 2200 km) sits on the Paris meridian at 52 grads (46.8°).
        let lambert = LambertIIExtended::default();
        let (lat, lon) = lambert.inverse(600_000.0, 2_200_000.0);
        assert!((lat.to_degrees() - 46.8).abs() < 1e-6, "lat {}", lat.to_degrees());
        assert!((lon.to_degrees() - 2.337_229_166_7).abs() < 1e-8);

        // The datum shift only nudges the position by a few arc-seconds.
        let wgs = lambert
            .to_wgs84(ProjectedPoint {
                x: 600_000.0,
                y: 2_200_000.0,
            })
            .unwrap();
        assert!((wgs.0 - 46.8).abs() < 0.005, "lat {}", wgs.0);
        assert!((wgs.1 - 2.3372).abs() < 0.005, "lon {}", wgs.1);
    }

    #[test]
    fn round_trip_within_envelope() {
        let lambert = LambertIIExtended::default();
        for x in (100_000..=1_100_000).step_by(125_000) {
            for y in (1_750_000..=2_650_000).step_by(100_000) {
                let point = ProjectedPoint {
                    x: x as f64,
                    y: y as f64,
                };
                // Some corners of the envelope fall outside the territory box.
                let Ok(position) = lambert.to_wgs84(point) else {
                    continue;
                };
                let back = lambert.from_wgs84(position).unwrap();
                assert!(
                    (back.x - point.x).abs() < 0.05 && (back.y - point.y).abs() < 0.05,
                    "({x}, {y}) came back as ({}, {})",
                    back.x,
                    back.y
                );
            }
        }
    }

    #[test]
    fn rejects_coordinates_outside_envelope() {
        let lambert = LambertIIExtended::default();
        let err = lambert
            .to_wgs84(ProjectedPoint {
                x: 6_000.0,
                y: 24_280.0,
            })
            .unwrap_err();
        assert!(matches!(err, ProjectionError::OutsideEnvelope { .. }));

        let err = lambert
            .to_wgs84(ProjectedPoint {
                x: f64::NAN,
                y: 2_000_000.0,
            })
            .unwrap_err();
        assert!(matches!(err, ProjectionError::NonFinite { .. }));
    }

    #[test]
    fn rejects_positions_outside_territory() {
        let lambert = LambertIIExtended::default();
        let err = lambert.from_wgs84(LatLon(40.4, -3.7)).unwrap_err();
        assert!(matches!(err, ProjectionError::OutsideTerritory { .. }));
    }
}
