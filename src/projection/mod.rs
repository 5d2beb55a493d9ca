pub mod error;
pub mod lambert;

use crate::projection::error::ProjectionError;
use crate::projection::lambert::LambertIIExtended;
use crate::types::location::LatLon;
use crate::types::weather::ProjectedPoint;
use std::sync::LazyLock;

static LAMBERT_II_EXTENDED: LazyLock<LambertIIExtended> = LazyLock::new(LambertIIExtended::default);

/// Projects a SIM2 grid point (Lambert II étendu, metres) to WGS84.
///
/// Shorthand for [`LambertIIExtended::to_wgs84`] on the default parameters.
pub fn project(point: ProjectedPoint) -> Result<LatLon, ProjectionError> {
    LAMBERT_II_EXTENDED.to_wgs84(point)
}

/// Inverse of [`project`].
pub fn unproject(position: LatLon) -> Result<ProjectedPoint, ProjectionError> {
    LAMBERT_II_EXTENDED.from_wgs84(position)
}
