use crate::types::location::LatLon;
use crate::types::weather::{StationPoint, WeatherObservation};
use ordered_float::OrderedFloat;
use rstar::RTree;

/// Stations whose distances differ by less than this are equally near.
pub const TIE_TOLERANCE_M: f64 = 1e-6;

/// Candidates within this many metres of the first hit are re-ranked by haversine
/// distance, absorbing rounding differences between chord and arc ordering.
const RERANK_WINDOW_M: f64 = 1.0;

/// The nearest observation to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour<'a> {
    pub observation: &'a WeatherObservation,
    /// Great-circle distance in metres.
    pub distance_m: f64,
}

/// An immutable nearest-neighbour index over one set of observations.
#[derive(Debug, Clone)]
pub struct StationIndex {
    observations: Vec<WeatherObservation>,
    rtree: RTree<StationPoint>,
}

impl StationIndex {
    pub fn build(observations: Vec<WeatherObservation>) -> Self {
        let rtree = bulk_load(&observations);
        Self {
            observations,
            rtree,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[WeatherObservation] {
        &self.observations
    }

    /// Nearest observation by great-circle distance; `None` when the index is empty.
    ///
    /// Ties within [`TIE_TOLERANCE_M`] go to the lowest station id.
    pub fn nearest(&self, at: LatLon) -> Option<Neighbour<'_>> {
        nearest_station(&self.rtree, &self.observations, at)
    }
}

pub(crate) fn bulk_load(observations: &[WeatherObservation]) -> RTree<StationPoint> {
    let points = observations
        .iter()
        .enumerate()
        .map(|(slot, obs)| StationPoint {
            slot,
            xyz: obs.position.to_unit_vector(),
        })
        .collect();
    RTree::bulk_load(points)
}

pub(crate) fn nearest_station<'a>(
    rtree: &RTree<StationPoint>,
    observations: &'a [WeatherObservation],
    at: LatLon,
) -> Option<Neighbour<'a>> {
    let query = at.to_unit_vector();

    let mut candidates: Vec<(OrderedFloat<f64>, &'a WeatherObservation)> = Vec::new();
    let mut first_m: Option<f64> = None;
    for point in rtree.nearest_neighbor_iter(&query) {
        let observation = &observations[point.slot];
        let distance_m = at.haversine_m(&observation.position);
        let first = *first_m.get_or_insert(distance_m);
        if distance_m > first + RERANK_WINDOW_M {
            break;
        }
        candidates.push((OrderedFloat(distance_m), observation));
    }

    let best = candidates.iter().map(|(d, _)| *d).min()?;
    candidates
        .into_iter()
        .filter(|(d, _)| d.into_inner() - best.into_inner() <= TIE_TOLERANCE_M)
        .min_by(|a, b| a.1.station_id.cmp(&b.1.station_id))
        .map(|(d, observation)| Neighbour {
            observation,
            distance_m: d.into_inner(),
        })
}
