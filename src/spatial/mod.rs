//! Per-date nearest-station lookup over the weather grid.

pub mod station_index;

pub use station_index::{Neighbour, StationIndex, TIE_TOLERANCE_M};

use crate::types::location::LatLon;
use crate::types::weather::{StationPoint, WeatherObservation};
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;
use rstar::RTree;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// The observations of a single day, with an R-tree built on first use.
#[derive(Debug, Default)]
pub struct DatePartition {
    observations: Vec<WeatherObservation>,
    rtree: OnceLock<RTree<StationPoint>>,
}

impl DatePartition {
    fn new(observations: Vec<WeatherObservation>) -> Self {
        Self {
            observations,
            rtree: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.rtree.get().is_some()
    }

    fn rtree(&self) -> &RTree<StationPoint> {
        self.rtree
            .get_or_init(|| station_index::bulk_load(&self.observations))
    }

    pub fn nearest(&self, at: LatLon) -> Option<Neighbour<'_>> {
        station_index::nearest_station(self.rtree(), &self.observations, at)
    }
}

/// Weather observations partitioned by date. Immutable once built.
#[derive(Debug, Default)]
pub struct WeatherIndex {
    partitions: BTreeMap<NaiveDate, DatePartition>,
}

impl WeatherIndex {
    pub fn new(observations: impl IntoIterator<Item = WeatherObservation>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<WeatherObservation>> = BTreeMap::new();
        for observation in observations {
            by_date.entry(observation.date).or_default().push(observation);
        }
        let partitions = by_date
            .into_iter()
            .map(|(date, observations)| (date, DatePartition::new(observations)))
            .collect::<BTreeMap<_, _>>();
        debug!("Partitioned weather observations over {} dates", partitions.len());
        Self { partitions }
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.partitions.keys()
    }

    pub fn partition(&self, date: NaiveDate) -> Option<&DatePartition> {
        self.partitions.get(&date)
    }

    /// Nearest observation on `date`, or `None` when that day has no observations.
    pub fn nearest(&self, date: NaiveDate, at: LatLon) -> Option<Neighbour<'_>> {
        self.partitions.get(&date)?.nearest(at)
    }

    /// Builds the R-trees of the given dates in parallel ahead of querying.
    pub fn prepare<'a>(&self, dates: impl IntoIterator<Item = &'a NaiveDate>) {
        let wanted: Vec<&DatePartition> = dates
            .into_iter()
            .filter_map(|date| self.partitions.get(date))
            .filter(|p| !p.is_built())
            .collect();
        wanted.into_par_iter().for_each(|partition| {
            partition.rtree();
        });
    }
}
