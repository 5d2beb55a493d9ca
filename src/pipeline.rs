//! The end-to-end run: normalize, enrich, match, consolidate, write.

use crate::config::PipelineConfig;
use crate::consolidate::consolidate;
use crate::consolidate::writer::{remove_stale, write_atomic};
use crate::error::RadiolinkError;
use crate::gazetteer::Gazetteer;
use crate::matcher::Matcher;
use crate::normalize::gazetteer::normalize_gazetteer_file;
use crate::normalize::radiation::{discover_radiation_files, normalize_radiation_file};
use crate::normalize::weather::normalize_weather_file;
use crate::normalize::Normalized;
use crate::quality::{
    check_threshold, QualityReport, QualityStage, QualityThresholdExceeded, SourceTally,
};
use crate::spatial::WeatherIndex;
use crate::types::matched::MatchedRecord;
use crate::types::municipality::MunicipalityRecord;
use crate::types::radiation::RadiationMeasurement;
use crate::types::source::SourceKind;
use crate::types::weather::WeatherObservation;
use log::{info, warn};
use rayon::prelude::*;
use tokio::task::{spawn_blocking, JoinHandle};

/// All three sources after normalization.
struct Inputs {
    radiation: Normalized<RadiationMeasurement>,
    weather: Normalized<WeatherObservation>,
    gazetteer: Normalized<MunicipalityRecord>,
}

/// Runs the linkage pipeline for one [`PipelineConfig`].
///
/// # Examples
///
/// ```no_run
/// # use radiolink::{Pipeline, PipelineConfig, RadiolinkError};
/// # async fn run() -> Result<(), RadiolinkError> {
/// let config = PipelineConfig::builder().raw_dir("data/raw").build();
/// let report = Pipeline::new(config)?.run().await?;
/// println!("{} records written", report.records_written);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, RadiolinkError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executes one run and returns its quality report.
    ///
    /// Either the output table is written completely or, on any error, no table
    /// is left at the output path, including one written by an earlier run.
    pub async fn run(&self) -> Result<QualityReport, RadiolinkError> {
        match self.try_run().await {
            Ok(report) => Ok(report),
            Err(e) => {
                remove_stale(&self.config.output_path)?;
                Err(e)
            }
        }
    }

    async fn try_run(&self) -> Result<QualityReport, RadiolinkError> {
        let inputs = self.read_sources().await?;

        let mut report = QualityReport::default();
        for (kind, tally) in [
            (SourceKind::Radiation, &inputs.radiation.tally),
            (SourceKind::Weather, &inputs.weather.tally),
            (SourceKind::Gazetteer, &inputs.gazetteer.tally),
        ] {
            report.sources.insert(kind, tally.clone());
        }
        if let Err(e) = self.check_sources(&report) {
            warn!("Aborting run: {}", e);
            report.log_summary();
            return Err(e.into());
        }

        let config = self.config.clone();
        let report = spawn_blocking(move || link_and_write(&config, inputs, report)).await??;
        report.log_summary();
        Ok(report)
    }

    /// Reads every source on the blocking pool, one task per file.
    async fn read_sources(&self) -> Result<Inputs, RadiolinkError> {
        let raw_dir = self.config.raw_dir.clone();
        let prefix = self.config.radiation_file_prefix.clone();
        let radiation_files =
            spawn_blocking(move || discover_radiation_files(&raw_dir, &prefix)).await??;
        info!("Found {} radiation files", radiation_files.len());

        let radiation_tasks: Vec<JoinHandle<_>> = radiation_files
            .into_iter()
            .map(|path| {
                let prefix = self.config.radiation_file_prefix.clone();
                spawn_blocking(move || normalize_radiation_file(&path, &prefix))
            })
            .collect();

        let weather_path = self.config.weather_path();
        let scale = self.config.weather_coordinate_scale;
        let weather_task = spawn_blocking(move || normalize_weather_file(&weather_path, scale));

        let gazetteer_path = self.config.gazetteer_path();
        let gazetteer_task = spawn_blocking(move || normalize_gazetteer_file(&gazetteer_path));

        let mut radiation_parts = Vec::with_capacity(radiation_tasks.len());
        for task in radiation_tasks {
            radiation_parts.push(task.await??);
        }

        Ok(Inputs {
            radiation: Normalized::concat(radiation_parts),
            weather: weather_task.await??,
            gazetteer: gazetteer_task.await??,
        })
    }

    fn check_sources(
        &self,
        report: &QualityReport,
    ) -> Result<(), QualityThresholdExceeded> {
        for (kind, tally) in &report.sources {
            check_source(*kind, tally, self.config.max_rejected_fraction)?;
        }
        Ok(())
    }
}

fn check_source(
    kind: SourceKind,
    tally: &SourceTally,
    max_rejected_fraction: f64,
) -> Result<(), QualityThresholdExceeded> {
    check_threshold(
        QualityStage::Source(kind),
        tally.rejected_total(),
        tally.rows_read,
        max_rejected_fraction,
    )
}

/// The CPU-bound part of a run: enrichment, matching, consolidation and the write.
fn link_and_write(
    config: &PipelineConfig,
    inputs: Inputs,
    mut report: QualityReport,
) -> Result<QualityReport, RadiolinkError> {
    let (gazetteer, collisions) = Gazetteer::build(inputs.gazetteer.records);
    report.gazetteer_collisions = collisions;
    info!("Gazetteer holds {} municipalities", gazetteer.len());

    let enriched: Vec<MatchedRecord> = inputs
        .radiation
        .records
        .into_par_iter()
        .map(|measurement| gazetteer.enrich(measurement))
        .collect();
    report.unresolved_locations = enriched.iter().filter(|r| r.location_unresolved()).count();

    let index = WeatherIndex::new(inputs.weather.records);
    let matcher = Matcher::new(config.max_match_distance_km);
    let matched = matcher.match_all(&index, enriched);

    let mut records = Vec::with_capacity(matched.len());
    for (record, unmatched) in matched {
        if let Some(reason) = unmatched {
            *report.unmatched_weather.entry(reason).or_default() += 1;
        }
        records.push(record);
    }

    let consolidated = match consolidate(records, config.max_rejected_fraction) {
        Ok(consolidated) => consolidated,
        Err(e) => {
            warn!("Aborting run: {}", e);
            report.log_summary();
            return Err(e.into());
        }
    };
    report.duplicates_removed = consolidated.duplicates_removed;
    report.validation_failures = consolidated.validation_failures;

    write_atomic(&consolidated.records, &config.output_path)?;
    report.records_written = consolidated.records.len();
    Ok(report)
}
