//! Runs the radiation/weather linkage once.
//!
//! ```sh
//! RUST_LOG=info cargo run --example consolidate -- radiolink.toml
//! ```
//!
//! Without an argument the default settings are used (`data/raw` in,
//! `data/processed/radiation_weather.csv` out).

use radiolink::{Pipeline, PipelineConfig, RadiolinkError};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), RadiolinkError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_toml_file(&PathBuf::from(path))?,
        None => PipelineConfig::default(),
    };

    let report = Pipeline::new(config)?.run().await?;
    println!(
        "{} records written, {} without location, {} without weather, {} duplicates removed",
        report.records_written,
        report.unresolved_locations,
        report.unmatched_weather_total(),
        report.duplicates_removed
    );
    Ok(())
}
