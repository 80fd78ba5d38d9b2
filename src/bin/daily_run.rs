/// Daily-resolution pipeline run.
///
/// Fetches the full daily history for the configured SNOTEL station and
/// streamflow gauge, writes each normalized table, then reconciles both
/// onto the canonical daily calendar: the SNOTEL table is folded onto the
/// index and the flow table is left-joined against it, so every calendar
/// day appears in the merged output whether or not the gauge reported.

use std::path::Path;
use std::time::Duration;

use chrono::Local;

use snowflow_pipeline::config::PipelineConfig;
use snowflow_pipeline::index::CanonicalIndex;
use snowflow_pipeline::logging::{self, DataSource, LogLevel};
use snowflow_pipeline::merge::{self, FillPolicy};
use snowflow_pipeline::model::{PipelineError, Resolution, PREFIX_FLOW};
use snowflow_pipeline::{pipeline, sink};

fn main() {
    logging::init_logger(LogLevel::Info, None);
    if let Err(err) = run() {
        logging::error(DataSource::System, None, &format!("daily run failed: {}", err));
        std::process::exit(1);
    }
}

fn run() -> Result<(), PipelineError> {
    let config = PipelineConfig::load_optional(Path::new("snowflow.toml"))?;
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| PipelineError::Request(e.to_string()))?;
    let now = Local::now().naive_local();

    let snotel = pipeline::collect_snotel(&client, &config, now, Resolution::Daily)?;
    sink::write_table(&snotel, Resolution::Daily, &config.artifact_path("daily_sntl.csv"))?;

    let flow = pipeline::collect_daily_flow(&client, &config, now)?;
    sink::write_table(&flow, Resolution::Daily, &config.artifact_path("daily_cfs.csv"))?;

    let index = CanonicalIndex::build(
        config.start_datetime(),
        Resolution::Daily.truncate(now),
        Resolution::Daily,
    )?;
    let met = merge::merge(&index, &[&snotel], &FillPolicy::none());
    let merged = merge::left_join(&met, &flow);
    let merged_path = config.artifact_path("daily_merged.csv");
    sink::write_table(&merged, Resolution::Daily, &merged_path)?;

    logging::info(
        DataSource::System,
        None,
        &format!(
            "daily run complete: {} calendar days, {} flow values -> {}",
            merged.len(),
            merged.populated(PREFIX_FLOW),
            merged_path.display()
        ),
    );
    Ok(())
}
