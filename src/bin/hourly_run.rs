/// Hourly-resolution pipeline run.
///
/// Fetches the sub-hourly streamflow history and the hourly SNOTEL history,
/// writes the granular flow table as-is, then produces the reconciled
/// products: flow averaged to hourly and daily means, and one merged hourly
/// table combining SNOTEL elements with the hourly flow, forward-filling
/// only the flow column across reporting gaps.

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
        logging::error(DataSource::System, None, &format!("hourly run failed: {}", err));
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

    let granular = pipeline::collect_granular_flow(&client, &config, now)?;
    sink::write_table(&granular, Resolution::Hourly, &config.artifact_path("granular_cfs.csv"))?;

    let hourly_index = CanonicalIndex::build(
        config.start_datetime(),
        Resolution::Hourly.truncate(now),
        Resolution::Hourly,
    )?;
    let hourly_flow = merge::resample_mean(&granular, Resolution::Hourly);
    let hourly_cfs = merge::merge(&hourly_index, &[&hourly_flow], &FillPolicy::forward(&[PREFIX_FLOW]));
    sink::write_table(&hourly_cfs, Resolution::Hourly, &config.artifact_path("hourly_cfs.csv"))?;

    let daily_index = CanonicalIndex::build(
        config.start_datetime(),
        Resolution::Daily.truncate(now),
        Resolution::Daily,
    )?;
    let daily_flow = merge::resample_mean(&granular, Resolution::Daily);
    let daily_aggregated = merge::merge(&daily_index, &[&daily_flow], &FillPolicy::none());
    sink::write_table(
        &daily_aggregated,
        Resolution::Daily,
        &config.artifact_path("daily_cfs_aggregated.csv"),
    )?;

    let snotel = pipeline::collect_snotel(&client, &config, now, Resolution::Hourly)?;
    sink::write_table(&snotel, Resolution::Hourly, &config.artifact_path("hourly_sntl.csv"))?;

    // SNOTEL first: it is authoritative for its own element columns, and
    // the flow table only fills cells the SNOTEL table never defines.
    let merged = merge::merge(
        &hourly_index,
        &[&snotel, &hourly_flow],
        &FillPolicy::forward(&[PREFIX_FLOW]),
    );
    let merged_path = config.artifact_path("hourly_merged.csv");
    sink::write_table(&merged, Resolution::Hourly, &merged_path)?;

    logging::info(
        DataSource::System,
        None,
        &format!(
            "hourly run complete: {} hours, {} flow values -> {}",
            merged.len(),
            merged.populated(PREFIX_FLOW),
            merged_path.display()
        ),
    );
    Ok(())
}
