/// Fetch-loop orchestration.
///
/// Drives a window plan against one provider: strictly sequential fetches
/// in chronological order, a blocking pause between consecutive calls to
/// respect provider rate limits, and per-window failure containment —
/// a bad window is logged and skipped, everything else keeps the run alive.
/// Fatal errors (schema drift, inverted ranges) propagate immediately.

use std::thread;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};

use crate::config::PipelineConfig;
use crate::ingest::awdb::{self, AwdbQuery};
use crate::ingest::{usgs_daily, usgs_iv};
use crate::logging::{self, DataSource};
use crate::model::{ObservationRecord, PipelineError, Resolution, TimeWindow, PARAM_DISCHARGE};
use crate::table::SeriesTable;
use crate::windows::{self, WindowPlan};

// ---------------------------------------------------------------------------
// Generic fetch loop
// ---------------------------------------------------------------------------

/// Runs a window plan to completion, accumulating all normalized records
/// into one table.
///
/// The delay is a property of the call sequence, not of a call: it is
/// inserted before every fetch after the first, and nothing else proceeds
/// during the pause. `Fetch`/`Request` errors contribute zero records and
/// the loop continues; fatal errors abort.
pub fn collect_series<F>(
    plan: WindowPlan,
    delay: StdDuration,
    source: DataSource,
    station: &str,
    mut fetch: F,
) -> Result<SeriesTable, PipelineError>
where
    F: FnMut(&TimeWindow) -> Result<Vec<ObservationRecord>, PipelineError>,
{
    let mut table = SeriesTable::new();
    let mut total = 0usize;
    let mut first = true;

    for window in plan {
        if !first {
            thread::sleep(delay);
        }
        first = false;

        logging::info(source, Some(station), &format!("fetching {}", window.describe()));
        match fetch(&window) {
            Ok(records) if records.is_empty() => {
                logging::log_window_empty(source, station, &window.describe());
            }
            Ok(records) => {
                total += records.len();
                table.add_records(&records);
                logging::info(
                    source,
                    Some(station),
                    &format!("got {} records ({} total)", records.len(), total),
                );
            }
            Err(err) if !err.is_fatal() => {
                logging::log_window_skipped(source, station, &window.describe(), &err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// Per-source collectors
// ---------------------------------------------------------------------------

/// Full-history daily streamflow from the OGC daily values API.
pub fn collect_daily_flow(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    now: NaiveDateTime,
) -> Result<SeriesTable, PipelineError> {
    let plan = windows::plan(
        config.start_datetime(),
        now,
        Duration::days(config.daily_chunk_days),
        Resolution::Daily,
    )?;
    collect_series(
        plan,
        config.fetch_delay(),
        DataSource::UsgsDaily,
        &config.flow_location_id,
        |window| usgs_daily::fetch_window(client, &config.flow_location_id, config.result_limit, window),
    )
}

/// Full-history sub-hourly streamflow from the NWIS IV service. The
/// readings come back at the gauge's native cadence (typically 15 min);
/// aggregate with `merge::resample_mean` before putting them on an index.
pub fn collect_granular_flow(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    now: NaiveDateTime,
) -> Result<SeriesTable, PipelineError> {
    let plan = windows::plan(
        config.start_datetime(),
        now,
        Duration::days(config.hourly_chunk_days),
        Resolution::Hourly,
    )?;
    collect_series(
        plan,
        config.fetch_delay(),
        DataSource::UsgsIv,
        &config.flow_site,
        |window| usgs_iv::fetch_window(client, &config.flow_site, PARAM_DISCHARGE, window),
    )
}

/// Full-history SNOTEL elements at the requested duration.
pub fn collect_snotel(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    now: NaiveDateTime,
    resolution: Resolution,
) -> Result<SeriesTable, PipelineError> {
    let plan = windows::plan(
        config.start_datetime(),
        now,
        Duration::days(config.hourly_chunk_days),
        resolution,
    )?;
    let query = AwdbQuery {
        station_triplet: &config.snotel_triplet,
        elements: &config.snotel_elements,
        resolution,
    };
    collect_series(
        plan,
        config.fetch_delay(),
        DataSource::Awdb,
        &config.snotel_triplet,
        |window| awdb::fetch_window(client, &query, window),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
