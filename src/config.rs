/// Run configuration.
///
/// Every component takes its parameters from an explicit `PipelineConfig`
/// value — there is no process-wide mutable state and no environment
/// variable surface. Defaults carry the production target (the Gallatin
/// gauge and its paired SNOTEL station); a `snowflow.toml` next to the
/// binary overrides them for other stations or shorter test ranges.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::model::PipelineError;
use crate::stations;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// 8-digit USGS site code, used by the NWIS IV service.
    pub flow_site: String,
    /// Agency-qualified monitoring location id, used by the OGC daily API.
    pub flow_location_id: String,
    /// AWDB station triplet for the paired SNOTEL site.
    pub snotel_triplet: String,
    /// AWDB element codes to request.
    pub snotel_elements: Vec<String>,
    /// First day of the requested history.
    pub start_date: NaiveDate,
    /// Maximum span of one daily-API window, in days.
    pub daily_chunk_days: i64,
    /// Maximum span of one hourly-API window, in days.
    pub hourly_chunk_days: i64,
    /// Minimum pause between consecutive fetches, in seconds.
    pub fetch_delay_secs: u64,
    /// Page/result limit sent to the daily API.
    pub result_limit: u32,
    /// Directory the persisted tables are written into.
    pub data_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> PipelineConfig {
        let gauge = &stations::GAUGE_REGISTRY[0];
        let snotel = &stations::SNOTEL_REGISTRY[0];
        PipelineConfig {
            flow_site: gauge.site_code.to_string(),
            flow_location_id: gauge.location_id.to_string(),
            snotel_triplet: snotel.triplet.to_string(),
            snotel_elements: snotel.elements.iter().map(|e| e.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid constant date"),
            daily_chunk_days: 5000,
            hourly_chunk_days: 365,
            fetch_delay_secs: 1,
            result_limit: 5000,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<PipelineConfig, PipelineError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Loads the file if it exists, otherwise falls back to the defaults.
    /// A file that exists but does not parse is an error — running a long
    /// fetch against half-applied configuration is worse than not running.
    pub fn load_optional(path: &Path) -> Result<PipelineConfig, PipelineError> {
        if path.exists() {
            PipelineConfig::load(path)
        } else {
            Ok(PipelineConfig::default())
        }
    }

    /// The configured start day as the first instant of that day.
    pub fn start_datetime(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.start_date, NaiveTime::MIN)
    }

    pub fn fetch_delay(&self) -> StdDuration {
        StdDuration::from_secs(self.fetch_delay_secs)
    }

    /// Path of a persisted artifact inside the data directory.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reference_the_registry_stations() {
        let config = PipelineConfig::default();
        assert_eq!(config.flow_site, "06043500");
        assert_eq!(config.flow_location_id, "USGS-06043500");
        assert_eq!(config.snotel_triplet, "754:MT:SNTL");
        assert_eq!(config.snotel_elements, vec!["WTEQ", "TOBS"]);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    }

    #[test]
    fn test_toml_overrides_merge_with_defaults() {
        let parsed: PipelineConfig = toml::from_str(
            r#"
            flow_site = "05568500"
            flow_location_id = "USGS-05568500"
            start_date = "2015-10-01"
            fetch_delay_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(parsed.flow_site, "05568500");
        assert_eq!(parsed.fetch_delay_secs, 2);
        // Unspecified fields keep their defaults.
        assert_eq!(parsed.daily_chunk_days, 5000);
        assert_eq!(parsed.snotel_triplet, "754:MT:SNTL");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<PipelineConfig, _> = toml::from_str("statoin_triplet = \"oops\"");
        assert!(result.is_err(), "typoed keys should fail loudly, not be ignored");
    }

    #[test]
    fn test_load_optional_defaults_when_file_missing() {
        let config =
            PipelineConfig::load_optional(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config.flow_site, PipelineConfig::default().flow_site);
    }

    #[test]
    fn test_start_datetime_is_midnight() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.start_datetime(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_artifact_path_joins_data_dir() {
        let config = PipelineConfig::default();
        assert_eq!(config.artifact_path("daily_merged.csv"), PathBuf::from("data/daily_merged.csv"));
    }
}
