/// USGS OGC API daily values client.
///
/// Retrieves approved/provisional daily streamflow statistics from the
/// Water Data OGC API. Responses are GeoJSON feature collections; each
/// feature's `properties` object carries one daily observation.
///
/// API documentation: https://api.waterdata.usgs.gov/ogcapi/v0/

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::model::{ObservationRecord, PipelineError, TimeWindow, PREFIX_FLOW};

pub const DAILY_BASE_URL: &str =
    "https://api.waterdata.usgs.gov/ogcapi/v0/collections/daily/items";

/// Interval bounds are UTC with an explicit `Z` suffix — this provider
/// rejects naive datetimes.
const DAILY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ============================================================================
// Response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: DailyProperties,
}

/// One daily observation. `value` is kept as a raw JSON value because the
/// provider has emitted both numbers and numeric strings over time.
#[derive(Debug, Deserialize)]
struct DailyProperties {
    time: Option<String>,
    value: Option<serde_json::Value>,
    #[serde(default)]
    approval_status: Option<String>,
}

// ============================================================================
// URL construction
// ============================================================================

/// Builds the items query for one window. `skipGeometry` keeps the payload
/// small — station coordinates never change and are not consumed here.
pub fn build_daily_url(location_id: &str, limit: u32, window: &TimeWindow) -> String {
    format!(
        "{}?f=json&limit={}&properties=time,value,unit_of_measure,approval_status\
         &skipGeometry=true&sortby=time&monitoring_location_id={}&time={}/{}",
        DAILY_BASE_URL,
        limit,
        location_id,
        window.start.format(DAILY_TIME_FORMAT),
        window.end.format(DAILY_TIME_FORMAT),
    )
}

// ============================================================================
// Normalization
// ============================================================================

/// Converts a feature-collection body into observation records, in response
/// order. Field renames are fixed: `time` → timestamp, `value` → value,
/// `approval_status` → qualifier. A feature without a `time` fails the
/// whole call.
pub fn parse_daily_response(body: &str) -> Result<Vec<ObservationRecord>, PipelineError> {
    let decoded: FeatureCollection = serde_json::from_str(body)
        .map_err(|e| PipelineError::SchemaMismatch(format!("daily response did not decode: {}", e)))?;

    let mut records = Vec::with_capacity(decoded.features.len());
    for feature in decoded.features {
        let props = feature.properties;
        let time = props.time.ok_or_else(|| {
            PipelineError::SchemaMismatch("daily feature is missing required 'time'".to_string())
        })?;
        let value = match &props.value {
            Some(raw) => super::coerce_numeric("value", raw)?,
            None => None,
        };
        records.push(ObservationRecord {
            timestamp: parse_daily_timestamp(&time)?,
            value,
            qualifier: props.approval_status.unwrap_or_default(),
            prefix: PREFIX_FLOW.to_string(),
        });
    }
    Ok(records)
}

/// Daily `time` values are bare dates; fall back to full RFC 3339 in case
/// the provider ever attaches a time component.
fn parse_daily_timestamp(raw: &str) -> Result<NaiveDateTime, PipelineError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(NaiveDateTime::new(date, NaiveTime::MIN));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    Err(PipelineError::SchemaMismatch(format!(
        "unparseable daily timestamp '{}'",
        raw
    )))
}

// ============================================================================
// Fetch
// ============================================================================

/// Performs exactly one network call for one window and normalizes the
/// response. Status failures surface as `Fetch` for the caller to skip.
pub fn fetch_window(
    client: &reqwest::blocking::Client,
    location_id: &str,
    limit: u32,
    window: &TimeWindow,
) -> Result<Vec<ObservationRecord>, PipelineError> {
    let url = build_daily_url(location_id, limit, window);
    let body = super::http_get(client, &url, "application/geo+json")?;
    parse_daily_response(&body)
}

// ============================================================================
// Tests
// ============================================================================
