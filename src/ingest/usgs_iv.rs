/// USGS NWIS instantaneous values client.
///
/// Retrieves sub-hourly (typically 15-minute) streamflow readings from the
/// NWIS IV service. The response nests the actual readings three levels
/// deep: `value.timeSeries[].values[].value[]`. An empty `timeSeries` list
/// is how the service reports "no data in this range" — it is not an error.
///
/// API documentation: https://waterservices.usgs.gov/rest/IV-Service.html

use chrono::DateTime;
use serde::Deserialize;

use crate::model::{ObservationRecord, PipelineError, TimeWindow, PREFIX_FLOW};

pub const IV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// NWIS accepts naive local datetimes for startDT/endDT; no zone marker.
const IV_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ============================================================================
// Response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct IvEnvelope {
    value: IvBody,
}

#[derive(Debug, Deserialize)]
struct IvBody {
    #[serde(rename = "timeSeries", default)]
    time_series: Vec<IvTimeSeries>,
}

#[derive(Debug, Deserialize)]
struct IvTimeSeries {
    #[serde(default)]
    values: Vec<IvValueBlock>,
}

#[derive(Debug, Deserialize)]
struct IvValueBlock {
    #[serde(default)]
    value: Vec<IvPoint>,
}

#[derive(Debug, Deserialize)]
struct IvPoint {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    value: Option<serde_json::Value>,
    #[serde(default)]
    qualifiers: Vec<String>,
}

// ============================================================================
// URL construction
// ============================================================================

pub fn build_iv_url(site: &str, parameter_code: &str, window: &TimeWindow) -> String {
    format!(
        "{}?sites={}&startDT={}&endDT={}&parameterCd={}&format=json",
        IV_BASE_URL,
        site,
        window.start.format(IV_TIME_FORMAT),
        window.end.format(IV_TIME_FORMAT),
        parameter_code,
    )
}

// ============================================================================
// Normalization
// ============================================================================

/// Flattens the nested envelope into observation records, in response
/// order. Reading timestamps arrive with an embedded UTC offset (the
/// station's local zone); they are converted to UTC and the offset is then
/// dropped, so one series never mixes offsets across a DST boundary.
pub fn parse_iv_response(body: &str) -> Result<Vec<ObservationRecord>, PipelineError> {
    let decoded: IvEnvelope = serde_json::from_str(body)
        .map_err(|e| PipelineError::SchemaMismatch(format!("IV response did not decode: {}", e)))?;

    let mut records = Vec::new();
    for series in decoded.value.time_series {
        for block in series.values {
            for point in block.value {
                let raw_datetime = point.date_time.ok_or_else(|| {
                    PipelineError::SchemaMismatch(
                        "IV reading is missing required 'dateTime'".to_string(),
                    )
                })?;
                let timestamp = DateTime::parse_from_rfc3339(&raw_datetime)
                    .map_err(|_| {
                        PipelineError::SchemaMismatch(format!(
                            "unparseable IV timestamp '{}'",
                            raw_datetime
                        ))
                    })?
                    .naive_utc();
                let value = match &point.value {
                    Some(raw) => super::coerce_numeric("value", raw)?,
                    None => None,
                };
                records.push(ObservationRecord {
                    timestamp,
                    value,
                    qualifier: point.qualifiers.join(","),
                    prefix: PREFIX_FLOW.to_string(),
                });
            }
        }
    }
    Ok(records)
}

// ============================================================================
// Fetch
// ============================================================================

pub fn fetch_window(
    client: &reqwest::blocking::Client,
    site: &str,
    parameter_code: &str,
    window: &TimeWindow,
) -> Result<Vec<ObservationRecord>, PipelineError> {
    let url = build_iv_url(site, parameter_code, window);
    let body = super::http_get(client, &url, "application/json")?;
    parse_iv_response(&body)
}

// ============================================================================
// Tests
// ============================================================================
