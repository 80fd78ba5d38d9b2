/// Provider ingest: fetching and normalization.
///
/// One submodule per remote series API. Each follows the same layout: a
/// base-URL constant, a `build_*_url` function, typed serde structs for the
/// provider's response schema, a `parse_*_response` normalizer, and a
/// `fetch_window` that performs exactly one network call.
///
/// Submodules:
/// - `usgs_daily` — USGS OGC API daily values (GeoJSON feature collection)
/// - `usgs_iv`    — USGS NWIS instantaneous values (nested time series)
/// - `awdb`       — USDA AWDB station data (per-element value arrays)

use crate::model::{ObservationRecord, PipelineError};

pub mod awdb;
pub mod usgs_daily;
pub mod usgs_iv;

// ---------------------------------------------------------------------------
// Schema dispatch
// ---------------------------------------------------------------------------

/// The closed set of provider response shapes this pipeline understands.
/// Callers state which schema they expect; the shape is never guessed from
/// the response structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    DailyFeatureCollection,
    HourlyNestedSeries,
    HourlyStationElements,
}

/// Normalizes a raw response body into tidy observation records according
/// to the stated schema. Input order is preserved. A record missing its
/// timestamp fails the whole call — partial normalization would leave the
/// downstream merge working from a silently truncated series.
pub fn normalize(body: &str, kind: SchemaKind) -> Result<Vec<ObservationRecord>, PipelineError> {
    match kind {
        SchemaKind::DailyFeatureCollection => usgs_daily::parse_daily_response(body),
        SchemaKind::HourlyNestedSeries => usgs_iv::parse_iv_response(body),
        SchemaKind::HourlyStationElements => awdb::parse_station_data_response(body),
    }
}

// ---------------------------------------------------------------------------
// Shared fetch plumbing
// ---------------------------------------------------------------------------

/// Issues one GET and returns the body on a 2xx status.
///
/// A non-success status becomes `Fetch { status, body }` so the caller can
/// decide to skip the window and continue; transport-level failures become
/// `Request`. Neither is raised as a panic anywhere in the pipeline.
pub(crate) fn http_get(
    client: &reqwest::blocking::Client,
    url: &str,
    accept: &str,
) -> Result<String, PipelineError> {
    let response = client
        .get(url)
        .header("Accept", accept)
        .send()
        .map_err(|e| PipelineError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| PipelineError::Request(e.to_string()))?;

    if !status.is_success() {
        return Err(PipelineError::Fetch {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Coerces a provider value field to `f64`. The providers are inconsistent
/// about encoding: the OGC API emits JSON numbers, NWIS emits numeric
/// strings. An empty or null cell is an absent value; a non-empty cell that
/// does not parse is an error, never a silent null.
pub(crate) fn coerce_numeric(
    field: &str,
    value: &serde_json::Value,
) -> Result<Option<f64>, PipelineError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| {
            PipelineError::SchemaMismatch(format!("field '{}' is not representable as f64", field))
        }),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<f64>().map(Some).map_err(|_| {
                PipelineError::SchemaMismatch(format!(
                    "field '{}' has non-numeric value '{}'",
                    field, trimmed
                ))
            })
        }
        other => Err(PipelineError::SchemaMismatch(format!(
            "field '{}' has unexpected type: {}",
            field, other
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
