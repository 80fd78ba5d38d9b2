/// USDA AWDB (Air and Water Database) REST client.
///
/// Retrieves SNOTEL station data — snow water equivalent, observed air
/// temperature — from the NRCS AWDB REST API. A response carries zero or
/// more tracked elements, each with its own value array and element code;
/// the element code becomes the column prefix so elements from one station
/// never collide in the widened table.
///
/// API documentation: https://wcc.sc.egov.usda.gov/awdbRestApi/swagger-ui/index.html

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::model::{ObservationRecord, PipelineError, Resolution, TimeWindow};

pub const AWDB_BASE_URL: &str = "https://wcc.sc.egov.usda.gov/awdbRestApi/services/v1/data";

/// AWDB begin/end dates are naive local time with a space separator.
const AWDB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Maps a canonical resolution onto the AWDB duration granularity code.
pub fn duration_code(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Daily => "DAILY",
        Resolution::Hourly => "HOURLY",
    }
}

// ============================================================================
// Response structures
// ============================================================================

/// Top-level entries, one per requested station triplet.
#[derive(Debug, Deserialize)]
struct StationData {
    #[serde(default)]
    data: Vec<ElementSeries>,
}

#[derive(Debug, Deserialize)]
struct ElementSeries {
    #[serde(rename = "stationElement")]
    station_element: StationElement,
    #[serde(default)]
    values: Vec<ElementValue>,
}

#[derive(Debug, Deserialize)]
struct StationElement {
    #[serde(rename = "elementCode")]
    element_code: String,
}

/// One observation row. Besides the measured `value` the API can attach a
/// QC flag, the period-of-record average for that tick, and the original
/// pre-correction value; all three are requested and carried through.
#[derive(Debug, Deserialize)]
struct ElementValue {
    date: Option<String>,
    value: Option<serde_json::Value>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    average: Option<serde_json::Value>,
    #[serde(rename = "origValue", default)]
    orig_value: Option<serde_json::Value>,
}

// ============================================================================
// URL construction
// ============================================================================

pub struct AwdbQuery<'a> {
    pub station_triplet: &'a str,
    pub elements: &'a [String],
    pub resolution: Resolution,
}

pub fn build_awdb_url(query: &AwdbQuery<'_>, window: &TimeWindow) -> String {
    format!(
        "{}?stationTriplets={}&elements={}&duration={}&beginDate={}&endDate={}\
         &periodRef=END&centralTendencyType=AVERAGE\
         &returnFlags=true&returnOriginalValues=true&returnSuspectData=true",
        AWDB_BASE_URL,
        query.station_triplet,
        query.elements.join(","),
        duration_code(query.resolution),
        window.start.format(AWDB_TIME_FORMAT),
        window.end.format(AWDB_TIME_FORMAT),
    )
}

// ============================================================================
// Normalization
// ============================================================================

/// Converts a station-data body into observation records, element by
/// element in response order. Each row yields a primary record under the
/// element code plus `{code}_average` / `{code}_origValue` records when
/// those fields are present, reproducing the per-element column families
/// the downstream model trains on. An empty station list yields zero
/// records — the station may simply have no data in the window.
pub fn parse_station_data_response(body: &str) -> Result<Vec<ObservationRecord>, PipelineError> {
    let decoded: Vec<StationData> = serde_json::from_str(body)
        .map_err(|e| PipelineError::SchemaMismatch(format!("AWDB response did not decode: {}", e)))?;

    let Some(station) = decoded.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for series in station.data {
        let code = series.station_element.element_code;
        for row in series.values {
            let raw_date = row.date.ok_or_else(|| {
                PipelineError::SchemaMismatch(format!(
                    "AWDB value row for element '{}' is missing required 'date'",
                    code
                ))
            })?;
            let timestamp = parse_awdb_timestamp(&raw_date)?;

            let value = match &row.value {
                Some(raw) => super::coerce_numeric("value", raw)?,
                None => None,
            };
            records.push(ObservationRecord {
                timestamp,
                value,
                qualifier: row.flag.unwrap_or_default(),
                prefix: code.clone(),
            });

            if let Some(raw) = &row.average {
                if let Some(average) = super::coerce_numeric("average", raw)? {
                    records.push(ObservationRecord {
                        timestamp,
                        value: Some(average),
                        qualifier: String::new(),
                        prefix: format!("{}_average", code),
                    });
                }
            }
            if let Some(raw) = &row.orig_value {
                if let Some(orig) = super::coerce_numeric("origValue", raw)? {
                    records.push(ObservationRecord {
                        timestamp,
                        value: Some(orig),
                        qualifier: String::new(),
                        prefix: format!("{}_origValue", code),
                    });
                }
            }
        }
    }
    Ok(records)
}

/// Hourly rows carry `YYYY-MM-DD HH:MM`; daily rows carry a bare date.
fn parse_awdb_timestamp(raw: &str) -> Result<NaiveDateTime, PipelineError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, AWDB_TIME_FORMAT) {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(NaiveDateTime::new(date, NaiveTime::MIN));
    }
    Err(PipelineError::SchemaMismatch(format!(
        "unparseable AWDB timestamp '{}'",
        raw
    )))
}

// ============================================================================
// Fetch
// ============================================================================

pub fn fetch_window(
    client: &reqwest::blocking::Client,
    query: &AwdbQuery<'_>,
    window: &TimeWindow,
) -> Result<Vec<ObservationRecord>, PipelineError> {
    let url = build_awdb_url(query, window);
    let body = super::http_get(client, &url, "application/json")?;
    parse_station_data_response(&body)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn query(elements: &[String], resolution: Resolution) -> AwdbQuery<'_> {
        AwdbQuery {
            station_triplet: "754:MT:SNTL",
            elements,
            resolution,
        }
    }

    #[test]
    fn test_build_awdb_url_serializes_all_query_params() {
        let elements = vec!["WTEQ".to_string(), "TOBS".to_string()];
        let window = TimeWindow {
            start: ts(1990, 1, 1, 0, 0),
            end: ts(1990, 12, 31, 23, 0),
        };
        let url = build_awdb_url(&query(&elements, Resolution::Hourly), &window);
        assert!(url.starts_with(AWDB_BASE_URL));
        assert!(url.contains("stationTriplets=754:MT:SNTL"));
        assert!(url.contains("elements=WTEQ,TOBS"));
        assert!(url.contains("duration=HOURLY"));
        assert!(url.contains("beginDate=1990-01-01 00:00"));
        assert!(url.contains("endDate=1990-12-31 23:00"));
        assert!(url.contains("periodRef=END"));
        assert!(url.contains("centralTendencyType=AVERAGE"));
        assert!(url.contains("returnFlags=true"));
        assert!(url.contains("returnOriginalValues=true"));
        assert!(url.contains("returnSuspectData=true"));
    }

    #[test]
    fn test_duration_codes() {
        assert_eq!(duration_code(Resolution::Daily), "DAILY");
        assert_eq!(duration_code(Resolution::Hourly), "HOURLY");
    }

    #[test]
    fn test_parse_prefixes_each_element_with_its_code() {
        let body = r#"[{"data": [
            {"stationElement": {"elementCode": "WTEQ"},
             "values": [{"date": "2020-01-01 06:00", "value": 10.4, "flag": "V"}]},
            {"stationElement": {"elementCode": "TOBS"},
             "values": [{"date": "2020-01-01 06:00", "value": 18.5}]}
        ]}]"#;
        let records = parse_station_data_response(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].prefix, "WTEQ");
        assert_eq!(records[0].value, Some(10.4));
        assert_eq!(records[0].qualifier, "V");
        assert_eq!(records[1].prefix, "TOBS");
        assert_eq!(records[1].timestamp, ts(2020, 1, 1, 6, 0));
    }

    #[test]
    fn test_parse_emits_average_and_orig_value_as_prefixed_records() {
        let body = r#"[{"data": [
            {"stationElement": {"elementCode": "WTEQ"},
             "values": [{"date": "2020-01-01", "value": 10.4, "average": 8.1, "origValue": 10.2}]}
        ]}]"#;
        let records = parse_station_data_response(body).unwrap();
        let prefixes: Vec<&str> = records.iter().map(|r| r.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["WTEQ", "WTEQ_average", "WTEQ_origValue"]);
        assert_eq!(records[1].value, Some(8.1));
        assert_eq!(records[2].value, Some(10.2));
    }

    #[test]
    fn test_parse_daily_rows_carry_bare_dates() {
        let body = r#"[{"data": [
            {"stationElement": {"elementCode": "WTEQ"},
             "values": [{"date": "2020-01-01", "value": 10.4}]}
        ]}]"#;
        let records = parse_station_data_response(body).unwrap();
        assert_eq!(records[0].timestamp, ts(2020, 1, 1, 0, 0));
    }

    #[test]
    fn test_parse_empty_station_list_is_zero_records() {
        assert!(parse_station_data_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_station_with_no_elements_is_zero_records() {
        assert!(parse_station_data_response(r#"[{"data": []}]"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_date_fails_whole_call() {
        let body = r#"[{"data": [
            {"stationElement": {"elementCode": "WTEQ"}, "values": [{"value": 10.4}]}
        ]}]"#;
        assert!(matches!(
            parse_station_data_response(body),
            Err(PipelineError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_parse_unparseable_date_names_the_offender() {
        let body = r#"[{"data": [
            {"stationElement": {"elementCode": "WTEQ"}, "values": [{"date": "01/02/2020", "value": 1}]}
        ]}]"#;
        match parse_station_data_response(body) {
            Err(PipelineError::SchemaMismatch(msg)) => {
                assert!(msg.contains("01/02/2020"), "message should identify the bad value: {}", msg)
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }
}
