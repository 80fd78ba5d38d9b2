/// Core data types for the snow/streamflow acquisition pipeline.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no network logic — only types, constants, and the
/// error taxonomy.

use chrono::{Duration, NaiveDateTime, Timelike};

// ---------------------------------------------------------------------------
// Parameter and element codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// AWDB element code for snow water equivalent, in inches.
pub const ELEM_WATER_EQUIVALENT: &str = "WTEQ";

/// AWDB element code for observed air temperature, in degrees Fahrenheit.
pub const ELEM_AIR_TEMPERATURE: &str = "TOBS";

/// Column prefix under which streamflow observations are accumulated.
pub const PREFIX_FLOW: &str = "CFS";

// ---------------------------------------------------------------------------
// Time axis
// ---------------------------------------------------------------------------

/// Resolution of a canonical calendar index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Daily,
    Hourly,
}

impl Resolution {
    /// The smallest step of this resolution — one calendar day or one hour.
    /// Window plans and canonical indexes advance by exactly one tick.
    pub fn tick(&self) -> Duration {
        match self {
            Resolution::Daily => Duration::days(1),
            Resolution::Hourly => Duration::hours(1),
        }
    }

    /// Renders a timestamp the way the persisted tables expect it:
    /// bare dates at daily resolution, full datetimes at hourly.
    pub fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        match self {
            Resolution::Daily => ts.format("%Y-%m-%d").to_string(),
            Resolution::Hourly => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Truncates a timestamp down to the start of its containing tick.
    /// Used when bucketing sub-hourly readings for aggregation.
    pub fn truncate(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let hour_start = ts
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(ts);
        match self {
            Resolution::Hourly => hour_start,
            Resolution::Daily => hour_start.with_hour(0).unwrap_or(hour_start),
        }
    }
}

/// One fetchable sub-range of the overall requested span.
///
/// Both bounds are inclusive. A sequence of windows produced by the planner
/// is contiguous: each window starts one resolution tick after the previous
/// window ends, so no timestamp is requested twice and none is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Short human-readable form for log lines.
    pub fn describe(&self) -> String {
        format!(
            "{} -> {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single normalized observation from any provider.
///
/// Produced by the response normalizers and consumed by `SeriesTable`.
/// The `prefix` names the measured element (`CFS`, `WTEQ`, ...) and becomes
/// the value column name, so simultaneously tracked elements from one
/// provider never collide when widened into a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub timestamp: NaiveDateTime,
    /// Measured value; `None` when the provider reported an empty cell.
    pub value: Option<f64>,
    /// Provenance/approval flag ("A" = approved, "P" = provisional, ...).
    /// Empty string when the provider attached no qualifier.
    pub qualifier: String,
    pub prefix: String,
}

/// One cell of a wide table: a coerced numeric value or a carried-through
/// text field such as a qualifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Renders the cell for CSV output.
    pub fn render(&self) -> String {
        match self {
            Cell::Number(v) => format!("{}", v),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while planning, fetching, normalizing, merging,
/// or persisting series data.
#[derive(Debug)]
pub enum PipelineError {
    /// The requested range is inverted (start after end / now).
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Non-2xx HTTP response from a provider. Contained per-window: the
    /// orchestrating loop logs it and continues with the next window.
    Fetch { status: u16, body: String },
    /// The request never produced a response (connection refused, timeout).
    /// Treated exactly like `Fetch` by the orchestrating loop.
    Request(String),
    /// The response decoded, but its shape does not match the expected
    /// provider schema. Fatal: downstream merging assumes uniform shape.
    SchemaMismatch(String),
    /// The configuration file exists but could not be parsed.
    Config(String),
    /// Persistence failure.
    Io(std::io::Error),
}

impl PipelineError {
    /// Whether this error must abort the whole run. Fetch-layer failures
    /// are contained per-window (missing windows leave gaps in the
    /// canonical index); everything else propagates to the top level.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::Fetch { .. } | PipelineError::Request(_))
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::InvalidRange { start, end } => {
                write!(f, "invalid range: start {} is after end {}", start, end)
            }
            PipelineError::Fetch { status, body } => {
                let preview: String = body.chars().take(200).collect();
                write!(f, "HTTP error {}: {}", status, preview)
            }
            PipelineError::Request(msg) => write!(f, "request failed: {}", msg),
            PipelineError::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            PipelineError::Config(msg) => write!(f, "config error: {}", msg),
            PipelineError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
