/// Structured logging for the acquisition pipeline.
///
/// Provides context-rich logging with source/station identifiers and
/// severity levels. Console output stays terse for interactive runs; the
/// optional file sink gets full timestamped entries for unattended ones.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// USGS OGC daily values API.
    UsgsDaily,
    /// USGS NWIS instantaneous values API.
    UsgsIv,
    /// USDA AWDB SNOTEL API.
    Awdb,
    /// Merge/persist stages and run-level messages.
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::UsgsDaily => write!(f, "USGS-DV"),
            DataSource::UsgsIv => write!(f, "USGS-IV"),
            DataSource::Awdb => write!(f, "AWDB"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        let logger = Logger { min_level, log_file };
        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, source: DataSource, station: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();

        match level {
            LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, station_part, message),
            LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, station_part, message),
            LogLevel::Info => println!("   {}{}: {}", source, station_part, message),
            LogLevel::Debug => println!("   [DEBUG] {}{}: {}", source, station_part, message),
        }

        if let Some(ref path) = self.log_file {
            let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
            let entry = format!("{} {} {}{}: {}", timestamp, level, source, station_part, message);
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

/// Log a general informational message
pub fn info(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, source, station, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, source, station, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, source, station, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, source, station, message);
    }
}

// ---------------------------------------------------------------------------
// Fetch-loop helpers
// ---------------------------------------------------------------------------

/// Log a skipped window. Skips are warnings, not errors: a missing window
/// leaves a visible gap in the canonical index instead of aborting the run.
pub fn log_window_skipped(
    source: DataSource,
    station: &str,
    window: &str,
    err: &dyn std::error::Error,
) {
    warn(source, Some(station), &format!("skipping window {}: {}", window, err));
}

/// Log a window that fetched successfully but contained no observations.
pub fn log_window_empty(source: DataSource, station: &str, window: &str) {
    warn(source, Some(station), &format!("no records returned for {}", window));
}
