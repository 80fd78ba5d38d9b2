/// Acquisition and reconciliation pipeline for Gallatin basin streamflow
/// and snow-telemetry series.
///
/// Module layout, leaf-first:
/// - `model`    — shared domain types, constants, error taxonomy
/// - `stations` — registry of the monitored gauge and SNOTEL stations
/// - `config`   — explicit run configuration (TOML file over defaults)
/// - `logging`  — structured logger with per-source tags
/// - `windows`  — partitions the requested span into fetchable windows
/// - `ingest`   — per-provider fetch + normalization
/// - `table`    — timestamp-indexed wide table of normalized records
/// - `index`    — canonical gap-free calendar index
/// - `merge`    — first-writer-wins reconciliation, fills, joins, resampling
/// - `sink`     — CSV persistence
/// - `pipeline` — sequential rate-limited fetch orchestration

pub mod config;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod stations;
pub mod table;
pub mod windows;
