/// Persistence sink.
///
/// Writes a series table to a delimited file: the canonical timestamp as
/// the first column, one column per tracked value/qualifier, headers
/// included. The destination is overwritten unconditionally — a run's
/// artifacts fully replace the previous run's.

use std::path::Path;

use crate::model::{PipelineError, Resolution};
use crate::table::SeriesTable;

/// Writes `table` to `path` as CSV. Empty cells render as empty fields, so
/// gaps in the canonical index stay visible to downstream consumers.
pub fn write_table(
    table: &SeriesTable,
    resolution: Resolution,
    path: &Path,
) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push("date".to_string());
    header.extend(table.columns().iter().cloned());
    writer.write_record(&header).map_err(csv_error)?;

    for ts in table.timestamps() {
        let mut row = Vec::with_capacity(header.len());
        row.push(resolution.format_timestamp(ts));
        for column in table.columns() {
            row.push(table.get(*ts, column).map(|c| c.render()).unwrap_or_default());
        }
        writer.write_record(&row).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_error(err: csv::Error) -> PipelineError {
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => PipelineError::Io(io_err),
        other => PipelineError::Io(std::io::Error::other(format!("csv: {:?}", other))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn ts(d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("snowflow_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_write_emits_header_and_gap_cells() {
        let mut table = SeriesTable::new();
        table.set(ts(1), "CFS", Cell::Number(12.3));
        table.set(ts(1), "CFS_qualifier", Cell::Text("A".to_string()));
        table.set(ts(2), "CFS", Cell::Number(14.0));
        table.ensure_row(ts(3));

        let path = scratch_path("daily.csv");
        write_table(&table, Resolution::Daily, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "date,CFS,CFS_qualifier");
        assert_eq!(lines[1], "2020-01-01,12.3,A");
        assert_eq!(lines[2], "2020-01-02,14,");
        assert_eq!(lines[3], "2020-01-03,,", "empty rows keep their place in the calendar");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_overwrites_previous_artifact() {
        let path = scratch_path("overwrite.csv");

        let mut first = SeriesTable::new();
        first.set(ts(1), "CFS", Cell::Number(1.0));
        first.set(ts(2), "CFS", Cell::Number(2.0));
        write_table(&first, Resolution::Daily, &path).unwrap();

        let mut second = SeriesTable::new();
        second.set(ts(5), "WTEQ", Cell::Number(9.0));
        write_table(&second, Resolution::Daily, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("CFS"), "old table must be fully replaced");
        assert_eq!(written.lines().count(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_hourly_uses_full_timestamps() {
        let mut table = SeriesTable::new();
        let t = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(13, 0, 0).unwrap();
        table.set(t, "CFS", Cell::Number(1.5));

        let path = scratch_path("hourly.csv");
        write_table(&table, Resolution::Hourly, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("2020-01-01 13:00:00,1.5"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_creates_missing_parent_directory() {
        let dir = scratch_path("nested_dir");
        let path = dir.join("table.csv");
        let mut table = SeriesTable::new();
        table.set(ts(1), "CFS", Cell::Number(1.0));

        write_table(&table, Resolution::Daily, &path).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
