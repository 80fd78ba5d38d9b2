/// Timestamp-indexed wide table.
///
/// `SeriesTable` is the uniform tidy representation every provider response
/// is normalized into, and also the shape of the final merged product. Rows
/// are keyed by timestamp (unique within one table, kept sorted), columns
/// are named from the observation prefix so provenance survives the merge.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use crate::model::{Cell, ObservationRecord};

/// Builds the qualifier column name for a value column prefix.
pub fn qualifier_column(prefix: &str) -> String {
    format!("{}_qualifier", prefix)
}

#[derive(Debug, Clone, Default)]
pub struct SeriesTable {
    /// Column names in first-seen order. Determines CSV column order.
    columns: Vec<String>,
    /// Rows indexed by timestamp for O(log n) lookup during merge. A row
    /// may be present with no cells — the canonical index materializes
    /// empty rows so gaps are visible in the output.
    rows: BTreeMap<NaiveDateTime, HashMap<String, Cell>>,
}

impl SeriesTable {
    pub fn new() -> SeriesTable {
        SeriesTable::default()
    }

    /// Builds a table from normalized records. The value lands in a column
    /// named by the record's prefix; a non-empty qualifier lands in
    /// `{prefix}_qualifier`. When the same (timestamp, column) cell is
    /// produced twice the first record wins, consistent with the merge
    /// semantics downstream.
    pub fn from_records(records: &[ObservationRecord]) -> SeriesTable {
        let mut table = SeriesTable::new();
        table.add_records(records);
        table
    }

    /// Folds more records into the table (used by the fetch loop, which
    /// accumulates one table across many windows).
    pub fn add_records(&mut self, records: &[ObservationRecord]) {
        for record in records {
            self.ensure_row(record.timestamp);
            if let Some(value) = record.value {
                self.set_if_absent(record.timestamp, &record.prefix, Cell::Number(value));
            }
            if !record.qualifier.is_empty() {
                self.set_if_absent(
                    record.timestamp,
                    &qualifier_column(&record.prefix),
                    Cell::Text(record.qualifier.clone()),
                );
            }
        }
    }

    /// Materializes an (empty) row for `ts` if none exists.
    pub fn ensure_row(&mut self, ts: NaiveDateTime) {
        self.rows.entry(ts).or_default();
    }

    /// Sets a cell only when it is not already populated. Returns whether
    /// the cell was written. Registers the column either way so column
    /// order is stable across sources.
    pub fn set_if_absent(&mut self, ts: NaiveDateTime, column: &str, cell: Cell) -> bool {
        self.register_column(column);
        let row = self.rows.entry(ts).or_default();
        if row.contains_key(column) {
            return false;
        }
        row.insert(column.to_string(), cell);
        true
    }

    /// Sets a cell unconditionally.
    pub fn set(&mut self, ts: NaiveDateTime, column: &str, cell: Cell) {
        self.register_column(column);
        self.rows.entry(ts).or_default().insert(column.to_string(), cell);
    }

    fn register_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn get(&self, ts: NaiveDateTime, column: &str) -> Option<&Cell> {
        self.rows.get(&ts).and_then(|row| row.get(column))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row timestamps in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.rows.keys()
    }

    pub fn row(&self, ts: NaiveDateTime) -> Option<&HashMap<String, Cell>> {
        self.rows.get(&ts)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count of populated cells in a column. Used by the runs for summary
    /// logging and by tests.
    pub fn populated(&self, column: &str) -> usize {
        self.rows.values().filter(|row| row.contains_key(column)).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn record(day: u32, value: Option<f64>, qualifier: &str, prefix: &str) -> ObservationRecord {
        ObservationRecord {
            timestamp: ts(2020, 1, day),
            value,
            qualifier: qualifier.to_string(),
            prefix: prefix.to_string(),
        }
    }

    #[test]
    fn test_from_records_builds_value_and_qualifier_columns() {
        let table = SeriesTable::from_records(&[
            record(1, Some(12.3), "A", "CFS"),
            record(2, Some(14.0), "P", "CFS"),
        ]);
        assert_eq!(table.columns(), &["CFS", "CFS_qualifier"]);
        assert_eq!(table.get(ts(2020, 1, 1), "CFS"), Some(&Cell::Number(12.3)));
        assert_eq!(
            table.get(ts(2020, 1, 2), "CFS_qualifier"),
            Some(&Cell::Text("P".to_string()))
        );
    }

    #[test]
    fn test_qualifier_column_only_materialized_when_present() {
        let table = SeriesTable::from_records(&[record(1, Some(1.0), "", "WTEQ")]);
        assert_eq!(table.columns(), &["WTEQ"]);
    }

    #[test]
    fn test_missing_value_leaves_cell_empty_but_keeps_row() {
        let table = SeriesTable::from_records(&[record(1, None, "A", "CFS")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(ts(2020, 1, 1), "CFS"), None);
        assert_eq!(
            table.get(ts(2020, 1, 1), "CFS_qualifier"),
            Some(&Cell::Text("A".to_string()))
        );
    }

    #[test]
    fn test_duplicate_timestamp_keeps_first_value() {
        let table = SeriesTable::from_records(&[
            record(1, Some(1.0), "", "CFS"),
            record(1, Some(2.0), "", "CFS"),
        ]);
        assert_eq!(table.get(ts(2020, 1, 1), "CFS"), Some(&Cell::Number(1.0)));
    }

    #[test]
    fn test_prefixes_do_not_collide() {
        let table = SeriesTable::from_records(&[
            record(1, Some(10.0), "", "WTEQ"),
            record(1, Some(25.0), "", "TOBS"),
        ]);
        assert_eq!(table.get(ts(2020, 1, 1), "WTEQ"), Some(&Cell::Number(10.0)));
        assert_eq!(table.get(ts(2020, 1, 1), "TOBS"), Some(&Cell::Number(25.0)));
        assert_eq!(table.len(), 1, "one row per timestamp regardless of element count");
    }

    #[test]
    fn test_timestamps_are_sorted() {
        let table = SeriesTable::from_records(&[
            record(3, Some(3.0), "", "CFS"),
            record(1, Some(1.0), "", "CFS"),
            record(2, Some(2.0), "", "CFS"),
        ]);
        let stamps: Vec<_> = table.timestamps().copied().collect();
        assert_eq!(stamps, vec![ts(2020, 1, 1), ts(2020, 1, 2), ts(2020, 1, 3)]);
    }
}
