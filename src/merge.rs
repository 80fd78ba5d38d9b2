/// Series merger.
///
/// Reconciles one or more normalized series tables onto a canonical index.
/// Combination is an explicit fold with set-if-absent cell semantics:
/// sources are supplied in priority order and an earlier source's value for
/// a (timestamp, column) cell is never overwritten by a later one. Naive
/// outer joins have different collision semantics, so the fold is spelled
/// out here rather than delegated.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::index::CanonicalIndex;
use crate::model::{Cell, Resolution};
use crate::table::SeriesTable;

// ---------------------------------------------------------------------------
// Fill policy
// ---------------------------------------------------------------------------

/// Which columns get forward-filled after merging. Off by default; the
/// hourly flow column is the only production user.
#[derive(Debug, Clone, Default)]
pub struct FillPolicy {
    forward_fill: Vec<String>,
}

impl FillPolicy {
    pub fn none() -> FillPolicy {
        FillPolicy::default()
    }

    pub fn forward(columns: &[&str]) -> FillPolicy {
        FillPolicy {
            forward_fill: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.forward_fill
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Folds `sources` onto the canonical index, first-writer-wins per cell.
///
/// The result has exactly one row per index tick. Source rows at off-index
/// timestamps do not contribute (aggregate sub-tick data with
/// `resample_mean` before merging). Cells no source populates stay empty
/// unless the fill policy forward-fills their column.
pub fn merge(index: &CanonicalIndex, sources: &[&SeriesTable], fill: &FillPolicy) -> SeriesTable {
    let mut merged = SeriesTable::new();
    for tick in index.iter() {
        merged.ensure_row(*tick);
    }

    let on_index: HashSet<NaiveDateTime> = index.iter().copied().collect();
    for source in sources {
        for column in source.columns() {
            for ts in source.timestamps().copied().collect::<Vec<_>>() {
                if !on_index.contains(&ts) {
                    continue;
                }
                if let Some(cell) = source.get(ts, column) {
                    merged.set_if_absent(ts, column, cell.clone());
                }
            }
        }
    }

    for column in fill.columns() {
        forward_fill(&mut merged, index.ticks(), column);
    }

    merged
}

/// Propagates the last known value of `column` forward through gaps, in
/// tick order. Ticks before the first observation stay empty — no backward
/// fill, ever.
pub fn forward_fill(table: &mut SeriesTable, ticks: &[NaiveDateTime], column: &str) {
    let mut last: Option<Cell> = None;
    for ts in ticks {
        match table.get(*ts, column) {
            Some(cell) => last = Some(cell.clone()),
            None => {
                if let Some(cell) = &last {
                    table.set(*ts, column, cell.clone());
                }
            }
        }
    }
}

/// Left join anchored on the primary table's index: every primary timestamp
/// is retained, secondary columns are appended where the timestamps match,
/// and unmatched secondary cells stay empty. On a column-name collision the
/// primary value wins.
pub fn left_join(primary: &SeriesTable, secondary: &SeriesTable) -> SeriesTable {
    let mut joined = primary.clone();
    let stamps: Vec<NaiveDateTime> = primary.timestamps().copied().collect();
    for column in secondary.columns() {
        for ts in &stamps {
            if let Some(cell) = secondary.get(*ts, column) {
                joined.set_if_absent(*ts, column, cell.clone());
            }
        }
    }
    joined
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Buckets a table to the given resolution and averages each numeric column
/// within each bucket. Text columns (qualifiers) are dropped — averaging
/// them is meaningless, and this mirrors how the granular flow series is
/// reduced to hourly and daily means.
pub fn resample_mean(table: &SeriesTable, resolution: Resolution) -> SeriesTable {
    let mut resampled = SeriesTable::new();
    let stamps: Vec<NaiveDateTime> = table.timestamps().copied().collect();
    for ts in &stamps {
        resampled.ensure_row(resolution.truncate(*ts));
    }

    for column in table.columns() {
        let mut sums: std::collections::BTreeMap<NaiveDateTime, (f64, u32)> =
            std::collections::BTreeMap::new();
        for ts in &stamps {
            if let Some(value) = table.get(*ts, column).and_then(Cell::as_number) {
                let entry = sums.entry(resolution.truncate(*ts)).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        for (bucket, (sum, count)) in sums {
            resampled.set(bucket, column, Cell::Number(sum / count as f64));
        }
    }

    resampled
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
