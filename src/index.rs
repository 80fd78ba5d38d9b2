/// Canonical index builder.
///
/// All sources are reconciled onto a complete, gap-free calendar of
/// timestamps. Building the index up front — rather than deriving it from
/// whatever timestamps the providers happened to return — means missing
/// observations show up as visible gaps instead of silently shortening the
/// table.

use chrono::NaiveDateTime;

use crate::model::{PipelineError, Resolution};

/// An ordered, contiguous, duplicate-free sequence of timestamps at a fixed
/// resolution, inclusive of both endpoints. Immutable once built.
#[derive(Debug, Clone)]
pub struct CanonicalIndex {
    resolution: Resolution,
    ticks: Vec<NaiveDateTime>,
}

impl CanonicalIndex {
    /// Builds the index spanning `[start, end]`.
    ///
    /// Returns `InvalidRange` if `start > end`. The result has exactly one
    /// tick per resolution unit; when the span is not a whole number of
    /// units the final partial unit is not emitted.
    pub fn build(
        start: NaiveDateTime,
        end: NaiveDateTime,
        resolution: Resolution,
    ) -> Result<CanonicalIndex, PipelineError> {
        if start > end {
            return Err(PipelineError::InvalidRange { start, end });
        }
        let tick = resolution.tick();
        let mut ticks = Vec::new();
        let mut current = start;
        while current <= end {
            ticks.push(current);
            current = current + tick;
        }
        Ok(CanonicalIndex { resolution, ticks })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn ticks(&self) -> &[NaiveDateTime] {
        &self.ticks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NaiveDateTime> {
        self.ticks.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
