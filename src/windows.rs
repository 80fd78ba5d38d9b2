/// Windowing planner.
///
/// The provider APIs cap how much data a single request may cover, so the
/// overall `[start, now]` span is partitioned into chronologically ordered
/// sub-windows no larger than a configured maximum span. Windows are
/// produced lazily, one at a time, so the fetch loop can request-and-discard
/// without materializing the whole plan.
///
/// # Clock injection
/// `plan` takes `now` as an explicit argument rather than reading the system
/// clock, which keeps the plan deterministic in tests.

use chrono::{Duration, NaiveDateTime};

use crate::model::{PipelineError, Resolution, TimeWindow};

// ---------------------------------------------------------------------------
// Plan construction
// ---------------------------------------------------------------------------

/// Partitions `[start, now]` into contiguous, non-overlapping windows.
///
/// Guarantees, for any plan this returns:
///   - the first window starts at `start`
///   - the last window ends at `now` exactly
///   - every window's span is `<= max_span`
///   - consecutive windows are separated by exactly one resolution tick
///
/// Returns `InvalidRange` if `start > now`. When `start == now` the plan
/// holds exactly one degenerate window `{start, now}`.
pub fn plan(
    start: NaiveDateTime,
    now: NaiveDateTime,
    max_span: Duration,
    resolution: Resolution,
) -> Result<WindowPlan, PipelineError> {
    if start > now {
        return Err(PipelineError::InvalidRange { start, end: now });
    }
    Ok(WindowPlan {
        cursor: Some(start),
        now,
        max_span,
        tick: resolution.tick(),
    })
}

/// Lazy, finite sequence of `TimeWindow`s. Not restartable — the range is
/// deterministic from its inputs, so callers re-plan if they need it twice.
pub struct WindowPlan {
    cursor: Option<NaiveDateTime>,
    now: NaiveDateTime,
    max_span: Duration,
    tick: Duration,
}

impl Iterator for WindowPlan {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        let start = self.cursor?;
        let capped = start + self.max_span;
        let end = if capped < self.now { capped } else { self.now };
        self.cursor = if end >= self.now { None } else { Some(end + self.tick) };
        Some(TimeWindow { start, end })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
