//! Wake windows
//!
//! A wake window is the gap between the end of one sleep and the start of the
//! next, measured across the whole period regardless of day boundaries.

use tracing::trace;

use crate::types::{minutes_between, ActivityRecord, SleepSession};

/// Gaps of a full day or more are treated as missing data
pub const MAX_WAKE_WINDOW_MINUTES: f64 = 1440.0;

/// Accumulated wake-window gaps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WakeWindowStats {
    pub total_minutes: f64,
    pub count: u32,
}

impl WakeWindowStats {
    /// Mean gap in minutes, 0 when no gap qualified
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_minutes / f64::from(self.count)
    }
}

/// Measure the gaps between consecutive completed sleeps.
///
/// Sessions are ordered by start time; gaps that are not positive or reach
/// [`MAX_WAKE_WINDOW_MINUTES`] are dropped.
pub fn aggregate_wake_windows(activities: &[&ActivityRecord]) -> WakeWindowStats {
    let mut sessions: Vec<&SleepSession> = activities
        .iter()
        .copied()
        .filter_map(ActivityRecord::as_sleep)
        .filter(|s| s.is_complete())
        .collect();
    sessions.sort_by_key(|s| s.start_time);

    let mut stats = WakeWindowStats::default();
    for pair in sessions.windows(2) {
        let Some(previous_end) = pair[0].end_time else {
            continue;
        };
        let gap = minutes_between(previous_end, pair[1].start_time);
        if gap <= 0.0 || gap >= MAX_WAKE_WINDOW_MINUTES {
            trace!(gap, "discarding wake window");
            continue;
        }
        stats.total_minutes += gap;
        stats.count += 1;
    }
    stats
}
