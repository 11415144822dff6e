//! Daytime naps

use chrono::Timelike;
use tracing::trace;

use crate::aggregate::is_day_hour;
use crate::bucket::{sleeps_in, DayBuckets};

/// Naps of six hours or more are treated as data errors
pub const MAX_NAP_MINUTES: f64 = 360.0;

/// Accumulated nap time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NapStats {
    pub total_minutes: f64,
    pub count: u32,
}

impl NapStats {
    /// Mean nap length in minutes, 0 when no nap qualified
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_minutes / f64::from(self.count)
    }
}

/// Accumulate completed sleeps that start between 07:00 and 19:00.
pub fn aggregate_naps(buckets: &DayBuckets<'_>) -> NapStats {
    let mut stats = NapStats::default();

    for (day, group) in buckets.iter() {
        for session in sleeps_in(group).filter(|s| is_day_hour(s.start_time.hour())) {
            let Some(minutes) = session.elapsed_minutes() else {
                continue;
            };
            if minutes <= 0.0 || minutes >= MAX_NAP_MINUTES {
                trace!(%day, minutes, "discarding nap");
                continue;
            }
            stats.total_minutes += minutes;
            stats.count += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{at, open_sleep, sleep};
    use crate::bucket::bucket_by_day;
    use crate::types::ActivityRecord;

    fn run(records: &[ActivityRecord]) -> NapStats {
        let refs: Vec<&ActivityRecord> = records.iter().collect();
        aggregate_naps(&bucket_by_day(&refs))
    }

    #[test]
    fn test_average_nap() {
        let stats = run(&[
            sleep(at(5, 9, 0), at(5, 10, 0)),
            sleep(at(5, 13, 0), at(5, 15, 0)),
            sleep(at(6, 10, 0), at(6, 10, 30)),
        ]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average(), 70.0);
    }

    #[test]
    fn test_six_hour_boundary() {
        let excluded = run(&[sleep(at(5, 8, 0), at(5, 14, 0))]);
        assert_eq!(excluded.count, 0);

        let included = run(&[sleep(at(5, 8, 0), at(5, 13, 59))]);
        assert_eq!(included.count, 1);
        assert_eq!(included.average(), 359.0);
    }

    #[test]
    fn test_night_starts_are_not_naps() {
        let stats = run(&[
            sleep(at(5, 23, 30), at(6, 0, 10)),
            sleep(at(6, 6, 50), at(6, 7, 40)),
        ]);
        assert_eq!(stats, NapStats::default());
    }

    #[test]
    fn test_evening_overrun_still_counts_as_nap() {
        let stats = run(&[sleep(at(5, 18, 0), at(5, 19, 30))]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.average(), 90.0);
    }

    #[test]
    fn test_in_progress_nap_skipped() {
        let stats = run(&[open_sleep(at(5, 12, 0))]);
        assert_eq!(stats.average(), 0.0);
    }
}
