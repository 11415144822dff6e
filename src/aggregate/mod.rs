//! Per-metric aggregators
//!
//! Each aggregator folds the filtered (and, where relevant, day-bucketed)
//! activities of one period into a small tally. Tallies expose the averages
//! that make up a [`crate::types::StatsSummary`]; each average uses its own
//! denominator.

pub mod diaper;
pub mod feeding;
pub mod nap;
pub mod night;
pub mod wake_window;

pub use diaper::{aggregate_diapers, DiaperStats};
pub use feeding::{aggregate_feedings, FeedingStats};
pub use nap::{aggregate_naps, NapStats};
pub use night::{aggregate_nights, NightSleepStats, NightTally};
pub use wake_window::{aggregate_wake_windows, WakeWindowStats};

/// First hour of the evening night window
pub const NIGHT_START_HOUR: u32 = 19;

/// First hour after the morning night window
pub const DAY_START_HOUR: u32 = 7;

/// Whether a local hour-of-day falls in [19, 24) or [0, 7)
pub fn is_night_hour(hour: u32) -> bool {
    hour >= NIGHT_START_HOUR || hour < DAY_START_HOUR
}

/// Whether a local hour-of-day falls in [7, 19)
pub fn is_day_hour(hour: u32) -> bool {
    !is_night_hour(hour)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::{
        ActivityRecord, AmountUnit, DiaperEvent, DiaperKind, FeedEvent, FeedKind, LocalTime,
        SleepSession,
    };
    use chrono::{FixedOffset, TimeZone};

    pub const SUBJECT: &str = "baby-1";

    /// Local time on June `day`, 2024, in a -07:00 offset
    pub fn at(day: u32, hour: u32, minute: u32) -> LocalTime {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, day, hour, minute, 0)
            .unwrap()
    }

    pub fn sleep(start: LocalTime, end: LocalTime) -> ActivityRecord {
        ActivityRecord::Sleep(SleepSession {
            subject_id: SUBJECT.to_string(),
            start_time: start,
            end_time: Some(end),
            duration_minutes: Some((end - start).num_minutes() as f64),
        })
    }

    pub fn open_sleep(start: LocalTime) -> ActivityRecord {
        ActivityRecord::Sleep(SleepSession {
            subject_id: SUBJECT.to_string(),
            start_time: start,
            end_time: None,
            duration_minutes: None,
        })
    }

    pub fn feed(
        time: LocalTime,
        kind: FeedKind,
        amount: Option<f64>,
        unit: Option<AmountUnit>,
    ) -> ActivityRecord {
        ActivityRecord::Feed(FeedEvent {
            subject_id: SUBJECT.to_string(),
            time,
            feed_kind: kind,
            amount,
            amount_unit: unit,
        })
    }

    pub fn diaper(time: LocalTime, kind: DiaperKind) -> ActivityRecord {
        ActivityRecord::Diaper(DiaperEvent {
            subject_id: SUBJECT.to_string(),
            time,
            diaper_kind: kind,
        })
    }
}
