//! Night sleep
//!
//! Assigns every completed night-associated sleep session to exactly one
//! logical night, keyed by calendar date, and accumulates minutes slept and
//! wakings per night.
//!
//! A session is night-associated when its start hour, or its end hour, falls
//! in [19, 24) or [0, 7). The night it belongs to is:
//!
//! - the start date, when it starts at or after 19:00;
//! - the day before the start date, when it starts before 07:00 (the tail of
//!   the previous evening's night);
//! - none, when it starts during the day and only ends at night. Such sessions
//!   are left out of night accounting.
//!
//! Wakings are attributed when a night key is first populated, using the
//! number of night-associated sessions in the day group being processed. A
//! night whose sessions span two day groups therefore takes its waking count
//! from whichever group reaches it first.

use chrono::{NaiveDate, Timelike};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::trace;

use crate::aggregate::{is_night_hour, DAY_START_HOUR, NIGHT_START_HOUR};
use crate::bucket::{sleeps_in, DayBuckets};
use crate::types::{minutes_between, round1, LocalTime, SleepSession};

/// Sessions of twelve hours or more are treated as data errors
pub const MAX_NIGHT_SESSION_MINUTES: f64 = 720.0;

/// Accumulated sleep for one night
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NightTally {
    /// Minutes slept across all sessions assigned to the night
    pub minutes: f64,
    /// Sessions assigned to the night
    pub sessions: u32,
    /// Wakings attributed when the night was first populated
    pub wakings: u32,
}

/// Night sleep tallies keyed by the night's calendar date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NightSleepStats {
    pub nights: BTreeMap<NaiveDate, NightTally>,
}

impl NightSleepStats {
    pub fn night_count(&self) -> usize {
        self.nights.len()
    }

    pub fn total_minutes(&self) -> f64 {
        self.nights.values().map(|n| n.minutes).sum()
    }

    pub fn total_wakings(&self) -> u32 {
        self.nights.values().map(|n| n.wakings).sum()
    }

    /// Mean minutes slept per observed night, 0 when there were none
    pub fn average_minutes(&self) -> f64 {
        if self.nights.is_empty() {
            return 0.0;
        }
        self.total_minutes() / self.nights.len() as f64
    }

    /// Mean wakings per observed night, rounded to one decimal
    pub fn average_wakings(&self) -> f64 {
        if self.nights.is_empty() {
            return 0.0;
        }
        round1(f64::from(self.total_wakings()) / self.nights.len() as f64)
    }
}

/// Whether a session starts or (once finished) ends during night hours
pub fn is_night_sleep(session: &SleepSession) -> bool {
    is_night_hour(session.start_time.hour())
        || session
            .end_time
            .map(|end| is_night_hour(end.hour()))
            .unwrap_or(false)
}

/// The night a session starting at `start` belongs to
pub fn night_key(start: LocalTime) -> Option<NaiveDate> {
    let hour = start.hour();
    if hour >= NIGHT_START_HOUR {
        Some(start.date_naive())
    } else if hour < DAY_START_HOUR {
        start.date_naive().pred_opt()
    } else {
        None
    }
}

/// Accumulate night sleep over day-bucketed activities
pub fn aggregate_nights(buckets: &DayBuckets<'_>) -> NightSleepStats {
    let mut nights: BTreeMap<NaiveDate, NightTally> = BTreeMap::new();

    for (day, group) in buckets.iter() {
        let night_sessions: Vec<&SleepSession> =
            sleeps_in(group).filter(|s| is_night_sleep(s)).collect();
        let group_wakings = (night_sessions.len() as u32).saturating_sub(1);

        for session in night_sessions {
            let Some(end) = session.end_time else {
                continue;
            };
            let Some(key) = night_key(session.start_time) else {
                trace!(%day, start = %session.start_time, "daytime start, no night assigned");
                continue;
            };

            let minutes = minutes_between(session.start_time, end);
            if minutes <= 0.0 || minutes >= MAX_NIGHT_SESSION_MINUTES {
                trace!(%day, minutes, "discarding night session");
                continue;
            }

            match nights.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(NightTally {
                        minutes,
                        sessions: 1,
                        wakings: group_wakings,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let tally = slot.get_mut();
                    tally.minutes += minutes;
                    tally.sessions += 1;
                }
            }
        }
    }

    NightSleepStats { nights }
}
