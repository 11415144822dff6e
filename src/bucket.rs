//! Calendar-day bucketing
//!
//! Groups activities by the local calendar day of their defining timestamp.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::types::{ActivityRecord, SleepSession};

/// Activities grouped by local calendar day, in chronological day order
#[derive(Debug, Default)]
pub struct DayBuckets<'a> {
    days: BTreeMap<NaiveDate, Vec<&'a ActivityRecord>>,
}

impl<'a> DayBuckets<'a> {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterate day groups in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &[&'a ActivityRecord])> {
        self.days.iter().map(|(day, group)| (day, group.as_slice()))
    }
}

/// Group `activities` by the calendar day of their defining timestamp.
///
/// Records keep their input order within each day.
pub fn bucket_by_day<'a>(activities: &[&'a ActivityRecord]) -> DayBuckets<'a> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a ActivityRecord>> = BTreeMap::new();
    for activity in activities {
        days.entry(activity.defining_time().date_naive())
            .or_default()
            .push(*activity);
    }
    DayBuckets { days }
}

/// Sleep sessions within one day group
pub fn sleeps_in<'a, 'b>(
    group: &'b [&'a ActivityRecord],
) -> impl Iterator<Item = &'a SleepSession> + 'b {
    group.iter().copied().filter_map(ActivityRecord::as_sleep)
}
