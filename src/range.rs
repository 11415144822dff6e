//! Period windowing
//!
//! Resolves a period selector into a concrete inclusive range of local calendar
//! days and narrows an activity collection to one subject inside that range.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime};
use tracing::trace;

use crate::types::{ActivityRecord, DateRange, LocalTime, PeriodSelector};

impl DateRange {
    /// Resolve `period` against the reference instant `now`.
    ///
    /// The range runs from 00:00:00.000 of `today - (N - 1)` days to
    /// 23:59:59.999 of today, where "today" is the local calendar day of `now`.
    /// Both ends carry `now`'s offset.
    pub fn resolve(period: PeriodSelector, now: LocalTime) -> DateRange {
        let offset = *now.offset();
        let today = now.date_naive();
        let first_day = today - Duration::days(i64::from(period.days()) - 1);

        let start = first_day.and_time(NaiveTime::MIN);
        let end = today.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1);

        DateRange {
            start: at_offset(start, offset),
            end: at_offset(end, offset),
        }
    }
}

/// Interpret a local wall-clock time in a fixed offset
fn at_offset(local: NaiveDateTime, offset: FixedOffset) -> LocalTime {
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// Select the records of `subject_id` whose defining timestamp falls on a
/// local calendar day inside `range`.
///
/// The collection is expected to already span the widest period in use; a
/// range reaching past the cached window silently undercounts.
pub fn filter_activities<'a>(
    activities: &'a [ActivityRecord],
    subject_id: &str,
    range: &DateRange,
) -> Vec<&'a ActivityRecord> {
    let selected: Vec<&ActivityRecord> = activities
        .iter()
        .filter(|a| a.subject_id() == subject_id)
        .filter(|a| range.contains(&a.defining_time()))
        .collect();

    trace!(
        subject_id,
        total = activities.len(),
        selected = selected.len(),
        "filtered activities"
    );

    selected
}
