//! Summary composition
//!
//! Runs the full pipeline for one period: resolve the range, filter the
//! subject's activities, bucket them by day, run every aggregator and assemble
//! the [`StatsSummary`].

use tracing::debug;

use crate::aggregate::{
    aggregate_diapers, aggregate_feedings, aggregate_naps, aggregate_nights,
    aggregate_wake_windows,
};
use crate::bucket::bucket_by_day;
use crate::range::filter_activities;
use crate::types::{ActivityRecord, DateRange, LocalTime, PeriodSelector, StatsSummary, VolumeUnit};

/// Compute the summary of `subject_id`'s activities over `period` ending today.
///
/// `activities` must already cover the widest period in use (30 days) and be
/// localized to the subject's calendar. Metrics without qualifying data are 0.
pub fn compute_stats(
    activities: &[ActivityRecord],
    subject_id: &str,
    period: PeriodSelector,
    now: LocalTime,
    display_unit: VolumeUnit,
) -> StatsSummary {
    let range = DateRange::resolve(period, now);
    let filtered = filter_activities(activities, subject_id, &range);
    let buckets = bucket_by_day(&filtered);
    let days = period.days();

    let wake_windows = aggregate_wake_windows(&filtered);
    let nights = aggregate_nights(&buckets);
    let naps = aggregate_naps(&buckets);
    let feedings = aggregate_feedings(&buckets, display_unit);
    let diapers = aggregate_diapers(&buckets);

    debug!(
        subject_id,
        period = %period,
        records = filtered.len(),
        days_with_data = buckets.len(),
        wake_windows = wake_windows.count,
        nights = nights.night_count(),
        naps = naps.count,
        feedings = feedings.feedings,
        diapers = diapers.changes,
        "computed period stats"
    );

    StatsSummary {
        avg_wake_window_minutes: wake_windows.average(),
        avg_nap_minutes: naps.average(),
        avg_night_sleep_minutes: nights.average_minutes(),
        avg_night_wakings: nights.average_wakings(),
        avg_feedings_per_day: feedings.per_day(days),
        avg_feed_amount: feedings.average_amount(),
        avg_diaper_changes_per_day: diapers.changes_per_day(days),
        avg_poops_per_day: diapers.poops_per_day(days),
    }
}
