//! Pipeline orchestration
//!
//! This module provides the public API for Cradle Insights.
//! It orchestrates the full pipeline from an exported activity log to the
//! JSON report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::encoder::ReportEncoder;
use crate::error::InsightsError;
use crate::schema::RawActivityAdapter;
use crate::source::ActivitySource;
use crate::stats::compute_stats;
use crate::trend::compare_stats;
use crate::types::{
    ActivityRecord, DateRange, LocalTime, MetricName, PeriodSelector, StatsSummary, Trend,
    VolumeUnit,
};

/// Convert an exported activity log into a JSON insights report.
///
/// # Arguments
/// * `raw_json` - JSON array or NDJSON of activity records
/// * `subject_id` - Subject the report is for
/// * `main` - Period being looked at
/// * `compare` - Period it is compared against
/// * `now` - Reference time; periods end on its calendar day
/// * `display_unit` - Unit feed volumes are reported in
///
/// # Example
/// ```ignore
/// let report = activities_to_report(
///     export_json,
///     "baby-1",
///     PeriodSelector::SevenDays,
///     PeriodSelector::FourteenDays,
///     now,
///     VolumeUnit::Oz,
/// )?;
/// ```
pub fn activities_to_report(
    raw_json: &str,
    subject_id: &str,
    main: PeriodSelector,
    compare: PeriodSelector,
    now: LocalTime,
    display_unit: VolumeUnit,
) -> Result<String, InsightsError> {
    let raw = RawActivityAdapter::parse_auto(raw_json)?;
    let activities = RawActivityAdapter::to_records(&raw)?;

    let comparison = compare_periods(&activities, subject_id, main, compare, now, display_unit);
    ReportEncoder::new().encode_to_json(subject_id, &comparison, now, activities.len())
}

/// Like [`activities_to_report`], but every record timestamp and `now` are
/// first re-expressed in the IANA zone `timezone`.
pub fn localized_activities_to_report(
    raw_json: &str,
    subject_id: &str,
    main: PeriodSelector,
    compare: PeriodSelector,
    now: LocalTime,
    display_unit: VolumeUnit,
    timezone: &str,
) -> Result<String, InsightsError> {
    let raw = RawActivityAdapter::parse_auto(raw_json)?;
    let activities = RawActivityAdapter::localize(RawActivityAdapter::to_records(&raw)?, timezone)?;
    let now = RawActivityAdapter::localize_instant(now, timezone)?;
    debug!(timezone, count = activities.len(), %now, "localized activity log");

    let comparison = compare_periods(&activities, subject_id, main, compare, now, display_unit);
    ReportEncoder::new().encode_to_json(subject_id, &comparison, now, activities.len())
}

/// Stats for two periods and how each metric moved between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub main_period: PeriodSelector,
    pub compare_period: PeriodSelector,
    pub main_range: DateRange,
    pub compare_range: DateRange,
    pub main: StatsSummary,
    pub compare: StatsSummary,
    pub trends: BTreeMap<MetricName, Trend>,
}

fn compare_periods(
    activities: &[ActivityRecord],
    subject_id: &str,
    main: PeriodSelector,
    compare: PeriodSelector,
    now: LocalTime,
    display_unit: VolumeUnit,
) -> PeriodComparison {
    let main_stats = compute_stats(activities, subject_id, main, now, display_unit);
    let compare_stats_summary = compute_stats(activities, subject_id, compare, now, display_unit);

    PeriodComparison {
        main_period: main,
        compare_period: compare,
        main_range: DateRange::resolve(main, now),
        compare_range: DateRange::resolve(compare, now),
        trends: compare_stats(&main_stats, &compare_stats_summary),
        main: main_stats,
        compare: compare_stats_summary,
    }
}

/// Stateful processor holding one subject's activity snapshot.
///
/// Use this when the same snapshot serves several period selections. Every
/// query recomputes from the cached records.
pub struct InsightsProcessor {
    subject_id: Option<String>,
    activities: Vec<ActivityRecord>,
    display_unit: VolumeUnit,
    encoder: ReportEncoder,
}

impl Default for InsightsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightsProcessor {
    /// Create a new processor reporting volumes in ounces
    pub fn new() -> Self {
        Self::with_display_unit(VolumeUnit::default())
    }

    /// Create a processor with a specific display unit
    pub fn with_display_unit(display_unit: VolumeUnit) -> Self {
        Self {
            subject_id: None,
            activities: Vec::new(),
            display_unit,
            encoder: ReportEncoder::new(),
        }
    }

    /// Subject the cached snapshot belongs to
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn display_unit(&self) -> VolumeUnit {
        self.display_unit
    }

    pub fn set_display_unit(&mut self, display_unit: VolumeUnit) {
        self.display_unit = display_unit;
    }

    /// Replace the cached snapshot with `subject_id`'s recent records.
    ///
    /// Call on subject change or cache refresh. If the fetch fails the
    /// previous snapshot is kept.
    pub fn refresh(
        &mut self,
        source: &dyn ActivitySource,
        subject_id: &str,
        now: LocalTime,
    ) -> Result<usize, InsightsError> {
        let activities = source.fetch_recent(subject_id, now)?;
        debug!(subject_id, count = activities.len(), "refreshed activity snapshot");

        self.subject_id = Some(subject_id.to_string());
        self.activities = activities;
        Ok(self.activities.len())
    }

    /// Stats for one period over the cached snapshot
    pub fn stats(&self, period: PeriodSelector, now: LocalTime) -> StatsSummary {
        compute_stats(
            &self.activities,
            self.subject_id.as_deref().unwrap_or_default(),
            period,
            now,
            self.display_unit,
        )
    }

    /// Stats for both periods plus per-metric trends
    pub fn compare(
        &self,
        main: PeriodSelector,
        compare: PeriodSelector,
        now: LocalTime,
    ) -> PeriodComparison {
        compare_periods(
            &self.activities,
            self.subject_id.as_deref().unwrap_or_default(),
            main,
            compare,
            now,
            self.display_unit,
        )
    }

    /// JSON report for both periods
    pub fn report(
        &self,
        main: PeriodSelector,
        compare: PeriodSelector,
        now: LocalTime,
    ) -> Result<String, InsightsError> {
        let subject_id = self
            .subject_id
            .as_deref()
            .ok_or_else(|| InsightsError::MissingField("subject_id".to_string()))?;
        let comparison = self.compare(main, compare, now);
        self.encoder
            .encode_to_json(subject_id, &comparison, now, self.activities.len())
    }
}
