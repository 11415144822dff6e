//! Core types for the Cradle Insights engine
//!
//! This module defines the activity records consumed by the engine, the period
//! selectors and ranges used to window them, and the summaries it produces.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InsightsError;

/// An absolute instant carrying the subject's local UTC offset.
///
/// Ordering and subtraction use the instant; hour-of-day and calendar-day
/// classification use the local wall clock.
pub type LocalTime = DateTime<FixedOffset>;

/// Kind of feeding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedKind {
    Bottle,
    Breast,
    Solids,
}

/// Unit attached to a recorded feed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AmountUnit {
    Oz,
    Ml,
    Tbsp,
    G,
}

impl AmountUnit {
    /// The volume unit this amount unit corresponds to, if it measures liquid volume
    pub fn as_volume(&self) -> Option<VolumeUnit> {
        match self {
            AmountUnit::Oz => Some(VolumeUnit::Oz),
            AmountUnit::Ml => Some(VolumeUnit::Ml),
            AmountUnit::Tbsp | AmountUnit::G => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountUnit::Oz => "OZ",
            AmountUnit::Ml => "ML",
            AmountUnit::Tbsp => "TBSP",
            AmountUnit::G => "G",
        }
    }
}

/// Display unit for bottle volumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolumeUnit {
    #[default]
    Oz,
    Ml,
}

impl VolumeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeUnit::Oz => "OZ",
            VolumeUnit::Ml => "ML",
        }
    }
}

impl std::str::FromStr for VolumeUnit {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OZ" => Ok(VolumeUnit::Oz),
            "ML" => Ok(VolumeUnit::Ml),
            other => Err(InsightsError::ParseError(format!(
                "Unknown volume unit '{other}' (expected OZ or ML)"
            ))),
        }
    }
}

/// Diaper contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiaperKind {
    Wet,
    Dirty,
    Both,
}

impl DiaperKind {
    /// Whether the change contained solid waste
    pub fn is_poop(&self) -> bool {
        matches!(self, DiaperKind::Dirty | DiaperKind::Both)
    }
}

/// A sleep session. `end_time` is absent while the session is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub subject_id: String,
    pub start_time: LocalTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<LocalTime>,
    /// Duration as recorded by the logging app (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

impl SleepSession {
    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }

    /// Elapsed minutes between start and end, for completed sessions
    pub fn elapsed_minutes(&self) -> Option<f64> {
        self.end_time.map(|end| minutes_between(self.start_time, end))
    }
}

/// A feeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub subject_id: String,
    pub time: LocalTime,
    pub feed_kind: FeedKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_unit: Option<AmountUnit>,
}

/// A diaper change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperEvent {
    pub subject_id: String,
    pub time: LocalTime,
    pub diaper_kind: DiaperKind,
}

/// One timestamped activity for a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityRecord {
    Sleep(SleepSession),
    Feed(FeedEvent),
    Diaper(DiaperEvent),
}

impl ActivityRecord {
    pub fn subject_id(&self) -> &str {
        match self {
            ActivityRecord::Sleep(s) => &s.subject_id,
            ActivityRecord::Feed(f) => &f.subject_id,
            ActivityRecord::Diaper(d) => &d.subject_id,
        }
    }

    /// The timestamp that places this record in time: start for sleep, event time otherwise
    pub fn defining_time(&self) -> LocalTime {
        match self {
            ActivityRecord::Sleep(s) => s.start_time,
            ActivityRecord::Feed(f) => f.time,
            ActivityRecord::Diaper(d) => d.time,
        }
    }

    pub fn as_sleep(&self) -> Option<&SleepSession> {
        match self {
            ActivityRecord::Sleep(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_feed(&self) -> Option<&FeedEvent> {
        match self {
            ActivityRecord::Feed(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_diaper(&self) -> Option<&DiaperEvent> {
        match self {
            ActivityRecord::Diaper(d) => Some(d),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ActivityRecord::Sleep(_) => "sleep",
            ActivityRecord::Feed(_) => "feed",
            ActivityRecord::Diaper(_) => "diaper",
        }
    }
}

/// Rolling lookback length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PeriodSelector {
    TwoDays,
    SevenDays,
    FourteenDays,
    ThirtyDays,
}

impl PeriodSelector {
    pub const ALL: [PeriodSelector; 4] = [
        PeriodSelector::TwoDays,
        PeriodSelector::SevenDays,
        PeriodSelector::FourteenDays,
        PeriodSelector::ThirtyDays,
    ];

    /// Widest supported lookback; the activity cache must cover at least this much.
    pub const WIDEST: PeriodSelector = PeriodSelector::ThirtyDays;

    pub fn days(&self) -> u32 {
        match self {
            PeriodSelector::TwoDays => 2,
            PeriodSelector::SevenDays => 7,
            PeriodSelector::FourteenDays => 14,
            PeriodSelector::ThirtyDays => 30,
        }
    }
}

impl TryFrom<u32> for PeriodSelector {
    type Error = InsightsError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            2 => Ok(PeriodSelector::TwoDays),
            7 => Ok(PeriodSelector::SevenDays),
            14 => Ok(PeriodSelector::FourteenDays),
            30 => Ok(PeriodSelector::ThirtyDays),
            other => Err(InsightsError::InvalidPeriod(other)),
        }
    }
}

impl From<PeriodSelector> for u32 {
    fn from(period: PeriodSelector) -> Self {
        period.days()
    }
}

impl fmt::Display for PeriodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

/// Inclusive range of local calendar days covered by a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: LocalTime,
    pub end: LocalTime,
}

impl DateRange {
    /// True when the timestamp's local calendar day falls inside the range.
    ///
    /// Days are compared on the offset each timestamp carries, so a record
    /// logged before a DST change still counts on the day its owner saw.
    pub fn contains(&self, instant: &LocalTime) -> bool {
        let day = instant.date_naive();
        day >= self.start.date_naive() && day <= self.end.date_naive()
    }
}

/// Comparative summary statistics for one subject over one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Mean gap between consecutive sleeps (minutes)
    pub avg_wake_window_minutes: f64,
    /// Mean daytime nap length (minutes)
    pub avg_nap_minutes: f64,
    /// Mean total sleep per observed night (minutes)
    pub avg_night_sleep_minutes: f64,
    /// Mean wakings per observed night
    pub avg_night_wakings: f64,
    /// Feedings per nominal period day
    pub avg_feedings_per_day: f64,
    /// Mean bottle volume in the display unit
    pub avg_feed_amount: f64,
    /// Diaper changes per nominal period day
    pub avg_diaper_changes_per_day: f64,
    /// Dirty or mixed diapers per nominal period day
    pub avg_poops_per_day: f64,
}

impl StatsSummary {
    /// True when no metric had qualifying data
    pub fn is_empty(&self) -> bool {
        MetricName::ALL.iter().all(|m| self.value(*m) == 0.0)
    }

    pub fn value(&self, metric: MetricName) -> f64 {
        match metric {
            MetricName::WakeWindow => self.avg_wake_window_minutes,
            MetricName::Nap => self.avg_nap_minutes,
            MetricName::NightSleep => self.avg_night_sleep_minutes,
            MetricName::NightWakings => self.avg_night_wakings,
            MetricName::FeedingsPerDay => self.avg_feedings_per_day,
            MetricName::FeedAmount => self.avg_feed_amount,
            MetricName::DiaperChangesPerDay => self.avg_diaper_changes_per_day,
            MetricName::PoopsPerDay => self.avg_poops_per_day,
        }
    }
}

/// Summary metrics that can be compared across periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    WakeWindow,
    Nap,
    NightSleep,
    NightWakings,
    FeedingsPerDay,
    FeedAmount,
    DiaperChangesPerDay,
    PoopsPerDay,
}

impl MetricName {
    pub const ALL: [MetricName; 8] = [
        MetricName::WakeWindow,
        MetricName::Nap,
        MetricName::NightSleep,
        MetricName::NightWakings,
        MetricName::FeedingsPerDay,
        MetricName::FeedAmount,
        MetricName::DiaperChangesPerDay,
        MetricName::PoopsPerDay,
    ];

    /// Which direction of change counts as an improvement
    pub fn direction(&self) -> MetricDirection {
        match self {
            MetricName::WakeWindow
            | MetricName::Nap
            | MetricName::NightSleep
            | MetricName::FeedAmount => MetricDirection::HigherIsBetter,
            MetricName::NightWakings => MetricDirection::LowerIsBetter,
            MetricName::FeedingsPerDay
            | MetricName::DiaperChangesPerDay
            | MetricName::PoopsPerDay => MetricDirection::Undirected,
        }
    }
}

/// Direction semantics of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    HigherIsBetter,
    LowerIsBetter,
    Undirected,
}

/// Qualifier for a metric moving between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

/// Minutes between two instants, fractional
pub fn minutes_between(from: LocalTime, to: LocalTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
