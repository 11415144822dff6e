//! Report encoding
//!
//! This module encodes a period comparison into the JSON report consumed by
//! the display layer. Every report carries producer metadata so payloads can
//! be traced back to the engine build that computed them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::InsightsError;
use crate::pipeline::PeriodComparison;
use crate::types::{DateRange, LocalTime, MetricName, PeriodSelector, StatsSummary, Trend};
use crate::{INSIGHTS_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Full insights report for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub subject_id: String,
    /// RFC 3339 timestamp of the `now` the report was computed against
    pub computed_at: String,
    pub main: PeriodReport,
    pub compare: PeriodReport,
    pub trends: BTreeMap<MetricName, Trend>,
    pub quality: ReportQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Summary of one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period_days: PeriodSelector,
    pub start: String,
    pub end: String,
    pub stats: StatsSummary,
    /// True when no metric had qualifying data
    pub empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuality {
    /// True when both periods are empty
    pub empty: bool,
    /// Records in the snapshot the report was computed from
    pub activity_count: usize,
}

/// Encoder producing [`InsightsReport`]s
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a comparison into a report
    pub fn encode(
        &self,
        subject_id: &str,
        comparison: &PeriodComparison,
        now: LocalTime,
        activity_count: usize,
    ) -> InsightsReport {
        let main = period_report(comparison.main_period, &comparison.main_range, comparison.main);
        let compare = period_report(
            comparison.compare_period,
            &comparison.compare_range,
            comparison.compare,
        );

        InsightsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: INSIGHTS_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            subject_id: subject_id.to_string(),
            computed_at: now.to_rfc3339(),
            quality: ReportQuality {
                empty: main.empty && compare.empty,
                activity_count,
            },
            main,
            compare,
            trends: comparison.trends.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        subject_id: &str,
        comparison: &PeriodComparison,
        now: LocalTime,
        activity_count: usize,
    ) -> Result<String, InsightsError> {
        let report = self.encode(subject_id, comparison, now, activity_count);
        serde_json::to_string_pretty(&report)
            .map_err(|e| InsightsError::EncodingError(e.to_string()))
    }
}

fn period_report(period: PeriodSelector, range: &DateRange, stats: StatsSummary) -> PeriodReport {
    PeriodReport {
        period_days: period,
        start: range.start.to_rfc3339(),
        end: range.end.to_rfc3339(),
        stats,
        empty: stats.is_empty(),
    }
}
