//! Cradle Insights - On-device statistics engine for infant care activity logs
//!
//! The engine turns a subject's logged sleep sessions, feeds and diaper changes
//! into period summaries through a deterministic pipeline: period resolution →
//! subject/range filtering → day bucketing → per-metric aggregation → trend
//! comparison → report encoding.
//!
//! ## Modules
//!
//! - **Engine**: `range`, `bucket`, `aggregate`, `stats` and `trend` compute
//!   summaries from records already in memory and never fail
//! - **Input**: `schema` validates and localizes exported activity logs
//! - **Output**: `pipeline` and `encoder` produce JSON reports; `ffi` exposes them over a C ABI

pub mod aggregate;
pub mod bucket;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod range;
pub mod schema;
pub mod source;
pub mod stats;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use encoder::{InsightsReport, ReportEncoder};
pub use error::InsightsError;
pub use pipeline::{
    activities_to_report, localized_activities_to_report, InsightsProcessor, PeriodComparison,
};
pub use source::{ActivitySource, InMemorySource, Settings, SettingsSource};
pub use stats::compute_stats;
pub use trend::{compare_stats, trend_for};

// Schema exports
pub use schema::{RawActivity, RawActivityAdapter, SCHEMA_VERSION};

pub use types::{
    ActivityRecord, DateRange, LocalTime, MetricName, PeriodSelector, StatsSummary, Trend,
    VolumeUnit,
};

/// Engine version embedded in all reports
pub const INSIGHTS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "cradle-insights";
