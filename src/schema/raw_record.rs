//! Activity log record format
//!
//! Records exported by the logging app identify their variant by which fields
//! are present rather than by an explicit discriminant:
//!
//! - sleep sessions carry `startTime` (and `endTime` once finished);
//! - feeds carry `time` and a feed `type` (`BOTTLE`, `BREAST`, `SOLIDS`) with an
//!   optional `amount` and `unitAbbr`;
//! - diaper changes carry `time` and a diaper `type` (`WET`, `DIRTY`, `BOTH`).
//!
//! An explicit `kind` tag, when present, takes precedence over inference.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{
    ActivityRecord, AmountUnit, DiaperEvent, DiaperKind, FeedEvent, FeedKind, LocalTime,
    SleepSession,
};

/// Explicit record discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sleep,
    Feed,
    Diaper,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Sleep => "sleep",
            RecordKind::Feed => "feed",
            RecordKind::Diaper => "diaper",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record as exported by the logging app
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    /// Record identifier, used only for reporting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baby_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<LocalTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<LocalTime>,
    /// Recorded sleep length in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<LocalTime>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_abbr: Option<String>,
}

impl RawActivity {
    /// Determine the record's variant
    pub fn classify(&self) -> Result<RecordKind, ValidationError> {
        if let Some(kind) = self.kind {
            return Ok(kind);
        }
        if self.start_time.is_some() {
            return Ok(RecordKind::Sleep);
        }
        match self.activity_type.as_deref() {
            Some(t) if parse_feed_kind(t).is_some() => Ok(RecordKind::Feed),
            Some(t) if parse_diaper_kind(t).is_some() => Ok(RecordKind::Diaper),
            Some(t) => Err(ValidationError::UnknownRecordKind(t.to_string())),
            None => Err(ValidationError::UnknownRecordKind(
                "no startTime or type".to_string(),
            )),
        }
    }

    /// Convert into an explicitly tagged activity record
    pub fn to_record(&self) -> Result<ActivityRecord, ValidationError> {
        let kind = self.classify()?;
        let subject_id = self
            .baby_id
            .clone()
            .ok_or(ValidationError::MissingField { kind, field: "babyId" })?;

        match kind {
            RecordKind::Sleep => {
                let start_time = self
                    .start_time
                    .ok_or(ValidationError::MissingField { kind, field: "startTime" })?;
                Ok(ActivityRecord::Sleep(SleepSession {
                    subject_id,
                    start_time,
                    end_time: self.end_time,
                    duration_minutes: self.duration,
                }))
            }
            RecordKind::Feed => {
                let time = self
                    .time
                    .ok_or(ValidationError::MissingField { kind, field: "time" })?;
                let raw_type = self
                    .activity_type
                    .as_deref()
                    .ok_or(ValidationError::MissingField { kind, field: "type" })?;
                let feed_kind = parse_feed_kind(raw_type).ok_or_else(|| {
                    ValidationError::UnknownType {
                        kind,
                        value: raw_type.to_string(),
                    }
                })?;
                let amount_unit = self
                    .unit_abbr
                    .as_deref()
                    .map(|u| {
                        parse_amount_unit(u).ok_or_else(|| ValidationError::UnknownUnit(u.to_string()))
                    })
                    .transpose()?;
                Ok(ActivityRecord::Feed(FeedEvent {
                    subject_id,
                    time,
                    feed_kind,
                    amount: self.amount,
                    amount_unit,
                }))
            }
            RecordKind::Diaper => {
                let time = self
                    .time
                    .ok_or(ValidationError::MissingField { kind, field: "time" })?;
                let raw_type = self
                    .activity_type
                    .as_deref()
                    .ok_or(ValidationError::MissingField { kind, field: "type" })?;
                let diaper_kind = parse_diaper_kind(raw_type).ok_or_else(|| {
                    ValidationError::UnknownType {
                        kind,
                        value: raw_type.to_string(),
                    }
                })?;
                Ok(ActivityRecord::Diaper(DiaperEvent {
                    subject_id,
                    time,
                    diaper_kind,
                }))
            }
        }
    }

    /// Validate the record without keeping the conversion
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_record().map(|_| ())
    }
}

fn parse_feed_kind(value: &str) -> Option<FeedKind> {
    match value.to_ascii_uppercase().as_str() {
        "BOTTLE" => Some(FeedKind::Bottle),
        "BREAST" => Some(FeedKind::Breast),
        "SOLIDS" => Some(FeedKind::Solids),
        _ => None,
    }
}

fn parse_diaper_kind(value: &str) -> Option<DiaperKind> {
    match value.to_ascii_uppercase().as_str() {
        "WET" => Some(DiaperKind::Wet),
        "DIRTY" => Some(DiaperKind::Dirty),
        "BOTH" => Some(DiaperKind::Both),
        _ => None,
    }
}

fn parse_amount_unit(value: &str) -> Option<AmountUnit> {
    match value.to_ascii_uppercase().as_str() {
        "OZ" => Some(AmountUnit::Oz),
        "ML" => Some(AmountUnit::Ml),
        "TBSP" => Some(AmountUnit::Tbsp),
        "G" => Some(AmountUnit::G),
        _ => None,
    }
}

/// Validation errors for raw activity records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot determine record kind: {0}")]
    UnknownRecordKind(String),

    #[error("{kind} record is missing {field}")]
    MissingField {
        kind: RecordKind,
        field: &'static str,
    },

    #[error("Unknown {kind} type: {value}")]
    UnknownType { kind: RecordKind, value: String },

    #[error("Unknown amount unit: {0}")]
    UnknownUnit(String),
}
