//! Adapter for converting exported activity logs into engine records
//!
//! Handles JSON array and NDJSON input, per-record validation reports, and
//! localization of timestamps into the subject's time zone.

use chrono_tz::Tz;
use tracing::debug;

use crate::error::InsightsError;
use crate::schema::raw_record::{RawActivity, ValidationError};
use crate::types::{ActivityRecord, LocalTime};

/// Adapter for converting raw activity exports to [`ActivityRecord`]s
pub struct RawActivityAdapter;

impl RawActivityAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<RawActivity>, InsightsError> {
        let records: Vec<RawActivity> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (one record per line, blank lines ignored)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawActivity>, InsightsError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawActivity>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(InsightsError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Parse either a JSON array or NDJSON, judged by the first non-blank character
    pub fn parse_auto(input: &str) -> Result<Vec<RawActivity>, InsightsError> {
        if input.trim_start().starts_with('[') {
            Self::parse_array(input)
        } else {
            Self::parse_ndjson(input)
        }
    }

    /// Convert raw records into engine records, failing on the first invalid one
    pub fn to_records(raw: &[RawActivity]) -> Result<Vec<ActivityRecord>, InsightsError> {
        let records = raw
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                r.to_record().map_err(|e| {
                    InsightsError::ParseError(format!(
                        "Invalid record {} (index {}): {}",
                        r.id.as_deref().unwrap_or("unknown"),
                        idx,
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "converted activity records");
        Ok(records)
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(raw: &[RawActivity]) -> Vec<ValidationResult> {
        raw.iter()
            .enumerate()
            .filter_map(|(idx, r)| {
                r.validate().err().map(|error| ValidationResult {
                    index: idx,
                    record_id: r.id.clone(),
                    error,
                })
            })
            .collect()
    }

    /// Re-express every timestamp in `timezone` (IANA name, e.g. "America/Denver").
    ///
    /// Instants are unchanged; only the attached offset moves, so hour-of-day
    /// and calendar-day classification follow the subject's local clock,
    /// daylight saving included.
    pub fn localize(
        records: Vec<ActivityRecord>,
        timezone: &str,
    ) -> Result<Vec<ActivityRecord>, InsightsError> {
        let tz = parse_timezone(timezone)?;
        Ok(records
            .into_iter()
            .map(|record| localize_record(record, &tz))
            .collect())
    }

    /// Re-express a single reference instant, such as `now`, in `timezone`
    pub fn localize_instant(time: LocalTime, timezone: &str) -> Result<LocalTime, InsightsError> {
        Ok(localize_time(time, &parse_timezone(timezone)?))
    }
}

fn parse_timezone(timezone: &str) -> Result<Tz, InsightsError> {
    timezone
        .parse()
        .map_err(|_| InsightsError::InvalidTimezone(timezone.to_string()))
}

fn localize_time(time: LocalTime, tz: &Tz) -> LocalTime {
    time.with_timezone(tz).fixed_offset()
}

fn localize_record(record: ActivityRecord, tz: &Tz) -> ActivityRecord {
    match record {
        ActivityRecord::Sleep(mut s) => {
            s.start_time = localize_time(s.start_time, tz);
            s.end_time = s.end_time.map(|t| localize_time(t, tz));
            ActivityRecord::Sleep(s)
        }
        ActivityRecord::Feed(mut f) => {
            f.time = localize_time(f.time, tz);
            ActivityRecord::Feed(f)
        }
        ActivityRecord::Diaper(mut d) => {
            d.time = localize_time(d.time, tz);
            ActivityRecord::Diaper(d)
        }
    }
}

/// A record that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub record_id: Option<String>,
    pub error: ValidationError,
}
