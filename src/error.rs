//! Error types for Cradle Insights

use thiserror::Error;

/// Errors raised by the input, collaborator and encoding layers.
///
/// The aggregation engine itself never fails: anomalous records are excluded
/// from the relevant accumulator instead.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("Failed to parse activity payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unsupported period: {0} days (expected 2, 7, 14 or 30)")]
    InvalidPeriod(u32),

    #[error("Invalid record: {0}")]
    Validation(#[from] crate::schema::ValidationError),

    #[error("Activity fetch failed: {0}")]
    FetchError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
