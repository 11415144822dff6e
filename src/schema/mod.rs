//! Activity log input schema
//!
//! This module defines the record format exported by the logging app and the
//! validation layer that turns it into explicitly tagged engine records.
//! Anything uninterpretable is rejected here, before the engine sees it.

mod adapter;
mod raw_record;

pub use adapter::*;
pub use raw_record::*;

/// Input format identifier
pub const SCHEMA_VERSION: &str = "cradle.activity.v1";
