//! FFI bindings for Cradle Insights
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `cradle_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::DateTime;

use crate::error::InsightsError;
use crate::pipeline::{activities_to_report, localized_activities_to_report, InsightsProcessor};
use crate::schema::RawActivityAdapter;
use crate::source::InMemorySource;
use crate::types::{LocalTime, PeriodSelector, VolumeUnit};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn parse_now(now: &str) -> Result<LocalTime, InsightsError> {
    DateTime::parse_from_rfc3339(now).map_err(|_| InsightsError::InvalidTimestamp(now.to_string()))
}

/// A missing unit selects ounces
fn parse_unit(unit: Option<String>) -> Result<VolumeUnit, InsightsError> {
    match unit {
        Some(s) => s.parse(),
        None => Ok(VolumeUnit::default()),
    }
}

fn periods(main_days: u32, compare_days: u32) -> Result<(PeriodSelector, PeriodSelector), InsightsError> {
    Ok((
        PeriodSelector::try_from(main_days)?,
        PeriodSelector::try_from(compare_days)?,
    ))
}

fn stats_report(
    records_json: &str,
    subject_id: &str,
    main_days: u32,
    compare_days: u32,
    now: &str,
    unit: Option<String>,
    timezone: Option<String>,
) -> Result<String, InsightsError> {
    let (main, compare) = periods(main_days, compare_days)?;
    let now = parse_now(now)?;
    let display_unit = parse_unit(unit)?;
    match timezone {
        Some(tz) => localized_activities_to_report(records_json, subject_id, main, compare, now, display_unit, &tz),
        None => activities_to_report(records_json, subject_id, main, compare, now, display_unit),
    }
}

fn load_snapshot(
    processor: &mut InsightsProcessor,
    records_json: &str,
    subject_id: &str,
    now: &str,
    timezone: Option<String>,
) -> Result<usize, InsightsError> {
    let mut now = parse_now(now)?;
    let raw = RawActivityAdapter::parse_auto(records_json)?;
    let mut records = RawActivityAdapter::to_records(&raw)?;
    if let Some(tz) = timezone {
        records = RawActivityAdapter::localize(records, &tz)?;
        now = RawActivityAdapter::localize_instant(now, &tz)?;
    }
    processor.refresh(&InMemorySource::new(records), subject_id, now)
}

fn processor_report(
    processor: &InsightsProcessor,
    main_days: u32,
    compare_days: u32,
    now: &str,
) -> Result<String, InsightsError> {
    let (main, compare) = periods(main_days, compare_days)?;
    processor.report(main, compare, parse_now(now)?)
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a JSON insights report from an activity export.
///
/// # Safety
/// - `records_json`, `subject_id` and `now_rfc3339` must be valid null-terminated C strings.
/// - `unit` must be a valid null-terminated C string ("OZ" or "ML") or NULL for ounces.
/// - `timezone` must be a valid null-terminated IANA zone name (e.g. "America/Denver") or
///   NULL to classify by the offsets the timestamps carry.
/// - `main_days` and `compare_days` must each be 2, 7, 14 or 30.
/// - Returns a newly allocated string that must be freed with `cradle_free_string`.
/// - Returns NULL on error; call `cradle_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cradle_stats_report(
    records_json: *const c_char,
    subject_id: *const c_char,
    main_days: u32,
    compare_days: u32,
    now_rfc3339: *const c_char,
    unit: *const c_char,
    timezone: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let subject_str = match cstr_to_string(subject_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid subject_id string pointer");
            return ptr::null_mut();
        }
    };

    let now_str = match cstr_to_string(now_rfc3339) {
        Some(s) => s,
        None => {
            set_last_error("Invalid now string pointer");
            return ptr::null_mut();
        }
    };

    let unit_str = cstr_to_string(unit);
    let tz_str = cstr_to_string(timezone);

    match stats_report(&json_str, &subject_str, main_days, compare_days, &now_str, unit_str, tz_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an InsightsProcessor
pub struct InsightsProcessorHandle {
    processor: InsightsProcessor,
}

/// Create a new InsightsProcessor reporting volumes in `unit`.
///
/// # Safety
/// - `unit` must be a valid null-terminated C string or NULL for ounces.
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `cradle_processor_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn cradle_processor_new(unit: *const c_char) -> *mut InsightsProcessorHandle {
    clear_last_error();

    let display_unit = match parse_unit(cstr_to_string(unit)) {
        Ok(u) => u,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let handle = Box::new(InsightsProcessorHandle {
        processor: InsightsProcessor::with_display_unit(display_unit),
    });
    Box::into_raw(handle)
}

/// Free an InsightsProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `cradle_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cradle_processor_free(processor: *mut InsightsProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Replace the processor's snapshot with `subject_id`'s records from `records_json`.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `cradle_processor_new`.
/// - `records_json`, `subject_id` and `now_rfc3339` must be valid null-terminated C strings.
/// - `timezone` must be a valid null-terminated IANA zone name or NULL. When given, the
///   snapshot and `now` are re-expressed in that zone; pass the same zone's offset in later
///   `cradle_processor_report` calls.
/// - Returns the number of cached records, or -1 on error.
/// - On error the previous snapshot is kept; call `cradle_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn cradle_processor_load(
    processor: *mut InsightsProcessorHandle,
    records_json: *const c_char,
    subject_id: *const c_char,
    now_rfc3339: *const c_char,
    timezone: *const c_char,
) -> i64 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let (json_str, subject_str, now_str) = match (
        cstr_to_string(records_json),
        cstr_to_string(subject_id),
        cstr_to_string(now_rfc3339),
    ) {
        (Some(j), Some(s), Some(n)) => (j, s, n),
        _ => {
            set_last_error("Invalid string pointer");
            return -1;
        }
    };

    let tz_str = cstr_to_string(timezone);

    match load_snapshot(&mut handle.processor, &json_str, &subject_str, &now_str, tz_str) {
        Ok(count) => count as i64,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Compute a JSON report from the processor's snapshot.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `cradle_processor_new`.
/// - `now_rfc3339` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `cradle_free_string`.
/// - Returns NULL on error; call `cradle_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cradle_processor_report(
    processor: *mut InsightsProcessorHandle,
    main_days: u32,
    compare_days: u32,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let now_str = match cstr_to_string(now_rfc3339) {
        Some(s) => s,
        None => {
            set_last_error("Invalid now string pointer");
            return ptr::null_mut();
        }
    };

    match processor_report(&handle.processor, main_days, compare_days, &now_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a `cradle_*` function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a `cradle_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cradle_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `cradle_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn cradle_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn cradle_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
