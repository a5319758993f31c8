//! Date/time utilities for confvault
//!
//! Timestamps are kept as float seconds since the Unix epoch. These helpers
//! produce, render and convert them.

use chrono::{DateTime, Utc};

/// Current time as whole seconds since the epoch
pub fn now_seconds() -> f64 {
    Utc::now().timestamp() as f64
}

/// Render epoch seconds without a trailing `.0` for whole values
pub fn format_seconds(timestamp: f64) -> String {
    format!("{timestamp}")
}

/// Convert epoch seconds to a `DateTime<Utc>`
pub fn to_datetime(timestamp: f64) -> Option<DateTime<Utc>> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round() as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: Option<f64>) -> String {
    match timestamp.and_then(to_datetime) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}
