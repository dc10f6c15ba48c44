//! Utility functions and helpers.

pub mod http;
pub mod text;

use chrono::Utc;

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Current Unix time in milliseconds.
pub fn unix_now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
