//! Date and time utilities

use chrono::Utc;

/// Milliseconds since the unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
