//! Timestamp helpers shared by the session cache (`created_at`/age checks)
//! and the fetch envelope (`latency_ms`). Grounded on the teacher's
//! `riptide-utils::time` module, trimmed to the conversions actually used.

use chrono::{DateTime, Utc};

/// Current time as Unix seconds.
pub fn now_unix_secs() -> i64 {
    Utc::now().timestamp()
}

/// Current time as Unix milliseconds, used for `latency_ms` measurements.
pub fn now_unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Seconds elapsed between `earlier` and now. Negative if `earlier` is in
/// the future (clock skew); callers treat that as zero age.
pub fn age_secs(earlier_unix_secs: i64) -> i64 {
    (now_unix_secs() - earlier_unix_secs).max(0)
}

/// RFC3339 formatting for log lines and cache diagnostics.
pub fn to_rfc3339(unix_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Milliseconds between two millisecond timestamps, floored at zero.
pub fn elapsed_millis(start_unix_millis: i64, end_unix_millis: i64) -> u64 {
    (end_unix_millis - start_unix_millis).max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_secs_is_zero_for_future_timestamps() {
        let future = now_unix_secs() + 3600;
        assert_eq!(age_secs(future), 0);
    }

    #[test]
    fn age_secs_grows_for_past_timestamps() {
        let past = now_unix_secs() - 120;
        assert!(age_secs(past) >= 120);
    }

    #[test]
    fn elapsed_millis_never_negative() {
        assert_eq!(elapsed_millis(1000, 500), 0);
        assert_eq!(elapsed_millis(500, 1500), 1000);
    }

    #[test]
    fn to_rfc3339_round_trips_through_chrono() {
        let formatted = to_rfc3339(0);
        assert!(formatted.starts_with("1970-01-01T00:00:00"));
    }
}
