//! Time arithmetic for time-based coordinates
//!
//! Provides the handful of operations the lists need:
//! - Whole seconds between two timestamps (for continuity checks)
//! - The midpoint of a span (for group coordinates)
//! - Linear interpolation in elapsed time

use chrono::NaiveDateTime;

/// Whole seconds from `start` to `end` (negative if `end` is earlier)
pub fn seconds_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    end.signed_duration_since(start).num_seconds()
}

/// Time halfway between `start` and `end`
pub fn midpoint(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
    start + end.signed_duration_since(start) / 2
}

/// Linearly interpolate between `(t1, v1)` and `(t2, v2)` at `target`
///
/// Uses elapsed milliseconds, so sub-second timestamps are honoured. If the
/// two points share a timestamp the first value is returned.
pub fn interpolate(t1: NaiveDateTime, v1: f64, t2: NaiveDateTime, v2: f64, target: NaiveDateTime) -> f64 {
    let span = t2.signed_duration_since(t1).num_milliseconds();
    if span == 0 {
        return v1;
    }

    let elapsed = target.signed_duration_since(t1).num_milliseconds();
    v1 + (v2 - v1) * (elapsed as f64 / span as f64)
}
