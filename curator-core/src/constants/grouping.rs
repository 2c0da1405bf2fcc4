//! Grouping Constants
//!
//! Thresholds used to decide whether a sensor samples continuously or in
//! short periodic bursts, and to split raw values into groups.

/// Maximum gap between consecutive values in the same run (seconds).
///
/// Values further apart than this start a new group, and interpolation never
/// reaches further than this from the requested time.
pub const CONTINUOUS_MEASUREMENT_LIMIT_SECS: i64 = 300;

/// Largest group size still consistent with periodic sampling.
///
/// A list is only periodic if its mean group size is at or below this value.
pub const MAX_PERIODIC_GROUP_SIZE: usize = 25;

/// Number of groups larger than [`MAX_PERIODIC_GROUP_SIZE`] tolerated in a
/// periodic list.
///
/// Occasional long runs happen when an instrument is left on; more than this
/// many means the instrument is really running continuously.
pub const LARGE_GROUP_LIMIT: usize = 5;
