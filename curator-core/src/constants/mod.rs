//! Constants for Curator Core
//!
//! Numeric thresholds used by the sensor value lists and the measurement
//! value calculator. Every value is defined once here with a note on what
//! it controls.
//!
//! ## Organization
//!
//! - **Grouping**: continuity threshold and periodic group heuristics
//! - **Calibration**: external standard selection limits
//! - **Measurements**: special variable keys

/// Sampling continuity and group classification thresholds.
pub mod grouping;

/// External standard calibration limits.
pub mod calibration;

/// Keys used in measurement maps.
pub mod measurements;

pub use calibration::{MAX_CALIBRATION_STANDARDS, MIN_CALIBRATION_STANDARDS};
pub use grouping::{CONTINUOUS_MEASUREMENT_LIMIT_SECS, LARGE_GROUP_LIMIT, MAX_PERIODIC_GROUP_SIZE};
pub use measurements::RUN_TYPE_DEFINES_VARIABLE;
