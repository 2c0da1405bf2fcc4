//! Calibration Constants

/// Number of external standards used for a calibration.
///
/// The standards whose concentrations are closest to the measured value are
/// chosen, up to this many.
pub const MAX_CALIBRATION_STANDARDS: usize = 3;

/// Fewer standards than this mark the calibrated value as bad.
pub const MIN_CALIBRATION_STANDARDS: usize = 3;
