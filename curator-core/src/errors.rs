//! Error Types for the Curation Engine
//!
//! ## Error Categories
//!
//! Errors fall into four families, one per layer of the engine:
//!
//! ### Invariant Violations
//! - `CoordinateError`: comparing coordinates of different bases, stamping a
//!   database identity twice, invalid dataset identities.
//! - `SensorValuesListError::DuplicateCoordinate` and friends: a list would
//!   stop being sorted and duplicate-free.
//! - `RunTypePeriodsError`: out-of-order or post-finish additions.
//!
//! These are programming errors. They fail the enclosing call immediately and
//! should not be retried.
//!
//! ### Lookup Failures
//! - `RecordNotFound`: a column has no sensor type, or a value that should
//!   exist does not. Callers usually abort the current dataset and record a
//!   message for the user rather than stopping the whole batch.
//!
//! ### Derivation Failures
//! - `CalculatorError`: a measurement value could not be derived. This is the
//!   only error that processing is expected to survive: the failing
//!   measurement is logged and the rest of the dataset carries on.
//!
//! ### Algorithm Failures
//! - `SensorValuesListError::Algorithm`: something went wrong while grouping
//!   or interpolating. The original cause is always kept as the error source.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use curator_core::{Coordinate, CoordinateError};
//! use chrono::NaiveDate;
//!
//! let time = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let mut coordinate = Coordinate::time(1, time).unwrap();
//! coordinate.set_id(10).unwrap();
//!
//! match coordinate.set_id(11) {
//!     Err(CoordinateError::IdAlreadySet { existing }) => assert_eq!(existing, 10),
//!     other => panic!("unexpected result {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

use crate::coordinate::Basis;

/// Result type for coordinate operations
pub type CoordinateResult<T> = Result<T, CoordinateError>;

/// Result type for sensor value list operations
pub type ListResult<T> = Result<T, SensorValuesListError>;

/// Errors raised by coordinate construction and comparison
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// Two coordinates with different bases were compared
    #[error("Cannot compare a {left} coordinate with a {right} coordinate")]
    IncompatibleTypes {
        /// Basis of the left-hand coordinate
        left: Basis,
        /// Basis of the right-hand coordinate
        right: Basis,
    },

    /// Database identity can only be stamped once
    #[error("Coordinate already has a database id ({existing})")]
    IdAlreadySet {
        /// The identity already held by the coordinate
        existing: i64,
    },

    /// Dataset identities must be positive
    #[error("Invalid dataset id {0}")]
    InvalidDatasetId(i64),

    /// Profile direction flags are 'A' (ascending) or 'D' (descending)
    #[error("Invalid profile direction '{0}'")]
    InvalidDirection(char),
}

/// A record that should exist could not be found
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} not found: {key}")]
pub struct RecordNotFound {
    /// The kind of record (e.g. "Sensor type for column")
    pub kind: &'static str,
    /// The key that was looked up
    pub key: String,
}

impl RecordNotFound {
    /// Build a not-found error for the given record kind and key
    pub fn new(kind: &'static str, key: impl ToString) -> Self {
        Self {
            kind,
            key: key.to_string(),
        }
    }
}

/// Errors from sensor value lists
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorValuesListError {
    /// The value's column is not one of the list's columns
    #[error("Invalid column ID {column_id}")]
    InvalidColumn {
        /// Column of the rejected value
        column_id: i64,
    },

    /// A member already exists at this coordinate
    #[error("Cannot add two SensorValues with the same coordinate ({coordinate})")]
    DuplicateCoordinate {
        /// Rendered coordinate of the clash
        coordinate: String,
    },

    /// The value's coordinate basis differs from the existing members
    #[error("Cannot add SensorValues with different coordinate types")]
    IncompatibleCoordinateType,

    /// Columns given to a list map to different sensor types
    #[error("All column IDs must be for the same SensorType")]
    MixedSensorTypes,

    /// A list needs at least one column
    #[error("A sensor values list requires at least one column")]
    NoColumns,

    /// String grouping requested on a list without string values
    #[error("Cannot use string values to define groups: list contains no string values")]
    NoStringValues,

    /// A group contained no value with a usable flag
    #[error("No valid flags in sensor values")]
    NoValidFlags,

    /// Construction or lookup failed
    #[error(transparent)]
    RecordNotFound(#[from] RecordNotFound),

    /// Failure while grouping or interpolating values
    #[error("Error while building list values")]
    Algorithm {
        /// The underlying failure
        #[source]
        source: CoordinateError,
    },
}

impl From<CoordinateError> for SensorValuesListError {
    fn from(source: CoordinateError) -> Self {
        Self::Algorithm { source }
    }
}

/// Errors from building run type periods
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunTypePeriodsError {
    /// `finish()` has already been called
    #[error("Cannot add run types after the periods have been finished")]
    Finished,

    /// Coordinates must be added in increasing order
    #[error("Run type coordinate {coordinate} is not after the last period end")]
    OutOfOrder {
        /// Rendered coordinate that was rejected
        coordinate: String,
    },

    /// Coordinates could not be compared
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

/// Errors from locating measurements in a dataset
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocatorError {
    /// A measurement precedes the first run type in the dataset
    #[error("No run type available in dataset {dataset_id} at coordinate {coordinate}")]
    NoRunType {
        /// Dataset being processed
        dataset_id: i64,
        /// Rendered coordinate of the measurement
        coordinate: String,
    },

    /// The run type column has not been configured
    #[error("Instrument has no run type column")]
    NoRunTypeColumn,

    /// Sensor values could not be read
    #[error("Error reading sensor values")]
    SensorValues(#[from] SensorValuesListError),

    /// Coordinates could not be compared
    #[error("Error comparing coordinates")]
    Coordinate(#[from] CoordinateError),
}

/// A calibration lookup failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No calibration set is effective at the requested time
    #[error("No calibrations available for instrument {instrument_id} at {time}")]
    NoCalibrations {
        /// Instrument queried
        instrument_id: i64,
        /// Requested time, rendered
        time: String,
    },

    /// The calibration source could not be read
    #[error("Calibration lookup failed: {0}")]
    Lookup(String),
}

/// Errors from deriving measurement values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    /// Sensor values could not be read or interpolated
    #[error("Error getting sensor value details")]
    SensorValues(#[from] SensorValuesListError),

    /// The sensor type has no column or value
    #[error("Error getting sensor value details")]
    RecordNotFound(#[from] RecordNotFound),

    /// Calibration data was missing or malformed
    #[error("Error while calculating calibrated value")]
    Calibration(#[from] CalibrationError),

    /// Coordinates could not be compared
    #[error("Error while calculating calibrated value")]
    Coordinate(#[from] CoordinateError),
}
