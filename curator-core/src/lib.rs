//! Core engine for Curator
//!
//! Indexes the raw readings of a sensor dataset by coordinate and derives
//! the values used in calculations from them.
//!
//! Key pieces:
//! - [`sensor_values_list`]: ordered, duplicate-free lists of readings with
//!   grouping and interpolation for time-based data
//! - [`run_type`]: contiguous periods of instrument operating mode
//! - [`dataset_measurements`]: measurements grouped by variable and run type
//! - [`calculator`]: measurement values, calibrated against external
//!   standards where needed
//!
//! ```no_run
//! use curator_core::{
//!     CalculationContext, DatasetMeasurements, DefaultMeasurementValueCalculator,
//!     MeasurementLocator, MeasurementValueCalculator, RunTypeMeasurementLocator,
//! };
//! # fn run(
//! #     sensor_values: &curator_core::DatasetSensorValues,
//! #     calibrations: &impl curator_core::CalibrationProvider<Connection = ()>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//!
//! // Find the measurements, then calculate every variable's sensor types
//! let mut measurements = RunTypeMeasurementLocator::new().locate(sensor_values)?;
//!
//! let mut grouped = DatasetMeasurements::new();
//! for measurement in &measurements {
//!     grouped.add_measurement(measurement.clone())?;
//! }
//!
//! let context = CalculationContext {
//!     sensor_values,
//!     measurements: &grouped,
//!     calibrations,
//!     connection: &(),
//! };
//!
//! for variable in sensor_values.instrument().variables() {
//!     let sensor_types = [variable.core_sensor_type.clone()];
//!     let failures = DefaultMeasurementValueCalculator::new()
//!         .calculate_all(&context, &mut measurements, variable, &sensor_types);
//!     assert!(failures.is_empty());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod calculator;
pub mod calibration;
pub mod constants;
pub mod coordinate;
pub mod dataset_measurements;
pub mod dataset_sensor_values;
pub mod errors;
pub mod flag;
pub mod instrument;
pub mod locator;
pub mod measurement;
pub mod run_type;
pub mod sensor_value;
pub mod sensor_values_list;
pub mod time;

// Public API
pub use calculator::{
    CalculationContext, CalculationFailure, CalculatorResult, DefaultMeasurementValueCalculator,
    MeasurementValueCalculator,
};
pub use calibration::{CalibrationProvider, CalibrationResult, CalibrationSet};
pub use coordinate::{Basis, Coordinate, CoordinateKind, Direction, ProfilePosition};
pub use dataset_measurements::DatasetMeasurements;
pub use dataset_sensor_values::{DatasetSensorValues, SharedInstrument};
pub use errors::{
    CalculatorError, CalibrationError, CoordinateError, CoordinateResult, ListResult, LocatorError,
    RecordNotFound, RunTypePeriodsError, SensorValuesListError,
};
pub use flag::Flag;
pub use instrument::{
    DisplayFlagResolver, InstrumentDescriptor, RunTypeCategory, SensorType, SharedResolver,
    UserOverrideResolver, Variable,
};
pub use locator::{LocatorResult, MeasurementLocator, RunTypeMeasurementLocator};
pub use measurement::{Measurement, MeasurementValue};
pub use run_type::{RunTypePeriod, RunTypePeriods};
pub use sensor_value::{AutoQcResult, SensorValue};
pub use sensor_values_list::{
    make_sensor_values_list, MeasurementMode, SensorValuesList, SensorValuesListValue,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
