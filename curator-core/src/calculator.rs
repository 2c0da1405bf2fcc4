//! Measurement value calculation
//!
//! For each measurement a variable needs one value per sensor type. The
//! default calculator finds it as follows:
//!
//! 1. The variable's core sensor type defines the measurement instant, so
//!    its value is read at exactly the measurement's coordinate.
//! 2. Other sensor types are read with interpolation. No value at all gives
//!    NaN with no members.
//! 3. Sensor types with internal calibration are then corrected against the
//!    external standards run nearest in time (see [`crate::calibration`]).
//!
//! Failures for one measurement do not stop the rest of a dataset:
//! [`MeasurementValueCalculator::calculate_all`] logs and collects them.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::calibration::{predict_offset, CalibrationProvider};
use crate::constants::MIN_CALIBRATION_STANDARDS;
use crate::coordinate::{self, Coordinate};
use crate::dataset_measurements::DatasetMeasurements;
use crate::dataset_sensor_values::DatasetSensorValues;
use crate::errors::{CalculatorError, RecordNotFound};
use crate::flag::Flag;
use crate::instrument::{SensorType, Variable};
use crate::measurement::{Measurement, MeasurementValue};
use crate::sensor_value::SensorValue;
use crate::sensor_values_list::SensorValuesList;
use crate::time::interpolate;

/// Result type for calculations
pub type CalculatorResult<T> = Result<T, CalculatorError>;

/// Everything a calculation reads
pub struct CalculationContext<'a, P: CalibrationProvider> {
    /// Sensor values of the dataset
    pub sensor_values: &'a DatasetSensorValues,
    /// Measurements of the dataset, grouped by run type
    pub measurements: &'a DatasetMeasurements,
    /// Source of calibration sets
    pub calibrations: &'a P,
    /// Handle passed to the calibration source
    pub connection: &'a P::Connection,
}

/// A calculation that failed during [`MeasurementValueCalculator::calculate_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationFailure {
    /// Measurement being calculated
    pub coordinate: Coordinate,
    /// Sensor type being calculated
    pub sensor_type_id: i64,
    /// What went wrong
    pub error: CalculatorError,
}

/// Derives the value of a sensor type for a measurement
pub trait MeasurementValueCalculator<P: CalibrationProvider> {
    /// Value of `sensor_type` for `variable` at `measurement`
    fn calculate(
        &self,
        context: &CalculationContext<'_, P>,
        measurement: &Measurement,
        variable: &Variable,
        sensor_type: &SensorType,
    ) -> CalculatorResult<MeasurementValue>;

    /// Calculate every sensor type for every measurement, storing the
    /// results on the measurements. Failures are logged and returned; the
    /// remaining calculations carry on.
    fn calculate_all(
        &self,
        context: &CalculationContext<'_, P>,
        measurements: &mut [Measurement],
        variable: &Variable,
        sensor_types: &[SensorType],
    ) -> Vec<CalculationFailure> {
        let mut failures = Vec::new();

        for measurement in measurements.iter_mut() {
            for sensor_type in sensor_types {
                match self.calculate(context, measurement, variable, sensor_type) {
                    Ok(value) => measurement.set_measurement_value(variable.id, value),
                    Err(error) => {
                        log_warn!(
                            "Cannot calculate {} for {} at {}: {}",
                            sensor_type.name,
                            variable.name,
                            measurement.coordinate(),
                            error
                        );
                        failures.push(CalculationFailure {
                            coordinate: *measurement.coordinate(),
                            sensor_type_id: sensor_type.id,
                            error,
                        });
                    }
                }
            }
        }

        failures
    }
}

/// Direct lookup, interpolation and external standard calibration
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMeasurementValueCalculator;

#[derive(Clone, Copy)]
enum Side {
    Prior,
    Post,
}

impl DefaultMeasurementValueCalculator {
    /// New calculator
    pub fn new() -> Self {
        Self
    }

    fn calibrate<P: CalibrationProvider>(
        &self,
        context: &CalculationContext<'_, P>,
        measurement: &Measurement,
        variable: &Variable,
        sensor_type: &SensorType,
        list: &dyn SensorValuesList,
        value: &mut MeasurementValue,
    ) -> CalculatorResult<()> {
        let time = measurement
            .coordinate()
            .timestamp()
            .ok_or_else(|| RecordNotFound::new("Timestamp for measurement", measurement.coordinate()))?;

        let instrument_id = context.sensor_values.instrument().id();
        let calibrations = context
            .calibrations
            .calibrations_at(context.connection, instrument_id, time)?;

        let measured = value.calculated_value();
        let standards = calibrations.closest_standards(sensor_type, measured);

        if standards.len() < MIN_CALIBRATION_STANDARDS {
            value.add_qc(
                Flag::Bad,
                &format!("Fewer than {} standards used for calibration", MIN_CALIBRATION_STANDARDS),
            );
        }

        let mut offsets = Vec::with_capacity(standards.len());

        for (standard, concentration) in standards {
            let runs = context.measurements.measurements(variable.id, standard);
            let prior = calibration_reading(runs, measurement.coordinate(), list, Side::Prior)?;
            let post = calibration_reading(runs, measurement.coordinate(), list, Side::Post)?;

            for reading in prior.iter().chain(post.iter()) {
                if let Some(id) = reading.id() {
                    value.add_supporting_sensor_value(id);
                }
            }

            match offset_at(prior.as_deref(), post.as_deref(), concentration, time) {
                Some(offset) => offsets.push((concentration, offset)),
                None => {
                    log_warn!(
                        "No good {} readings for {} around {}",
                        standard,
                        sensor_type.name,
                        measurement.coordinate()
                    );
                }
            }
        }

        match predict_offset(&offsets, measured) {
            Some(offset) => value.set_calculated_value(measured - offset),
            None => value.add_qc(Flag::Bad, "No calibration readings available"),
        }

        Ok(())
    }
}

impl<P: CalibrationProvider> MeasurementValueCalculator<P> for DefaultMeasurementValueCalculator {
    fn calculate(
        &self,
        context: &CalculationContext<'_, P>,
        measurement: &Measurement,
        variable: &Variable,
        sensor_type: &SensorType,
    ) -> CalculatorResult<MeasurementValue> {
        let instrument = context.sensor_values.instrument();

        let column_id = instrument
            .column_ids(sensor_type)
            .first()
            .copied()
            .ok_or_else(|| RecordNotFound::new("Column for sensor type", &sensor_type.name))?;

        let mut result = MeasurementValue::new(sensor_type);

        let Some(list) = context.sensor_values.column_values(column_id) else {
            return Ok(result);
        };

        let is_core = variable.core_sensor_type.id == sensor_type.id;
        if let Some(found) = list.get_value(measurement.coordinate(), !is_core)? {
            result = MeasurementValue::from_list_value(sensor_type, &found);
        }

        if sensor_type.has_internal_calibration() && !result.calculated_value().is_nan() {
            self.calibrate(context, measurement, variable, sensor_type, list, &mut result)?;
        }

        Ok(result)
    }
}

/// The nearest calibration reading on one side of `target` whose raw value
/// exists and is user-flagged good
fn calibration_reading(
    runs: &[Arc<Measurement>],
    target: &Coordinate,
    list: &dyn SensorValuesList,
    side: Side,
) -> CalculatorResult<Option<Arc<SensorValue>>> {
    let position = coordinate::search_by(runs, target, |m| m.coordinate())?;

    let usable = |m: &Arc<Measurement>| {
        list.raw_sensor_value(m.coordinate())
            .filter(|v| v.user_flag().is_good() && !v.is_nan())
            .cloned()
    };

    Ok(match side {
        Side::Prior => {
            let end = match position {
                Ok(index) | Err(index) => index,
            };
            runs[..end].iter().rev().find_map(usable)
        }
        Side::Post => {
            let start = match position {
                Ok(index) => index + 1,
                Err(index) => index,
            };
            runs[start..].iter().find_map(usable)
        }
    })
}

/// Offset from `concentration` at `time`, interpolated between the readings
/// either side or taken from the only one available
fn offset_at(
    prior: Option<&SensorValue>,
    post: Option<&SensorValue>,
    concentration: f64,
    time: NaiveDateTime,
) -> Option<f64> {
    let offset = |reading: &SensorValue| reading.double_value() - concentration;

    match (prior, post) {
        (Some(prior), Some(post)) => {
            let prior_time = prior.coordinate().timestamp()?;
            let post_time = post.coordinate().timestamp()?;
            Some(interpolate(prior_time, offset(prior), post_time, offset(post), time))
        }
        (Some(only), None) | (None, Some(only)) => Some(offset(only)),
        (None, None) => None,
    }
}
