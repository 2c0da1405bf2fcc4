//! Locating measurements in a dataset
//!
//! For instruments that interleave measurements with calibration runs, each
//! output value of a variable's core sensor defines a measurement. The
//! measurement is tagged with the most recent run type recorded at or before
//! it.

use std::collections::BTreeSet;

use crate::coordinate::{self, Coordinate};
use crate::dataset_sensor_values::DatasetSensorValues;
use crate::errors::LocatorError;
use crate::instrument::RunTypeCategory;
use crate::measurement::Measurement;
use crate::sensor_values_list::SensorValuesList;

/// Result type for measurement location
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Finds the measurements in a dataset
pub trait MeasurementLocator {
    /// Measurements in coordinate order
    fn locate(&self, sensor_values: &DatasetSensorValues) -> LocatorResult<Vec<Measurement>>;
}

/// Locates measurements from the run type column
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTypeMeasurementLocator;

impl RunTypeMeasurementLocator {
    /// New locator
    pub fn new() -> Self {
        Self
    }
}

impl MeasurementLocator for RunTypeMeasurementLocator {
    fn locate(&self, sensor_values: &DatasetSensorValues) -> LocatorResult<Vec<Measurement>> {
        let instrument = sensor_values.instrument();
        if instrument.run_type_column().is_none() {
            return Err(LocatorError::NoRunTypeColumn);
        }

        let core_columns: BTreeSet<i64> = instrument
            .variables()
            .iter()
            .filter(|variable| variable.internal_calibrations)
            .flat_map(|variable| instrument.column_ids(&variable.core_sensor_type))
            .collect();

        if core_columns.is_empty() {
            log_debug!("Dataset {} has no calibrated variables", sensor_values.dataset_id());
            return Ok(Vec::new());
        }

        let core_values = sensor_values.sensor_values(core_columns, false)?;
        let run_types = sensor_values.run_types();

        let mut measurements = Vec::new();

        for coordinate in core_values.value_coordinates()? {
            let run_type = run_types
                .map(|list| run_type_at(list, coordinate))
                .transpose()?
                .flatten()
                .ok_or_else(|| LocatorError::NoRunType {
                    dataset_id: sensor_values.dataset_id(),
                    coordinate: coordinate.to_string(),
                })?;

            if instrument.run_type_category(run_type) == Some(RunTypeCategory::Ignored) {
                continue;
            }

            measurements.push(Measurement::with_run_type(*coordinate, run_type));
        }

        log_debug!(
            "Located {} measurements in dataset {}",
            measurements.len(),
            sensor_values.dataset_id()
        );

        Ok(measurements)
    }
}

/// The last non-empty run type recorded at or before `coordinate`
fn run_type_at<'a>(list: &'a dyn SensorValuesList, coordinate: &Coordinate) -> LocatorResult<Option<&'a str>> {
    let end = match coordinate::search(list.raw_coordinates(), coordinate)? {
        Ok(index) => index + 1,
        Err(index) => index,
    };

    Ok(list.raw_values()[..end]
        .iter()
        .rev()
        .find_map(|value| value.value().filter(|run_type| !run_type.is_empty())))
}
