//! Measurements and their derived values
//!
//! A [`Measurement`] is one sample point for which variables are calculated.
//! It records the run type in force for each variable and, once calculated,
//! the [`MeasurementValue`] of each sensor type the variable needs.

use core::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::RUN_TYPE_DEFINES_VARIABLE;
use crate::coordinate::Coordinate;
use crate::errors::CoordinateResult;
use crate::flag::Flag;
use crate::instrument::SensorType;
use crate::sensor_values_list::SensorValuesListValue;

/// The value of one sensor type used for one measurement
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementValue {
    sensor_type_id: i64,
    calculated_value: f64,
    member_count: usize,
    sensor_value_ids: BTreeSet<i64>,
    supporting_sensor_value_ids: BTreeSet<i64>,
    flag: Flag,
    qc_messages: Vec<String>,
}

impl MeasurementValue {
    /// Empty value: NaN with no members, flagged good
    pub fn new(sensor_type: &SensorType) -> Self {
        Self {
            sensor_type_id: sensor_type.id,
            calculated_value: f64::NAN,
            member_count: 0,
            sensor_value_ids: BTreeSet::new(),
            supporting_sensor_value_ids: BTreeSet::new(),
            flag: Flag::Good,
            qc_messages: Vec::new(),
        }
    }

    /// Value taken from a list output, with its sources, flag and message
    pub fn from_list_value(sensor_type: &SensorType, value: &SensorValuesListValue) -> Self {
        let mut result = Self::new(sensor_type);
        result.calculated_value = value.double_value();
        result.member_count = 1;
        result.sensor_value_ids.extend(value.source_ids());
        result.add_qc(value.flag(), value.message());
        result
    }

    /// Sensor type the value belongs to
    pub fn sensor_type_id(&self) -> i64 {
        self.sensor_type_id
    }

    /// The value to use in calculations
    pub fn calculated_value(&self) -> f64 {
        self.calculated_value
    }

    /// Replace the calculated value
    pub fn set_calculated_value(&mut self, value: f64) {
        self.calculated_value = value;
    }

    /// Number of list values combined into this value
    pub fn member_count(&self) -> usize {
        self.member_count
    }

    /// Sensor values the value was read from
    pub fn sensor_value_ids(&self) -> &BTreeSet<i64> {
        &self.sensor_value_ids
    }

    /// Sensor values used to adjust the value (e.g. calibration readings)
    pub fn supporting_sensor_value_ids(&self) -> &BTreeSet<i64> {
        &self.supporting_sensor_value_ids
    }

    /// Record a supporting sensor value
    pub fn add_supporting_sensor_value(&mut self, id: i64) {
        self.supporting_sensor_value_ids.insert(id);
    }

    /// Combined QC flag
    pub fn flag(&self) -> Flag {
        self.flag
    }

    /// QC messages in the order they were added
    pub fn qc_messages(&self) -> &[String] {
        &self.qc_messages
    }

    /// Add a QC result. The flag only ever gets worse; duplicate and empty
    /// messages are dropped.
    pub fn add_qc(&mut self, flag: Flag, message: &str) {
        self.flag = Flag::most_significant(self.flag, flag);
        if !message.is_empty() && !self.qc_messages.iter().any(|m| m == message) {
            self.qc_messages.push(message.to_string());
        }
    }
}

/// One sample point of a dataset
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    id: Option<i64>,
    coordinate: Coordinate,
    run_types: BTreeMap<i64, String>,
    measurement_values: BTreeMap<i64, BTreeMap<i64, MeasurementValue>>,
}

impl Measurement {
    /// New measurement with run types keyed by variable id
    pub fn new(coordinate: Coordinate, run_types: BTreeMap<i64, String>) -> Self {
        Self {
            id: None,
            coordinate,
            run_types,
            measurement_values: BTreeMap::new(),
        }
    }

    /// New measurement whose run type applies to every variable
    pub fn with_run_type(coordinate: Coordinate, run_type: &str) -> Self {
        let mut run_types = BTreeMap::new();
        run_types.insert(RUN_TYPE_DEFINES_VARIABLE, run_type.to_string());
        Self::new(coordinate, run_types)
    }

    /// Builder variant of [`set_id`](Self::set_id) for already stored
    /// measurements
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Database identity, if stored
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Record the database identity
    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    /// Dataset the measurement belongs to
    pub fn dataset_id(&self) -> i64 {
        self.coordinate.dataset_id()
    }

    /// Where the measurement was taken
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Run types keyed by variable id
    pub fn run_types(&self) -> &BTreeMap<i64, String> {
        &self.run_types
    }

    /// Run type for a variable, falling back to the run type shared by all
    /// variables
    pub fn run_type(&self, variable_id: i64) -> Option<&str> {
        self.run_types
            .get(&variable_id)
            .or_else(|| self.run_types.get(&RUN_TYPE_DEFINES_VARIABLE))
            .map(String::as_str)
    }

    /// Set the run type for a variable
    pub fn set_run_type(&mut self, variable_id: i64, run_type: &str) {
        self.run_types.insert(variable_id, run_type.to_string());
    }

    /// Calculated values for a variable, keyed by sensor type id
    pub fn measurement_values(&self, variable_id: i64) -> Option<&BTreeMap<i64, MeasurementValue>> {
        self.measurement_values.get(&variable_id)
    }

    /// Calculated value of one sensor type for a variable
    pub fn measurement_value(&self, variable_id: i64, sensor_type_id: i64) -> Option<&MeasurementValue> {
        self.measurement_values
            .get(&variable_id)
            .and_then(|values| values.get(&sensor_type_id))
    }

    /// Store a calculated value, replacing any earlier one for the same
    /// sensor type
    pub fn set_measurement_value(&mut self, variable_id: i64, value: MeasurementValue) {
        self.measurement_values
            .entry(variable_id)
            .or_default()
            .insert(value.sensor_type_id, value);
    }

    /// Drop every calculated value
    pub fn clear_measurement_values(&mut self) {
        self.measurement_values.clear();
    }

    /// Coordinate ordering of two measurements
    pub fn try_cmp(&self, other: &Measurement) -> CoordinateResult<Ordering> {
        self.coordinate.try_cmp(&other.coordinate)
    }
}
