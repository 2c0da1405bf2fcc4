//! Ordered sensor value lists
//!
//! A list holds the raw values of one sensor type, sorted by coordinate and
//! free of duplicates, and serves two views of them:
//!
//! - the **raw** view: the values exactly as added;
//! - the **output** view: values processed for use in calculations. Simple
//!   lists pass raw values through one for one. Time-based lists classify
//!   their sampling as continuous or periodic and group, average and
//!   interpolate accordingly.
//!
//! The output view is built on first read and dropped on every mutation.
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use curator_core::sensor_values_list::{SensorValuesList, TimestampSensorValuesList};
//! use curator_core::{Coordinate, SensorType, SensorValue, UserOverrideResolver};
//! # use curator_core::{Basis, InstrumentDescriptor, RecordNotFound, RunTypeCategory, Variable};
//! # struct Thermometer(SensorType);
//! # impl InstrumentDescriptor for Thermometer {
//! #     fn id(&self) -> i64 { 1 }
//! #     fn basis(&self) -> Basis { Basis::Time }
//! #     fn sensor_type_for_column(&self, _: i64) -> Result<&SensorType, RecordNotFound> { Ok(&self.0) }
//! #     fn column_ids(&self, _: &SensorType) -> Vec<i64> { vec![1] }
//! #     fn variables(&self) -> &[Variable] { &[] }
//! #     fn run_type_category(&self, _: &str) -> Option<RunTypeCategory> { None }
//! #     fn run_type_column(&self) -> Option<i64> { None }
//! # }
//! # let instrument = Thermometer(SensorType::new(1, "Water Temperature"));
//!
//! let mut list =
//!     TimestampSensorValuesList::new([1], &instrument, UserOverrideResolver::shared()).unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
//! for (minute, reading) in [(1, "10.0"), (3, "11.0")] {
//!     let coordinate = Coordinate::time(1, day.and_hms_opt(0, minute, 0).unwrap()).unwrap();
//!     list.add(Arc::new(SensorValue::new(1, 1, coordinate, Some(reading)))).unwrap();
//! }
//!
//! let target = Coordinate::time(1, day.and_hms_opt(0, 2, 0).unwrap()).unwrap();
//! let value = list.get_value(&target, true).unwrap().unwrap();
//! assert!(value.is_interpolated());
//! assert_eq!(value.double_value(), 10.5);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::coordinate::{self, Basis, Coordinate};
use crate::errors::ListResult;
use crate::instrument::{InstrumentDescriptor, SensorType, SharedResolver};
use crate::sensor_value::SensorValue;

mod grouping;
mod simple;
mod storage;
mod timestamp;
mod value;

pub use grouping::{classify_measurement_mode, MeasurementMode};
pub use simple::SimpleSensorValuesList;
pub use storage::{locate_insertion, Insertion, OrderedSensorValues};
pub use timestamp::TimestampSensorValuesList;
pub use value::{ListValuePayload, SensorValuesListValue, ValueExtent};

/// Built output view: values plus their nominal coordinates
#[derive(Debug, Clone, Default)]
pub struct ListOutput {
    values: Vec<SensorValuesListValue>,
    coordinates: Vec<Coordinate>,
}

impl ListOutput {
    pub(crate) fn new(values: Vec<SensorValuesListValue>) -> Self {
        let coordinates = values.iter().map(|v| *v.coordinate()).collect();
        Self { values, coordinates }
    }

    /// Output values in coordinate order
    pub fn values(&self) -> &[SensorValuesListValue] {
        &self.values
    }

    /// Nominal coordinates of the output values
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }
}

/// Common interface of the list strategies
pub trait SensorValuesList {
    /// Underlying ordered raw values
    fn storage(&self) -> &OrderedSensorValues;

    /// Add a raw value, keeping coordinate order.
    ///
    /// Fails if the column is not one of the list's columns, a value already
    /// exists at the coordinate, or the coordinate basis differs from the
    /// existing members.
    fn add(&mut self, value: Arc<SensorValue>) -> ListResult<()>;

    /// Remove a raw value. Returns false if it was not a member.
    fn remove(&mut self, value: &SensorValue) -> bool;

    /// The output view, built if necessary
    fn output(&self) -> ListResult<&ListOutput>;

    /// Output value at `coordinate`, interpolated if permitted and possible
    fn get_value(
        &self,
        coordinate: &Coordinate,
        allow_interpolation: bool,
    ) -> ListResult<Option<SensorValuesListValue>>;

    /// Downcast to the time-based strategy
    fn as_timestamp(&self) -> Option<&TimestampSensorValuesList> {
        None
    }

    /// Mutable downcast to the time-based strategy
    fn as_timestamp_mut(&mut self) -> Option<&mut TimestampSensorValuesList> {
        None
    }

    /// Sensor type of every member
    fn sensor_type(&self) -> &SensorType {
        self.storage().sensor_type()
    }

    /// Columns accepted by the list
    fn column_ids(&self) -> &BTreeSet<i64> {
        self.storage().column_ids()
    }

    /// True if the list has no raw values
    fn is_empty(&self) -> bool {
        self.storage().is_empty()
    }

    /// Number of raw values
    fn raw_size(&self) -> usize {
        self.storage().len()
    }

    /// True if a raw value exists at `coordinate`
    fn contains_coordinate(&self, coordinate: &Coordinate) -> bool {
        self.storage().index_of(coordinate).is_some()
    }

    /// The raw value at exactly `coordinate`
    fn raw_sensor_value(&self, coordinate: &Coordinate) -> Option<&Arc<SensorValue>> {
        self.storage()
            .index_of(coordinate)
            .map(|index| &self.storage().values()[index])
    }

    /// The raw value at `coordinate`, or the members either side of it
    fn closest_sensor_values(&self, coordinate: &Coordinate) -> heapless::Vec<Arc<SensorValue>, 2> {
        let storage = self.storage();
        let mut result = heapless::Vec::new();

        match coordinate::search(storage.coordinates(), coordinate) {
            Ok(Ok(index)) => {
                let _ = result.push(Arc::clone(&storage.values()[index]));
            }
            Ok(Err(index)) => {
                if let Some(prior) = index.checked_sub(1).and_then(|i| storage.values().get(i)) {
                    let _ = result.push(Arc::clone(prior));
                }
                if let Some(post) = storage.values().get(index) {
                    let _ = result.push(Arc::clone(post));
                }
            }
            Err(_) => {}
        }

        result
    }

    /// Raw coordinates in order
    fn raw_coordinates(&self) -> &[Coordinate] {
        self.storage().coordinates()
    }

    /// Raw values in order
    fn raw_values(&self) -> &[Arc<SensorValue>] {
        self.storage().values()
    }

    /// Output values in order
    fn values(&self) -> ListResult<&[SensorValuesListValue]> {
        Ok(self.output()?.values())
    }

    /// Number of output values
    fn values_size(&self) -> ListResult<usize> {
        Ok(self.output()?.values().len())
    }

    /// Nominal coordinates of the output values
    fn value_coordinates(&self) -> ListResult<&[Coordinate]> {
        Ok(self.output()?.coordinates())
    }

    /// The output value at `coordinate`, or the last one before it
    fn value_on_or_before(&self, coordinate: &Coordinate) -> ListResult<Option<&SensorValuesListValue>> {
        let output = self.output()?;
        Ok(match coordinate::search(output.coordinates(), coordinate) {
            Ok(Ok(index)) => output.values().get(index),
            Ok(Err(index)) => index.checked_sub(1).and_then(|i| output.values().get(i)),
            Err(_) => None,
        })
    }

    /// Add every raw value of another list
    fn add_all(&mut self, other: &dyn SensorValuesList) -> ListResult<()> {
        for value in other.raw_values() {
            self.add(Arc::clone(value))?;
        }
        Ok(())
    }
}

/// Create an empty list for `column_ids`, choosing the strategy from the
/// instrument's basis
pub fn make_sensor_values_list<I>(
    column_ids: I,
    instrument: &dyn InstrumentDescriptor,
    resolver: SharedResolver,
    force_string: bool,
) -> ListResult<Box<dyn SensorValuesList>>
where
    I: IntoIterator<Item = i64>,
{
    Ok(match instrument.basis() {
        Basis::Time => Box::new(TimestampSensorValuesList::with_force_string(
            column_ids,
            instrument,
            resolver,
            force_string,
        )?),
        Basis::Profile => Box::new(SimpleSensorValuesList::with_force_string(
            column_ids,
            instrument,
            resolver,
            force_string,
        )?),
    })
}

/// Build a list holding `values`, which may arrive in any order. The
/// columns are taken from the values themselves.
pub fn new_from_sensor_value_collection<I>(
    values: I,
    instrument: &dyn InstrumentDescriptor,
    resolver: SharedResolver,
    force_string: bool,
) -> ListResult<Box<dyn SensorValuesList>>
where
    I: IntoIterator<Item = Arc<SensorValue>>,
{
    let values: Vec<Arc<SensorValue>> = values.into_iter().collect();
    let column_ids: BTreeSet<i64> = values.iter().map(|v| v.column_id()).collect();

    let mut list = make_sensor_values_list(column_ids, instrument, resolver, force_string)?;
    for value in values {
        list.add(value)?;
    }

    Ok(list)
}
