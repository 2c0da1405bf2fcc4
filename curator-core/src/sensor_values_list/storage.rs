//! Ordered storage shared by every list strategy
//!
//! Holds raw sensor values sorted by coordinate with no duplicates, plus a
//! parallel vector of their coordinates for binary searching. The insertion
//! decision is made by the pure function [`locate_insertion`], so the
//! ordering and uniqueness checks can be tested without building a list.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::coordinate::{self, Coordinate};
use crate::errors::{ListResult, SensorValuesListError};
use crate::flag::Flag;
use crate::instrument::{DisplayFlagResolver, InstrumentDescriptor, SensorType, SharedResolver};
use crate::sensor_value::SensorValue;

use super::value::ListValuePayload;

/// Where a new coordinate belongs in an ordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// After the last member
    Append,
    /// Before the member currently at this index
    At(usize),
    /// A member already has this coordinate (its index)
    Duplicate(usize),
    /// The coordinate's basis differs from the members'
    Incompatible,
}

/// Decide where `coordinate` goes in the ordered `existing` coordinates
pub fn locate_insertion(existing: &[Coordinate], coordinate: &Coordinate) -> Insertion {
    let (first, last) = match (existing.first(), existing.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Insertion::Append,
    };

    if first.basis() != coordinate.basis() {
        return Insertion::Incompatible;
    }

    match last.try_cmp(coordinate) {
        Err(_) => Insertion::Incompatible,
        Ok(core::cmp::Ordering::Equal) => Insertion::Duplicate(existing.len() - 1),
        Ok(core::cmp::Ordering::Less) => Insertion::Append,
        Ok(core::cmp::Ordering::Greater) => match coordinate::search(existing, coordinate) {
            Ok(Ok(index)) => Insertion::Duplicate(index),
            Ok(Err(index)) => Insertion::At(index),
            Err(_) => Insertion::Incompatible,
        },
    }
}

/// Sorted, duplicate-free raw values for one or more columns of one sensor type
pub struct OrderedSensorValues {
    column_ids: BTreeSet<i64>,
    sensor_type: Arc<SensorType>,
    resolver: SharedResolver,
    force_string: bool,
    values: Vec<Arc<SensorValue>>,
    coordinates: Vec<Coordinate>,
}

impl OrderedSensorValues {
    /// Empty storage for the given columns.
    ///
    /// All columns must map to the same sensor type.
    pub fn new<I>(
        column_ids: I,
        instrument: &dyn InstrumentDescriptor,
        resolver: SharedResolver,
        force_string: bool,
    ) -> ListResult<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let column_ids: BTreeSet<i64> = column_ids.into_iter().collect();

        let mut sensor_type: Option<&SensorType> = None;
        for column_id in &column_ids {
            let column_type = instrument.sensor_type_for_column(*column_id)?;
            match sensor_type {
                None => sensor_type = Some(column_type),
                Some(existing) if existing.id != column_type.id => {
                    return Err(SensorValuesListError::MixedSensorTypes);
                }
                Some(_) => {}
            }
        }

        let sensor_type = sensor_type.ok_or(SensorValuesListError::NoColumns)?;

        Ok(Self {
            sensor_type: Arc::new(sensor_type.clone()),
            column_ids,
            resolver,
            force_string,
            values: Vec::new(),
            coordinates: Vec::new(),
        })
    }

    /// Insert a value, keeping coordinate order
    pub fn add(&mut self, value: Arc<SensorValue>) -> ListResult<()> {
        if !self.column_ids.contains(&value.column_id()) {
            return Err(SensorValuesListError::InvalidColumn {
                column_id: value.column_id(),
            });
        }

        let coordinate = *value.coordinate();
        match locate_insertion(&self.coordinates, &coordinate) {
            Insertion::Append => {
                self.values.push(value);
                self.coordinates.push(coordinate);
            }
            Insertion::At(index) => {
                self.values.insert(index, value);
                self.coordinates.insert(index, coordinate);
            }
            Insertion::Duplicate(_) => {
                return Err(SensorValuesListError::DuplicateCoordinate {
                    coordinate: coordinate.to_string(),
                });
            }
            Insertion::Incompatible => return Err(SensorValuesListError::IncompatibleCoordinateType),
        }

        Ok(())
    }

    /// Remove the member with the same column and coordinate as `value`
    pub fn remove(&mut self, value: &SensorValue) -> bool {
        match self.index_of(value.coordinate()) {
            Some(index) if self.values[index].column_id() == value.column_id() => {
                self.values.remove(index);
                self.coordinates.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Index of the member at `coordinate`. Coordinates of another basis are
    /// never present.
    pub fn index_of(&self, coordinate: &Coordinate) -> Option<usize> {
        match coordinate::search(&self.coordinates, coordinate) {
            Ok(Ok(index)) => Some(index),
            _ => None,
        }
    }

    /// Binary search result over the raw coordinates
    pub fn search(&self, coordinate: &Coordinate) -> ListResult<Result<usize, usize>> {
        Ok(coordinate::search(&self.coordinates, coordinate)?)
    }

    /// Number of raw members
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no members
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Members in coordinate order
    pub fn values(&self) -> &[Arc<SensorValue>] {
        &self.values
    }

    /// Member coordinates in order
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Allowed columns
    pub fn column_ids(&self) -> &BTreeSet<i64> {
        &self.column_ids
    }

    /// Sensor type of every member
    pub fn sensor_type(&self) -> &Arc<SensorType> {
        &self.sensor_type
    }

    /// Payloads are always treated as text
    pub fn force_string(&self) -> bool {
        self.force_string
    }

    /// Dataset of the members, if there are any
    pub fn dataset_id(&self) -> Option<i64> {
        self.coordinates.first().map(Coordinate::dataset_id)
    }

    /// Flag shown for a member
    pub fn display_flag(&self, value: &SensorValue) -> Flag {
        self.resolver.display_flag(value)
    }

    /// Message shown for a member
    pub fn display_message(&self, value: &SensorValue) -> String {
        self.resolver.display_message(value)
    }

    /// True if a member's payload is text rather than a number
    pub fn is_string_value(&self, value: &SensorValue) -> bool {
        match value.value() {
            Some(v) => self.force_string || (!value.is_numeric() && !v.is_empty()),
            None => false,
        }
    }

    /// True if any member holds a text payload
    pub fn contains_string_value(&self) -> bool {
        self.values.iter().any(|v| self.is_string_value(v))
    }

    /// Output payload for a member
    pub fn payload(&self, value: &SensorValue) -> ListValuePayload {
        if self.force_string {
            return ListValuePayload::Text(value.value().unwrap_or_default().to_string());
        }

        match (value.numeric_value(), value.value()) {
            (Some(number), _) => ListValuePayload::Numeric(number),
            (None, Some(text)) if !text.is_empty() => ListValuePayload::Text(text.to_string()),
            _ => ListValuePayload::Numeric(f64::NAN),
        }
    }
}
