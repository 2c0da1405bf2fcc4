//! Output values served by sensor value lists
//!
//! One struct covers every kind of output: a single raw value, a periodic
//! group, or an interpolation between two outputs. Time-based values carry a
//! span (`start`..`end`) alongside their nominal coordinate.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::coordinate::Coordinate;
use crate::errors::CoordinateResult;
use crate::flag::Flag;
use crate::instrument::SensorType;
use crate::sensor_value::SensorValue;

/// Payload of an output value
#[derive(Debug, Clone, PartialEq)]
pub enum ListValuePayload {
    /// Numeric payload (may be NaN for empty simple-list values)
    Numeric(f64),
    /// Text payload
    Text(String),
}

/// Extent of an output value along the coordinate axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueExtent {
    /// A single coordinate
    Point,
    /// A span of time covered by the contributing values
    Span {
        /// First contributing coordinate
        start: Coordinate,
        /// Last contributing coordinate
        end: Coordinate,
    },
}

/// A processed value from a sensor values list
#[derive(Debug, Clone)]
pub struct SensorValuesListValue {
    sensor_type: Arc<SensorType>,
    coordinate: Coordinate,
    extent: ValueExtent,
    payload: ListValuePayload,
    flag: Flag,
    message: String,
    sources: Vec<Arc<SensorValue>>,
    interpolated: bool,
    interpolates_around_flags: bool,
}

impl SensorValuesListValue {
    pub(crate) fn new(
        sensor_type: Arc<SensorType>,
        coordinate: Coordinate,
        extent: ValueExtent,
        payload: ListValuePayload,
        flag: Flag,
        message: String,
        sources: Vec<Arc<SensorValue>>,
    ) -> Self {
        Self {
            sensor_type,
            coordinate,
            extent,
            payload,
            flag,
            message,
            sources,
            interpolated: false,
            interpolates_around_flags: false,
        }
    }

    pub(crate) fn interpolated(mut self) -> Self {
        self.interpolated = true;
        self
    }

    pub(crate) fn with_interpolates_around_flags(mut self, around: bool) -> Self {
        self.interpolates_around_flags = around;
        self
    }

    /// Copy of this value placed at another nominal coordinate
    pub(crate) fn renominated(&self, coordinate: Coordinate) -> Self {
        let mut value = self.clone();
        value.coordinate = coordinate;
        value
    }

    pub(crate) fn shared_sensor_type(&self) -> &Arc<SensorType> {
        &self.sensor_type
    }

    /// Sensor type of the list that produced the value
    pub fn sensor_type(&self) -> &SensorType {
        &self.sensor_type
    }

    /// Nominal coordinate
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Nominal timestamp, for time-based values
    pub fn time(&self) -> Option<NaiveDateTime> {
        self.coordinate.timestamp()
    }

    /// Extent of the value
    pub fn extent(&self) -> &ValueExtent {
        &self.extent
    }

    /// First coordinate covered by the value
    pub fn start(&self) -> &Coordinate {
        match &self.extent {
            ValueExtent::Point => &self.coordinate,
            ValueExtent::Span { start, .. } => start,
        }
    }

    /// Last coordinate covered by the value
    pub fn end(&self) -> &Coordinate {
        match &self.extent {
            ValueExtent::Point => &self.coordinate,
            ValueExtent::Span { end, .. } => end,
        }
    }

    /// True if `coordinate` lies within the value's span (inclusive)
    pub fn encompasses(&self, coordinate: &Coordinate) -> CoordinateResult<bool> {
        Ok(!self.start().is_after(coordinate)? && !self.end().is_before(coordinate)?)
    }

    /// Payload
    pub fn payload(&self) -> &ListValuePayload {
        &self.payload
    }

    /// True for numeric payloads
    pub fn is_numeric(&self) -> bool {
        matches!(self.payload, ListValuePayload::Numeric(_))
    }

    /// Payload as a number, NaN if it is not numeric
    pub fn double_value(&self) -> f64 {
        match &self.payload {
            ListValuePayload::Numeric(value) => *value,
            ListValuePayload::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        }
    }

    /// Payload as text
    pub fn string_value(&self) -> String {
        match &self.payload {
            ListValuePayload::Numeric(value) => value.to_string(),
            ListValuePayload::Text(text) => text.clone(),
        }
    }

    /// QC flag
    pub fn flag(&self) -> Flag {
        self.flag
    }

    /// QC message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw values that contributed to this value
    pub fn sources(&self) -> &[Arc<SensorValue>] {
        &self.sources
    }

    /// Database identities of the contributing raw values
    pub fn source_ids(&self) -> Vec<i64> {
        self.sources.iter().filter_map(|v| v.id()).collect()
    }

    /// True if the value was interpolated between two outputs
    pub fn is_interpolated(&self) -> bool {
        self.interpolated
    }

    /// True if better-quality values were chosen over worse ones nearby
    pub fn interpolates_around_flags(&self) -> bool {
        self.interpolates_around_flags
    }
}

/// Join non-empty QC messages, deduplicated and sorted, with `;`
pub(crate) fn combine_messages<'a, I>(messages: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: BTreeSet<&str> = messages.into_iter().filter(|m| !m.is_empty()).collect();
    unique.into_iter().collect::<Vec<_>>().join(";")
}
