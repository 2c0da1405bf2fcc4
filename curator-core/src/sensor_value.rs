//! Raw sensor readings
//!
//! A [`SensorValue`] is one reading from one column at one coordinate. The
//! payload is kept exactly as extracted from the data file; numeric views are
//! parsed on demand so that text columns (run types, status strings) share
//! the same type.
//!
//! Values carry two sets of QC information:
//!
//! - The automatic QC result, one flag and message per routine.
//! - The user QC flag and message. A user flag of [`Flag::Needed`] means the
//!   automatic result is waiting for review.
//!
//! Every mutation sets the `dirty` marker so the storage layer knows what to
//! write back.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::flag::Flag;

/// Flag and message produced by one automatic QC routine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoutineResult {
    /// Routine name
    pub routine: String,
    /// Flag set by the routine
    pub flag: Flag,
    /// Explanation shown to the user
    pub message: String,
}

/// Combined result of the automatic QC routines run on a value
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AutoQcResult {
    results: Vec<RoutineResult>,
}

impl AutoQcResult {
    /// Empty result (no routine has flagged the value)
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a routine's result, replacing any earlier result for the
    /// same routine
    pub fn add(&mut self, routine: &str, flag: Flag, message: &str) {
        self.results.retain(|r| r.routine != routine);
        self.results.push(RoutineResult {
            routine: routine.to_string(),
            flag,
            message: message.to_string(),
        });
    }

    /// True if no routine has reported
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Individual routine results
    pub fn results(&self) -> &[RoutineResult] {
        &self.results
    }

    /// The most significant flag of all routines, or `Good` if none reported
    pub fn overall_flag(&self) -> Flag {
        self.results
            .iter()
            .map(|r| r.flag)
            .fold(Flag::Good, Flag::most_significant)
    }

    /// All routine messages, deduplicated and joined with `;`
    pub fn messages(&self) -> String {
        let messages: BTreeSet<&str> = self
            .results
            .iter()
            .map(|r| r.message.as_str())
            .filter(|m| !m.is_empty())
            .collect();
        messages.into_iter().collect::<Vec<_>>().join(";")
    }
}

/// A single instrument reading
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorValue {
    id: Option<i64>,
    dataset_id: i64,
    column_id: i64,
    coordinate: Coordinate,
    value: Option<String>,
    auto_qc: AutoQcResult,
    user_flag: Flag,
    user_message: String,
    dirty: bool,
}

impl SensorValue {
    /// A new, unsaved value with an assumed-good user flag
    pub fn new(dataset_id: i64, column_id: i64, coordinate: Coordinate, value: Option<&str>) -> Self {
        Self {
            id: None,
            dataset_id,
            column_id,
            coordinate,
            value: value.map(str::to_string),
            auto_qc: AutoQcResult::new(),
            user_flag: Flag::AssumedGood,
            user_message: String::new(),
            dirty: false,
        }
    }

    /// Attach the database identity of a stored value
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the user QC state of a freshly loaded value without marking it dirty
    pub fn with_user_qc(mut self, flag: Flag, message: &str) -> Self {
        self.user_flag = flag;
        self.user_message = message.to_string();
        self
    }

    /// Set the automatic QC result of a freshly loaded value
    pub fn with_auto_qc(mut self, auto_qc: AutoQcResult) -> Self {
        self.auto_qc = auto_qc;
        self
    }

    /// Database identity, if stored
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Owning dataset
    pub fn dataset_id(&self) -> i64 {
        self.dataset_id
    }

    /// Source column
    pub fn column_id(&self) -> i64 {
        self.column_id
    }

    /// Position of the reading
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Raw payload
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True if the payload is present and parses as a number
    pub fn is_numeric(&self) -> bool {
        self.numeric_value().is_some()
    }

    /// The payload as a number, if it is one
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_deref().and_then(|v| v.trim().parse::<f64>().ok())
    }

    /// The payload as a number, NaN if missing or not numeric
    pub fn double_value(&self) -> f64 {
        self.numeric_value().unwrap_or(f64::NAN)
    }

    /// True if there is no usable numeric payload
    pub fn is_nan(&self) -> bool {
        self.double_value().is_nan()
    }

    /// Automatic QC result
    pub fn auto_qc(&self) -> &AutoQcResult {
        &self.auto_qc
    }

    /// User QC flag
    pub fn user_flag(&self) -> Flag {
        self.user_flag
    }

    /// User QC message
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// True if the value has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the payload
    pub fn set_value(&mut self, value: Option<&str>) {
        self.value = value.map(str::to_string);
        self.dirty = true;
    }

    /// Set the user QC flag and message
    pub fn set_user_qc(&mut self, flag: Flag, message: &str) {
        self.user_flag = flag;
        self.user_message = message.to_string();
        self.dirty = true;
    }

    /// Record an automatic QC routine result.
    ///
    /// A value whose user flag has not been set by a person is moved to
    /// `Needed` when a routine flags it as anything other than good.
    pub fn add_auto_qc(&mut self, routine: &str, flag: Flag, message: &str) {
        self.auto_qc.add(routine, flag, message);
        if !flag.is_good() && self.user_flag == Flag::AssumedGood {
            self.user_flag = Flag::Needed;
        }
        self.dirty = true;
    }

    /// Remove all automatic QC results
    pub fn clear_auto_qc(&mut self) {
        self.auto_qc = AutoQcResult::new();
        if self.user_flag == Flag::Needed {
            self.user_flag = Flag::AssumedGood;
            self.user_message.clear();
        }
        self.dirty = true;
    }

    /// Mark the value as saved
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
