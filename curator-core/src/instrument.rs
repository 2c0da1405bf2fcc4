//! Collaborator interfaces supplied by the surrounding system
//!
//! The engine never reads configuration or QC state directly. Instead it is
//! handed implementations of these traits:
//!
//! - [`InstrumentDescriptor`]: basis, column to sensor type mapping,
//!   variables and run type categories.
//! - [`DisplayFlagResolver`]: which flag and message a user actually sees for
//!   a value.
//!
//! The calibration provider lives in [`crate::calibration`].

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coordinate::Basis;
use crate::errors::RecordNotFound;
use crate::flag::Flag;
use crate::sensor_value::SensorValue;

/// A kind of sensor (e.g. "Water Temperature", "xCO₂ (with standards)")
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorType {
    /// Identity
    pub id: i64,
    /// Display name
    pub name: String,
    /// Readings are corrected against internal calibration standards
    pub internal_calibration: bool,
}

impl SensorType {
    /// A sensor type without internal calibration
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            internal_calibration: false,
        }
    }

    /// Builder switch for internal calibration
    pub fn with_internal_calibration(mut self) -> Self {
        self.internal_calibration = true;
        self
    }

    /// True if readings must be calibrated against standards
    pub fn has_internal_calibration(&self) -> bool {
        self.internal_calibration
    }
}

/// A variable calculated from an instrument's sensors
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    /// Identity
    pub id: i64,
    /// Display name
    pub name: String,
    /// The sensor type whose readings define measurement instants
    pub core_sensor_type: SensorType,
    /// Measurements are interleaved with calibration runs
    pub internal_calibrations: bool,
}

/// What a run type represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunTypeCategory {
    /// Normal measurement
    Measurement,
    /// Internal calibration standard
    InternalCalibration,
    /// Not used for anything
    Ignored,
}

/// Description of the instrument a dataset came from
pub trait InstrumentDescriptor {
    /// Database identity of the instrument
    fn id(&self) -> i64;

    /// Measurement basis
    fn basis(&self) -> Basis;

    /// Sensor type assigned to a column
    fn sensor_type_for_column(&self, column_id: i64) -> Result<&SensorType, RecordNotFound>;

    /// Columns assigned to a sensor type
    fn column_ids(&self, sensor_type: &SensorType) -> Vec<i64>;

    /// Variables measured by the instrument
    fn variables(&self) -> &[Variable];

    /// Category of a run type, if the run type is known
    fn run_type_category(&self, run_type: &str) -> Option<RunTypeCategory>;

    /// Column holding run types, if the instrument has one
    fn run_type_column(&self) -> Option<i64>;

    /// True if the sensor type is the core type of any variable
    fn is_core_sensor_type(&self, sensor_type: &SensorType) -> bool {
        self.variables()
            .iter()
            .any(|v| v.core_sensor_type.id == sensor_type.id)
    }
}

/// Resolves the flag and message shown for a sensor value
pub trait DisplayFlagResolver {
    /// Flag shown to the user
    fn display_flag(&self, value: &SensorValue) -> Flag;

    /// Message shown to the user
    fn display_message(&self, value: &SensorValue) -> String;
}

/// Resolver shared between the lists of a dataset
pub type SharedResolver = Arc<dyn DisplayFlagResolver + Send + Sync>;

/// Default resolver: the user's flag, unless it is still `Needed`, in which
/// case the automatic QC result is shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserOverrideResolver;

impl UserOverrideResolver {
    /// Shared instance for list construction
    pub fn shared() -> SharedResolver {
        Arc::new(UserOverrideResolver)
    }
}

impl DisplayFlagResolver for UserOverrideResolver {
    fn display_flag(&self, value: &SensorValue) -> Flag {
        match value.user_flag() {
            Flag::Needed => value.auto_qc().overall_flag(),
            flag => flag,
        }
    }

    fn display_message(&self, value: &SensorValue) -> String {
        match value.user_flag() {
            Flag::Needed => value.auto_qc().messages(),
            _ => value.user_message().to_string(),
        }
    }
}
