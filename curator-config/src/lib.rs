//! Configuration for Curator
//!
//! ## Overview
//!
//! The core engine never reads configuration itself. This crate loads the
//! pieces it is handed from JSON:
//!
//! - **Sensor types**: a registry of [`SensorTypeDefinition`]s. The standard
//!   definitions ship embedded in the crate and are loaded into
//!   [`GLOBAL_REGISTRY`] on first use.
//! - **Instruments**: an [`InstrumentConfig`] describes an instrument's basis,
//!   its columns, the variables it measures and its run types. It implements
//!   [`curator_core::InstrumentDescriptor`].
//! - **Calibrations**: a [`CalibrationStore`] holds the calibration sets of
//!   each instrument and implements [`curator_core::CalibrationProvider`].
//!
//! ## Instrument Files
//!
//! Columns and variables refer to sensor types by name. Names are resolved
//! against a registry when the file is loaded, and the configuration is
//! checked before it is accepted (see [`validation`]).
//!
//! ```rust
//! use curator_config::InstrumentConfig;
//! use curator_core::InstrumentDescriptor;
//!
//! let json = r#"{
//!     "id": 1,
//!     "name": "Underway pCO2",
//!     "basis": "time",
//!     "columns": [
//!         { "id": 1, "sensor_type": "Water Temperature" },
//!         { "id": 2, "sensor_type": "xCO₂ (with standards)" },
//!         { "id": 3, "sensor_type": "Run Type" }
//!     ],
//!     "variables": [
//!         {
//!             "id": 1,
//!             "name": "Underway Marine pCO₂",
//!             "core_sensor_type": "xCO₂ (with standards)",
//!             "internal_calibrations": true
//!         }
//!     ],
//!     "run_types": { "EQU": "measurement", "STD1": "internal_calibration" },
//!     "run_type_column": 3
//! }"#;
//!
//! let instrument = InstrumentConfig::from_json(json)?;
//! assert_eq!(instrument.sensor_type_for_column(1)?.name, "Water Temperature");
//! assert_eq!(instrument.run_type_column(), Some(3));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod calibration;
pub mod instrument;
pub mod registry;
pub mod validation;

pub use calibration::CalibrationStore;
pub use instrument::{ColumnDefinition, InstrumentConfig, InstrumentDefinition, VariableDefinition};
pub use registry::{SensorTypeDefinition, SensorTypeRegistry, GLOBAL_REGISTRY};
pub use validation::{validate_instrument, IssueType, Severity, ValidationIssue, ValidationReport};

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror_no_std::Error)]
pub enum ConfigError {
    /// A named item or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// The configuration parsed but is inconsistent
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

/// Read a configuration file
pub(crate) fn read_file(path: &std::path::Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map_err(|error| ConfigError::NotFound(format!("{}: {}", path.display(), error)))
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
