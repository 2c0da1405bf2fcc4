//! Common test utilities for integration tests
//!
//! This module provides:
//! - A configurable instrument for building lists and datasets
//! - Sensor value generators (see [`generators`])
//! - Canned datasets with known outcomes (see [`scenarios`])

#![allow(dead_code)]

use curator_core::{
    Basis, InstrumentDescriptor, RecordNotFound, RunTypeCategory, SensorType, Variable,
};

// Re-export submodules
pub mod generators;
pub mod scenarios;

/// Sensor types used across the tests
pub mod sensor_types {
    use curator_core::SensorType;

    /// Water temperature
    pub fn water_temperature() -> SensorType {
        SensorType::new(1, "Water Temperature")
    }

    /// Calibrated CO₂ mole fraction
    pub fn xco2() -> SensorType {
        SensorType::new(4, "xCO₂ (with standards)").with_internal_calibration()
    }

    /// Run type labels
    pub fn run_type() -> SensorType {
        SensorType::new(5, "Run Type")
    }

    /// A sensor type no test instrument has a column for
    pub fn salinity() -> SensorType {
        SensorType::new(2, "Salinity")
    }
}

/// Instrument assembled from column assignments
pub struct TestInstrument {
    pub basis: Basis,
    pub columns: Vec<(i64, SensorType)>,
    pub variables: Vec<Variable>,
    pub run_types: Vec<(&'static str, RunTypeCategory)>,
    pub run_type_column: Option<i64>,
}

impl TestInstrument {
    /// Time-based instrument with a single temperature column (column 1)
    pub fn thermometer() -> Self {
        Self {
            basis: Basis::Time,
            columns: vec![(1, sensor_types::water_temperature())],
            variables: Vec::new(),
            run_types: Vec::new(),
            run_type_column: None,
        }
    }

    /// Profile-based instrument with a single temperature column (column 1)
    pub fn float() -> Self {
        Self {
            basis: Basis::Profile,
            ..Self::thermometer()
        }
    }

    /// Underway pCO₂ system:
    /// - column 1: xCO₂ with standards
    /// - column 2: water temperature
    /// - column 9: run type
    pub fn underway_pco2() -> Self {
        Self {
            basis: Basis::Time,
            columns: vec![
                (1, sensor_types::xco2()),
                (2, sensor_types::water_temperature()),
                (9, sensor_types::run_type()),
            ],
            variables: vec![Variable {
                id: 1,
                name: "Underway Marine pCO₂".to_string(),
                core_sensor_type: sensor_types::xco2(),
                internal_calibrations: true,
            }],
            run_types: vec![
                ("EQU", RunTypeCategory::Measurement),
                ("STD1", RunTypeCategory::InternalCalibration),
                ("STD2", RunTypeCategory::InternalCalibration),
                ("STD3", RunTypeCategory::InternalCalibration),
                ("FLUSH", RunTypeCategory::Ignored),
            ],
            run_type_column: Some(9),
        }
    }
}

impl InstrumentDescriptor for TestInstrument {
    fn id(&self) -> i64 {
        1
    }

    fn basis(&self) -> Basis {
        self.basis
    }

    fn sensor_type_for_column(&self, column_id: i64) -> Result<&SensorType, RecordNotFound> {
        self.columns
            .iter()
            .find(|(id, _)| *id == column_id)
            .map(|(_, sensor_type)| sensor_type)
            .ok_or_else(|| RecordNotFound::new("Sensor type for column", column_id))
    }

    fn column_ids(&self, sensor_type: &SensorType) -> Vec<i64> {
        self.columns
            .iter()
            .filter(|(_, t)| t.id == sensor_type.id)
            .map(|(id, _)| *id)
            .collect()
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn run_type_category(&self, run_type: &str) -> Option<RunTypeCategory> {
        self.run_types
            .iter()
            .find(|(name, _)| *name == run_type)
            .map(|(_, category)| *category)
    }

    fn run_type_column(&self) -> Option<i64> {
        self.run_type_column
    }
}

/// Assert two floats agree to within `1e-9`
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
