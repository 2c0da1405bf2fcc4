//! Instrument configuration
//!
//! An [`InstrumentDefinition`] is the file form: sensor types are named.
//! [`InstrumentConfig`] is the resolved form handed to the core engine.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use curator_core::{Basis, InstrumentDescriptor, RecordNotFound, RunTypeCategory, SensorType, Variable};

use crate::registry::{SensorTypeRegistry, GLOBAL_REGISTRY};
use crate::validation::validate_instrument;
use crate::ConfigError;

/// A data column and the sensor type it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column identity
    pub id: i64,
    /// Sensor type name
    pub sensor_type: String,
}

/// A variable calculated by the instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Variable identity
    pub id: i64,
    /// Display name
    pub name: String,
    /// Sensor type name whose readings define measurements
    pub core_sensor_type: String,
    /// Measurements are interleaved with calibration runs
    #[serde(default)]
    pub internal_calibrations: bool,
}

/// An instrument as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDefinition {
    /// Instrument identity
    pub id: i64,
    /// Display name
    pub name: String,
    /// Measurement basis
    pub basis: Basis,
    /// Data columns
    pub columns: Vec<ColumnDefinition>,
    /// Calculated variables
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    /// Run type name -> category
    #[serde(default)]
    pub run_types: BTreeMap<String, RunTypeCategory>,
    /// Column holding the run type
    #[serde(default)]
    pub run_type_column: Option<i64>,
}

/// A validated instrument with its sensor types resolved
#[derive(Debug, Clone)]
pub struct InstrumentConfig {
    definition: InstrumentDefinition,
    columns: BTreeMap<i64, SensorType>,
    variables: Vec<Variable>,
}

impl InstrumentConfig {
    /// Resolve a definition against a registry. The definition must pass
    /// [`validate_instrument`] without errors.
    pub fn from_definition(
        definition: InstrumentDefinition,
        registry: &SensorTypeRegistry,
    ) -> Result<Self, ConfigError> {
        let report = validate_instrument(&definition, registry);
        if !report.is_valid() {
            let messages: Vec<&str> = report.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ConfigError::ValidationError(messages.join("; ")));
        }

        let mut columns = BTreeMap::new();
        for column in &definition.columns {
            columns.insert(column.id, registry.get(&column.sensor_type)?);
        }

        let mut variables = Vec::with_capacity(definition.variables.len());
        for variable in &definition.variables {
            variables.push(Variable {
                id: variable.id,
                name: variable.name.clone(),
                core_sensor_type: registry.get(&variable.core_sensor_type)?,
                internal_calibrations: variable.internal_calibrations,
            });
        }

        Ok(Self {
            definition,
            columns,
            variables,
        })
    }

    /// Parse JSON, resolving sensor types against `registry`
    pub fn from_json_with_registry(json: &str, registry: &SensorTypeRegistry) -> Result<Self, ConfigError> {
        let definition: InstrumentDefinition = serde_json::from_str(json)?;
        Self::from_definition(definition, registry)
    }

    /// Parse JSON, resolving sensor types against the global registry
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_json_with_registry(json, &GLOBAL_REGISTRY)
    }

    /// Load a JSON file, resolving sensor types against the global registry
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = crate::read_file(path.as_ref())?;
        Self::from_json(&json)
    }

    /// The definition the instrument was built from
    pub fn definition(&self) -> &InstrumentDefinition {
        &self.definition
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl InstrumentDescriptor for InstrumentConfig {
    fn id(&self) -> i64 {
        self.definition.id
    }

    fn basis(&self) -> Basis {
        self.definition.basis
    }

    fn sensor_type_for_column(&self, column_id: i64) -> Result<&SensorType, RecordNotFound> {
        self.columns
            .get(&column_id)
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
        self.definition.run_types.get(run_type).copied()
    }

    fn run_type_column(&self) -> Option<i64> {
        self.definition.run_type_column
    }
}
