//! Sensor type registry
//!
//! Sensor types are looked up by name. The standard definitions are
//! embedded from `sensor_types/` at build time; deployments can register
//! their own on top.

use std::collections::HashMap;
use std::sync::RwLock;

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

use curator_core::SensorType;

use crate::ConfigError;

static SENSOR_TYPE_FILES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/sensor_types");

/// A sensor type as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTypeDefinition {
    /// Identity
    pub id: i64,

    /// Name used to refer to the type in instrument files
    pub name: String,

    /// Display units
    #[serde(default)]
    pub units: Option<String>,

    /// Readings are corrected against internal calibration standards
    #[serde(default)]
    pub internal_calibration: bool,
}

impl SensorTypeDefinition {
    /// The core engine's view of the definition
    pub fn to_sensor_type(&self) -> SensorType {
        let sensor_type = SensorType::new(self.id, &self.name);
        if self.internal_calibration {
            sensor_type.with_internal_calibration()
        } else {
            sensor_type
        }
    }
}

/// Thread-safe registry of sensor types, keyed by name
pub struct SensorTypeRegistry {
    types: RwLock<HashMap<String, SensorTypeDefinition>>,
}

impl SensorTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Registry holding the embedded standard definitions
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let registry = Self::new();
        registry.load_defaults()?;
        Ok(registry)
    }

    /// Register a definition. Names and ids must both be unique.
    pub fn register(&self, definition: SensorTypeDefinition) -> Result<(), ConfigError> {
        let mut types = self
            .types
            .write()
            .map_err(|_| ConfigError::ValidationError("Lock poisoned".to_string()))?;

        if types.contains_key(&definition.name) {
            return Err(ConfigError::ValidationError(format!(
                "Sensor type {} already registered",
                definition.name
            )));
        }

        if let Some(existing) = types.values().find(|t| t.id == definition.id) {
            return Err(ConfigError::ValidationError(format!(
                "Sensor type id {} already used by {}",
                definition.id, existing.name
            )));
        }

        types.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Parse and register a JSON definition
    pub fn register_json(&self, json: &str) -> Result<(), ConfigError> {
        let definition: SensorTypeDefinition = serde_json::from_str(json)?;
        self.register(definition)
    }

    /// Get a definition by name
    pub fn definition(&self, name: &str) -> Result<SensorTypeDefinition, ConfigError> {
        let types = self
            .types
            .read()
            .map_err(|_| ConfigError::ValidationError("Lock poisoned".to_string()))?;

        types
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(format!("Sensor type {}", name)))
    }

    /// Get a sensor type by name
    pub fn get(&self, name: &str) -> Result<SensorType, ConfigError> {
        self.definition(name).map(|d| d.to_sensor_type())
    }

    /// True if a type with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types
            .read()
            .map(|types| types.contains_key(name))
            .unwrap_or(false)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .read()
            .map(|types| types.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.read().map(|types| types.len()).unwrap_or(0)
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register every embedded definition
    pub fn load_defaults(&self) -> Result<(), ConfigError> {
        for file in SENSOR_TYPE_FILES.files() {
            if file.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let json = file.contents_utf8().ok_or_else(|| {
                ConfigError::ParseError(format!("{} is not UTF-8", file.path().display()))
            })?;

            let definition: SensorTypeDefinition = serde_json::from_str(json).map_err(|e| {
                ConfigError::ParseError(format!("{}: {}", file.path().display(), e))
            })?;

            self.register(definition)?;
        }

        Ok(())
    }
}

impl Default for SensorTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// Global sensor type registry with the embedded definitions loaded
    pub static ref GLOBAL_REGISTRY: SensorTypeRegistry = {
        let registry = SensorTypeRegistry::new();
        // Embedded files are checked by the tests
        let _ = registry.load_defaults();
        registry
    };
}
