//! Instrument configuration checks
//!
//! Issues are collected into a [`ValidationReport`] rather than failing on
//! the first one, so a user can fix a file in one pass.

use std::collections::{BTreeSet, HashSet};

use curator_core::RunTypeCategory;

use crate::instrument::InstrumentDefinition;
use crate::registry::SensorTypeRegistry;

/// Validation report containing all issues found
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Validation errors (must be fixed)
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (should be reviewed)
    pub warnings: Vec<ValidationIssue>,

    /// Informational messages
    pub info: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an issue to the list matching its severity
    pub fn add(&mut self, issue_type: IssueType, field: Option<&str>, message: String, severity: Severity) {
        let issue = ValidationIssue {
            issue_type,
            field: field.map(str::to_string),
            message,
            severity,
        };

        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Info => self.info.push(issue),
        }
    }

    /// Get total issue count
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    /// True if any issue of the given type was found
    pub fn has_issue(&self, issue_type: IssueType) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.info)
            .any(|issue| issue.issue_type == issue_type)
    }
}

/// Individual validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Type of issue
    pub issue_type: IssueType,

    /// Field that caused the issue (if applicable)
    pub field: Option<String>,

    /// Human-readable message
    pub message: String,

    /// Issue severity
    pub severity: Severity,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// A column or variable names a sensor type that is not registered
    UnknownSensorType,

    /// Two columns share an id
    DuplicateColumn,

    /// A variable's core sensor type has no column
    MissingCoreColumn,

    /// The run type column is not one of the columns
    UnknownRunTypeColumn,

    /// Calibrated variables without a run type column
    MissingRunTypeColumn,

    /// No run type is categorised as a calibration run
    NoCalibrationRunTypes,

    /// No run type is categorised as a measurement
    NoMeasurementRunTypes,
}

/// Issue severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational only
    Info,

    /// Should be reviewed
    Warning,

    /// Must be fixed
    Error,
}

/// Check an instrument definition against a sensor type registry
pub fn validate_instrument(definition: &InstrumentDefinition, registry: &SensorTypeRegistry) -> ValidationReport {
    let mut report = ValidationReport::new();

    let mut column_ids = HashSet::new();
    for column in &definition.columns {
        if !column_ids.insert(column.id) {
            report.add(
                IssueType::DuplicateColumn,
                Some("columns"),
                format!("Column {} is defined more than once", column.id),
                Severity::Error,
            );
        }

        if !registry.contains(&column.sensor_type) {
            report.add(
                IssueType::UnknownSensorType,
                Some("columns"),
                format!("Column {} has unknown sensor type {}", column.id, column.sensor_type),
                Severity::Error,
            );
        }
    }

    let column_types: BTreeSet<&str> = definition
        .columns
        .iter()
        .map(|c| c.sensor_type.as_str())
        .collect();

    for variable in &definition.variables {
        if !registry.contains(&variable.core_sensor_type) {
            report.add(
                IssueType::UnknownSensorType,
                Some("variables"),
                format!(
                    "Variable {} has unknown core sensor type {}",
                    variable.name, variable.core_sensor_type
                ),
                Severity::Error,
            );
        } else if !column_types.contains(variable.core_sensor_type.as_str()) {
            report.add(
                IssueType::MissingCoreColumn,
                Some("variables"),
                format!(
                    "Variable {} needs a {} column",
                    variable.name, variable.core_sensor_type
                ),
                Severity::Error,
            );
        }
    }

    if let Some(run_type_column) = definition.run_type_column {
        if !column_ids.contains(&run_type_column) {
            report.add(
                IssueType::UnknownRunTypeColumn,
                Some("run_type_column"),
                format!("Run type column {} is not defined", run_type_column),
                Severity::Error,
            );
        }
    }

    let calibrated = definition.variables.iter().any(|v| v.internal_calibrations);
    if calibrated {
        if definition.run_type_column.is_none() {
            report.add(
                IssueType::MissingRunTypeColumn,
                Some("run_type_column"),
                "Variables with internal calibrations need a run type column".to_string(),
                Severity::Warning,
            );
        }

        let has_category = |category: RunTypeCategory| definition.run_types.values().any(|c| *c == category);

        if !has_category(RunTypeCategory::InternalCalibration) {
            report.add(
                IssueType::NoCalibrationRunTypes,
                Some("run_types"),
                "No run type is marked as an internal calibration".to_string(),
                Severity::Warning,
            );
        }

        if !has_category(RunTypeCategory::Measurement) {
            report.add(
                IssueType::NoMeasurementRunTypes,
                Some("run_types"),
                "No run type is marked as a measurement".to_string(),
                Severity::Info,
            );
        }
    }

    report
}
