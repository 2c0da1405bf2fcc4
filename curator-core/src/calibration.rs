//! External standard calibration
//!
//! Sensors with internal calibration periodically measure gas standards of
//! known concentration. The offset between a standard's reading and its
//! concentration, regressed against concentration, gives the correction to
//! apply to a measured value.
//!
//! ## Selecting standards
//!
//! The standards closest in concentration to the measured value are used, up
//! to [`MAX_CALIBRATION_STANDARDS`]. Ties are broken by standard name so the
//! choice is stable.
//!
//! ## Regression
//!
//! Offsets are fitted with ordinary least squares (offset against
//! concentration) and the fit is evaluated at the measured value:
//!
//! ```rust
//! use curator_core::calibration::predict_offset;
//!
//! // Offset grows by 0.01 per unit of concentration
//! let offsets = [(250.0, 2.5), (400.0, 4.0), (550.0, 5.5)];
//! let predicted = predict_offset(&offsets, 300.0).unwrap();
//! assert!((predicted - 3.0).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CALIBRATION_STANDARDS;
use crate::errors::CalibrationError;
use crate::instrument::SensorType;

/// Result type for calibration lookups
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Standard concentrations in force from a deployment date
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationSet {
    deployment_date: NaiveDateTime,
    /// Standard name -> sensor type name -> concentration
    standards: BTreeMap<String, BTreeMap<String, f64>>,
}

impl CalibrationSet {
    /// Empty set deployed at `deployment_date`
    pub fn new(deployment_date: NaiveDateTime) -> Self {
        Self {
            deployment_date,
            standards: BTreeMap::new(),
        }
    }

    /// Builder form of [`add_standard`](Self::add_standard)
    pub fn with_standard(mut self, standard: &str, sensor_type: &str, concentration: f64) -> Self {
        self.add_standard(standard, sensor_type, concentration);
        self
    }

    /// Record a standard's concentration for a sensor type
    pub fn add_standard(&mut self, standard: &str, sensor_type: &str, concentration: f64) {
        self.standards
            .entry(standard.to_string())
            .or_default()
            .insert(sensor_type.to_string(), concentration);
    }

    /// When the set came into force
    pub fn deployment_date(&self) -> NaiveDateTime {
        self.deployment_date
    }

    /// Names of the standards in the set
    pub fn standard_names(&self) -> impl Iterator<Item = &str> {
        self.standards.keys().map(String::as_str)
    }

    /// Concentration of a standard for a sensor type
    pub fn concentration(&self, standard: &str, sensor_type: &str) -> Option<f64> {
        self.standards
            .get(standard)
            .and_then(|types| types.get(sensor_type))
            .copied()
    }

    /// The standards closest in concentration to `value`, nearest first
    pub fn closest_standards(&self, sensor_type: &SensorType, value: f64) -> Vec<(&str, f64)> {
        let mut candidates: Vec<(&str, f64)> = self
            .standards
            .iter()
            .filter_map(|(name, types)| types.get(&sensor_type.name).map(|c| (name.as_str(), *c)))
            .collect();

        candidates.sort_by(|a, b| {
            libm::fabs(a.1 - value)
                .total_cmp(&libm::fabs(b.1 - value))
                .then_with(|| a.0.cmp(b.0))
        });

        candidates.truncate(MAX_CALIBRATION_STANDARDS);
        candidates
    }
}

/// Source of calibration sets
pub trait CalibrationProvider {
    /// Handle passed through to the lookup (database connection or similar)
    type Connection;

    /// The most recent calibration set at or before `time`
    fn calibrations_at(
        &self,
        connection: &Self::Connection,
        instrument_id: i64,
        time: NaiveDateTime,
    ) -> CalibrationResult<CalibrationSet>;
}

/// Ordinary least squares prediction of offset at concentration `x`.
///
/// `points` are `(concentration, offset)` pairs. A single point gives a
/// constant offset. If every concentration is the same the mean offset is
/// used. Returns `None` without points.
pub fn predict_offset(points: &[(f64, f64)], x: f64) -> Option<f64> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.0 - mean_x)).sum();
    if sxx == 0.0 {
        return Some(mean_y);
    }

    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    Some(intercept + slope * x)
}
