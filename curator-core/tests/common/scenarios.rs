//! Canned datasets with known outcomes
//!
//! ## Underway pCO₂
//!
//! One reading a minute for 22 minutes. The run type column records the
//! instrument's state every minute:
//!
//! | Minutes | Run type |
//! |---------|----------|
//! | 0-1     | STD1     |
//! | 2-3     | STD2     |
//! | 4-5     | STD3     |
//! | 6-15    | EQU      |
//! | 16-17   | STD1     |
//! | 18-19   | STD2     |
//! | 20-21   | STD3     |
//!
//! The analyser reads every standard and the seawater with a fixed offset,
//! which can differ before and after minute 16. Water temperature is logged
//! every five minutes.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use curator_core::calibration::CalibrationResult;
use curator_core::{
    CalibrationError, CalibrationProvider, CalibrationSet, DatasetMeasurements, DatasetSensorValues,
    Flag, Measurement, UserOverrideResolver,
};

use super::generators::{base_time, minutes, reading, DATASET_ID};
use super::TestInstrument;

/// Sensor type name used for the standards
pub const XCO2: &str = "xCO₂ (with standards)";

/// Run type in force at each minute of the underway dataset
pub const UNDERWAY_RUN_TYPES: [&str; 22] = [
    "STD1", "STD1", "STD2", "STD2", "STD3", "STD3", "EQU", "EQU", "EQU", "EQU", "EQU", "EQU",
    "EQU", "EQU", "EQU", "EQU", "STD1", "STD1", "STD2", "STD2", "STD3", "STD3",
];

/// Minute the second set of calibration runs starts
pub const SECOND_CALIBRATION: i64 = 16;

/// Certified concentration of a standard
pub fn concentration(standard: &str) -> Option<f64> {
    match standard {
        "STD1" => Some(250.0),
        "STD2" => Some(400.0),
        "STD3" => Some(550.0),
        _ => None,
    }
}

/// The three standards, deployed well before the dataset
pub fn standards() -> CalibrationSet {
    CalibrationSet::new(base_time() - Duration::days(30))
        .with_standard("STD1", XCO2, 250.0)
        .with_standard("STD2", XCO2, 400.0)
        .with_standard("STD3", XCO2, 550.0)
}

/// Build the underway dataset.
///
/// xCO₂ values carry ids `minute + 1`; run types carry ids `1000 + minute`.
pub fn underway_dataset(offset_before: f64, offset_after: f64, seawater: f64) -> DatasetSensorValues {
    let mut dataset = DatasetSensorValues::new(
        DATASET_ID,
        Arc::new(TestInstrument::underway_pco2()),
        UserOverrideResolver::shared(),
    );

    for (minute, run_type) in UNDERWAY_RUN_TYPES.iter().enumerate() {
        let minute = minute as i64;

        dataset
            .add(reading(9, minutes(minute), run_type, Flag::Good).with_id(1000 + minute))
            .unwrap();

        let offset = if minute < SECOND_CALIBRATION {
            offset_before
        } else {
            offset_after
        };
        let xco2 = concentration(run_type).unwrap_or(seawater) + offset;
        dataset
            .add(reading(1, minutes(minute), &xco2.to_string(), Flag::Good).with_id(minute + 1))
            .unwrap();

        if minute % 5 == 0 {
            let temperature = 10.0 + (minute / 5) as f64;
            dataset
                .add(reading(2, minutes(minute), &temperature.to_string(), Flag::Good))
                .unwrap();
        }
    }

    dataset
}

/// Group measurements the way the calculator reads them
pub fn grouped(measurements: &[Measurement]) -> DatasetMeasurements {
    let mut grouped = DatasetMeasurements::new();
    for measurement in measurements {
        grouped.add_measurement(measurement.clone()).unwrap();
    }
    grouped
}

/// Calibration source holding at most one set
pub struct FixedCalibrations(pub Option<CalibrationSet>);

impl CalibrationProvider for FixedCalibrations {
    type Connection = ();

    fn calibrations_at(&self, _connection: &(), instrument_id: i64, time: NaiveDateTime) -> CalibrationResult<CalibrationSet> {
        match &self.0 {
            Some(set) if set.deployment_date() <= time => Ok(set.clone()),
            _ => Err(CalibrationError::NoCalibrations {
                instrument_id,
                time: time.to_string(),
            }),
        }
    }
}
