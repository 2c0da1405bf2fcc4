//! Integration tests for measurement location and calculation
//!
//! Runs the underway pCO₂ scenario from sensor values through run type
//! periods, measurement location and calibrated value calculation.

mod common;

use curator_core::{
    CalculationContext, CalculatorError, DefaultMeasurementValueCalculator, Flag, Measurement,
    MeasurementLocator, MeasurementValueCalculator, RunTypeMeasurementLocator, RunTypePeriods,
    Variable,
};

use common::generators::minutes;
use common::scenarios::{grouped, standards, underway_dataset, FixedCalibrations, XCO2};
use common::{assert_close, sensor_types, TestInstrument};

fn pco2() -> Variable {
    TestInstrument::underway_pco2().variables.remove(0)
}

fn seawater(measurements: &[Measurement]) -> Vec<Measurement> {
    measurements
        .iter()
        .filter(|m| m.run_type(1) == Some("EQU"))
        .cloned()
        .collect()
}

#[test]
fn run_type_periods_cover_dataset() {
    let dataset = underway_dataset(2.0, 2.0, 380.0);
    let periods = RunTypePeriods::from_values(dataset.run_types().unwrap()).unwrap();

    assert!(periods.is_finished());
    assert_eq!(periods.len(), 7);

    let equilibrate = &periods.periods()[3];
    assert_eq!(equilibrate.run_type(), "EQU");
    assert!(equilibrate.encompasses(&minutes(6)));
    assert!(equilibrate.encompasses(&minutes(10)));
    assert!(equilibrate.encompasses(&minutes(15)));
    assert!(!equilibrate.encompasses(&minutes(16)));
    assert!(!equilibrate.encompasses(&minutes(5)));

    // The last period runs on after finishing
    assert_eq!(periods.run_type_at(&minutes(1000)), Some("STD3"));
    assert_eq!(periods.run_type_names().len(), 4);
}

#[test]
fn measurements_located_from_run_types() {
    let dataset = underway_dataset(2.0, 2.0, 380.0);
    let measurements = RunTypeMeasurementLocator::new().locate(&dataset).unwrap();

    assert_eq!(measurements.len(), 22);
    assert_eq!(measurements[0].run_type(1), Some("STD1"));
    assert_eq!(measurements[6].run_type(1), Some("EQU"));
    assert_eq!(measurements[16].run_type(1), Some("STD1"));
    assert_eq!(seawater(&measurements).len(), 10);

    let grouped = grouped(&measurements);
    let run = grouped.measurements_in_same_run(1, &measurements[10]);
    assert_eq!(run.len(), 10);
    assert_eq!(run[0].coordinate(), &minutes(6));
}

#[test]
fn constant_offset_removed() {
    let dataset = underway_dataset(2.0, 2.0, 380.0);
    let located = RunTypeMeasurementLocator::new().locate(&dataset).unwrap();
    let grouped = grouped(&located);
    let calibrations = FixedCalibrations(Some(standards()));

    let context = CalculationContext {
        sensor_values: &dataset,
        measurements: &grouped,
        calibrations: &calibrations,
        connection: &(),
    };

    let variable = pco2();
    let mut measurements = seawater(&located);
    let failures = DefaultMeasurementValueCalculator::new().calculate_all(
        &context,
        &mut measurements,
        &variable,
        &[sensor_types::xco2()],
    );
    assert!(failures.is_empty());

    for measurement in &measurements {
        let value = measurement.measurement_value(1, sensor_types::xco2().id).unwrap();
        assert_close(value.calculated_value(), 380.0);
        assert_eq!(value.member_count(), 1);
        assert!(value.flag().is_good());
    }

    // Minute 10 uses the STD1 readings at minutes 1 and 16 among others
    let value = measurements[4].measurement_value(1, sensor_types::xco2().id).unwrap();
    assert!(value.sensor_value_ids().contains(&11));
    assert!(value.supporting_sensor_value_ids().contains(&2));
    assert!(value.supporting_sensor_value_ids().contains(&17));
}

#[test]
fn drifting_offset_interpolated_in_time() {
    let dataset = underway_dataset(2.0, 4.0, 380.0);
    let located = RunTypeMeasurementLocator::new().locate(&dataset).unwrap();
    let grouped = grouped(&located);
    let calibrations = FixedCalibrations(Some(standards()));

    let context = CalculationContext {
        sensor_values: &dataset,
        measurements: &grouped,
        calibrations: &calibrations,
        connection: &(),
    };

    let minute_ten = located
        .iter()
        .find(|m| m.coordinate() == &minutes(10))
        .unwrap();

    let value = DefaultMeasurementValueCalculator::new()
        .calculate(&context, minute_ten, &pco2(), &sensor_types::xco2())
        .unwrap();

    // Offsets at minute 10: STD1 3.2, STD2 2 + 14/15, STD3 2 + 10/15.
    // The fit through them gives 2 + 14/15 + 36/1125 at the raw value 382.
    let offset = 2.0 + 14.0 / 15.0 + 36.0 / 1125.0;
    assert!((value.calculated_value() - (382.0 - offset)).abs() < 1e-6);
}

#[test]
fn fewer_standards_flagged_bad() {
    let dataset = underway_dataset(2.0, 2.0, 380.0);
    let located = RunTypeMeasurementLocator::new().locate(&dataset).unwrap();
    let grouped = grouped(&located);

    let deployed = standards().deployment_date();
    let two_standards = curator_core::CalibrationSet::new(deployed)
        .with_standard("STD1", XCO2, 250.0)
        .with_standard("STD2", XCO2, 400.0);
    let calibrations = FixedCalibrations(Some(two_standards));

    let context = CalculationContext {
        sensor_values: &dataset,
        measurements: &grouped,
        calibrations: &calibrations,
        connection: &(),
    };

    let value = DefaultMeasurementValueCalculator::new()
        .calculate(&context, &located[8], &pco2(), &sensor_types::xco2())
        .unwrap();

    assert_eq!(value.flag(), Flag::Bad);
    assert_eq!(value.qc_messages(), &["Fewer than 3 standards used for calibration".to_string()]);
    assert_close(value.calculated_value(), 380.0);
}

#[test]
fn failures_collected_and_processing_continues() {
    let dataset = underway_dataset(2.0, 2.0, 380.0);
    let located = RunTypeMeasurementLocator::new().locate(&dataset).unwrap();
    let grouped = grouped(&located);
    let calibrations = FixedCalibrations(None);

    let context = CalculationContext {
        sensor_values: &dataset,
        measurements: &grouped,
        calibrations: &calibrations,
        connection: &(),
    };

    let mut measurements = seawater(&located);
    let sensor_types = [
        sensor_types::xco2(),
        sensor_types::water_temperature(),
        sensor_types::salinity(),
    ];
    let failures = DefaultMeasurementValueCalculator::new().calculate_all(
        &context,
        &mut measurements,
        &pco2(),
        &sensor_types,
    );

    // No calibrations for xCO₂ and no column for salinity, per measurement
    assert_eq!(failures.len(), 20);
    assert!(failures
        .iter()
        .filter(|f| f.sensor_type_id == sensor_types[0].id)
        .all(|f| matches!(f.error, CalculatorError::Calibration(_))));
    assert!(failures
        .iter()
        .filter(|f| f.sensor_type_id == sensor_types[2].id)
        .all(|f| matches!(f.error, CalculatorError::RecordNotFound(_))));

    // Temperature is still calculated, interpolated between minutes 5 and 10
    let minute_seven = measurements
        .iter()
        .find(|m| m.coordinate() == &minutes(7))
        .unwrap();
    let temperature = minute_seven
        .measurement_value(1, sensor_types[1].id)
        .unwrap();
    assert_close(temperature.calculated_value(), 11.4);
    assert!(minute_seven.measurement_value(1, sensor_types[0].id).is_none());
}
