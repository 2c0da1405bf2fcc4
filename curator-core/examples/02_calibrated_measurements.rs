//! Calibrated Measurements Example
//!
//! This example runs an underway CO₂ analyser's data from raw readings to
//! calibrated measurement values.
//!
//! ## What You'll Learn
//!
//! - Collecting a dataset's sensor values by column
//! - Splitting the dataset into run type periods
//! - Locating measurements from the run type column
//! - Correcting readings against gas standards run before and after
//!
//! ## The Instrument
//!
//! The analyser alternates between three gas standards (STD1-3) and
//! seawater equilibration (EQU). Its readings drift upwards over the hour,
//! which the calibration removes.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_calibrated_measurements
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use curator_core::{
    Basis, CalculationContext, CalibrationError, CalibrationProvider, CalibrationResult, CalibrationSet,
    Coordinate, DatasetMeasurements, DatasetSensorValues, DefaultMeasurementValueCalculator,
    InstrumentDescriptor, MeasurementLocator, MeasurementValueCalculator, RecordNotFound,
    RunTypeCategory, RunTypeMeasurementLocator, RunTypePeriods, SensorType, SensorValue, SensorValuesList,
    UserOverrideResolver, Variable,
};

const XCO2: &str = "xCO₂ (with standards)";

/// Analyser logging xCO₂ to column 1 and its run type to column 2
struct Analyser {
    xco2: SensorType,
    run_type: SensorType,
    variables: Vec<Variable>,
}

impl Analyser {
    fn new() -> Self {
        let xco2 = SensorType::new(1, XCO2).with_internal_calibration();
        Self {
            variables: vec![Variable {
                id: 1,
                name: "Underway Marine pCO₂".to_string(),
                core_sensor_type: xco2.clone(),
                internal_calibrations: true,
            }],
            xco2,
            run_type: SensorType::new(2, "Run Type"),
        }
    }
}

impl InstrumentDescriptor for Analyser {
    fn id(&self) -> i64 {
        1
    }

    fn basis(&self) -> Basis {
        Basis::Time
    }

    fn sensor_type_for_column(&self, column_id: i64) -> Result<&SensorType, RecordNotFound> {
        match column_id {
            1 => Ok(&self.xco2),
            2 => Ok(&self.run_type),
            _ => Err(RecordNotFound::new("Sensor type for column", column_id)),
        }
    }

    fn column_ids(&self, sensor_type: &SensorType) -> Vec<i64> {
        if sensor_type.id == self.xco2.id {
            vec![1]
        } else {
            vec![2]
        }
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn run_type_category(&self, run_type: &str) -> Option<RunTypeCategory> {
        match run_type {
            "EQU" => Some(RunTypeCategory::Measurement),
            "STD1" | "STD2" | "STD3" => Some(RunTypeCategory::InternalCalibration),
            _ => None,
        }
    }

    fn run_type_column(&self) -> Option<i64> {
        Some(2)
    }
}

/// Standards in use since the start of the cruise
struct CruiseStandards(CalibrationSet);

impl CalibrationProvider for CruiseStandards {
    type Connection = ();

    fn calibrations_at(&self, _connection: &(), instrument_id: i64, time: NaiveDateTime) -> CalibrationResult<CalibrationSet> {
        if self.0.deployment_date() <= time {
            Ok(self.0.clone())
        } else {
            Err(CalibrationError::NoCalibrations {
                instrument_id,
                time: time.to_string(),
            })
        }
    }
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn concentration(run_type: &str) -> Option<f64> {
    match run_type {
        "STD1" => Some(250.0),
        "STD2" => Some(400.0),
        "STD3" => Some(550.0),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Curator Calibrated Measurements Example");
    println!("=======================================\n");

    // Two sets of standards around 40 minutes of seawater
    let mut schedule = Vec::new();
    for standard in ["STD1", "STD2", "STD3"] {
        schedule.extend([standard; 3]);
    }
    schedule.extend(["EQU"; 40]);
    for standard in ["STD1", "STD2", "STD3"] {
        schedule.extend([standard; 3]);
    }

    let mut dataset = DatasetSensorValues::new(1, Arc::new(Analyser::new()), UserOverrideResolver::shared());

    for (minute, run_type) in schedule.iter().enumerate() {
        let coordinate = Coordinate::time(1, start() + Duration::minutes(minute as i64))?;

        // The analyser drifts by 0.05 per minute
        let drift = 1.0 + 0.05 * minute as f64;
        let seawater = 385.0 + (minute as f64 / 10.0).sin();
        let reading = concentration(run_type).unwrap_or(seawater) + drift;

        dataset.add(SensorValue::new(1, 2, coordinate, Some(run_type)))?;
        dataset.add(SensorValue::new(1, 1, coordinate, Some(format!("{:.3}", reading).as_str())).with_id(minute as i64 + 1))?;
    }

    println!("Dataset holds {} sensor values\n", dataset.len());

    // Run type periods
    if let Some(run_types) = dataset.run_types() {
        let periods = RunTypePeriods::from_values(run_types)?;
        println!("Run type periods:");
        for period in periods.periods() {
            println!("  {:5} from {}", period.run_type(), period.start());
        }
        println!();
    }

    // Locate and group measurements
    let mut measurements = RunTypeMeasurementLocator::new().locate(&dataset)?;
    let mut grouped = DatasetMeasurements::new();
    for measurement in &measurements {
        grouped.add_measurement(measurement.clone())?;
    }
    println!("Located {} measurements", measurements.len());

    let standards = CruiseStandards(
        CalibrationSet::new(start() - Duration::days(10))
            .with_standard("STD1", XCO2, 250.0)
            .with_standard("STD2", XCO2, 400.0)
            .with_standard("STD3", XCO2, 550.0),
    );

    let context = CalculationContext {
        sensor_values: &dataset,
        measurements: &grouped,
        calibrations: &standards,
        connection: &(),
    };

    let instrument = Analyser::new();
    let variable = &instrument.variables()[0];
    let failures = DefaultMeasurementValueCalculator::new().calculate_all(
        &context,
        &mut measurements,
        variable,
        &[variable.core_sensor_type.clone()],
    );

    println!("Calculation failures: {}\n", failures.len());

    println!("Seawater measurements:");
    println!("  {:20} {:>10} {:>12} {:>6}", "Time", "Raw", "Calibrated", "Flag");
    for measurement in measurements.iter().filter(|m| m.run_type(variable.id) == Some("EQU")) {
        let Some(value) = measurement.measurement_value(variable.id, variable.core_sensor_type.id) else {
            continue;
        };

        let raw = dataset
            .column_values(1)
            .and_then(|list| list.raw_sensor_value(measurement.coordinate()))
            .map(|v| v.double_value())
            .unwrap_or(f64::NAN);

        println!(
            "  {:20} {:>10.3} {:>12.3} {:>6}",
            measurement.coordinate().to_string(),
            raw,
            value.calculated_value(),
            value.flag().as_char()
        );
    }

    Ok(())
}
