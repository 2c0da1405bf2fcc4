//! Building Sensor Value Lists
//!
//! This example loads a morning of water temperature readings into a
//! time-based list and shows how the list turns raw readings into values
//! ready for calculations.
//!
//! ## What You'll Learn
//!
//! - Adding readings in any order and reading them back sorted
//! - How duplicate coordinates are rejected
//! - Continuous vs periodic sampling
//! - Point queries with and without interpolation
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_building_lists
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use curator_core::sensor_values_list::{SensorValuesList, TimestampSensorValuesList};
use curator_core::{
    Basis, Coordinate, Flag, InstrumentDescriptor, RecordNotFound, RunTypeCategory, SensorType,
    SensorValue, UserOverrideResolver, Variable,
};

/// A thermometer logging to column 1
struct Thermometer(SensorType);

impl InstrumentDescriptor for Thermometer {
    fn id(&self) -> i64 {
        1
    }

    fn basis(&self) -> Basis {
        Basis::Time
    }

    fn sensor_type_for_column(&self, column_id: i64) -> Result<&SensorType, RecordNotFound> {
        match column_id {
            1 => Ok(&self.0),
            _ => Err(RecordNotFound::new("Sensor type for column", column_id)),
        }
    }

    fn column_ids(&self, _sensor_type: &SensorType) -> Vec<i64> {
        vec![1]
    }

    fn variables(&self) -> &[Variable] {
        &[]
    }

    fn run_type_category(&self, _run_type: &str) -> Option<RunTypeCategory> {
        None
    }

    fn run_type_column(&self) -> Option<i64> {
        None
    }
}

fn time(minutes: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
        + Duration::minutes(minutes)
}

fn reading(minutes: i64, value: &str, flag: Flag) -> Result<Arc<SensorValue>, Box<dyn std::error::Error>> {
    let coordinate = Coordinate::time(1, time(minutes))?;
    Ok(Arc::new(
        SensorValue::new(1, 1, coordinate, Some(value)).with_user_qc(flag, ""),
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Curator Sensor Value List Example");
    println!("=================================\n");

    let thermometer = Thermometer(SensorType::new(1, "Water Temperature"));
    let mut list = TimestampSensorValuesList::new([1], &thermometer, UserOverrideResolver::shared())?;

    // Readings arrive out of order; the list keeps them sorted
    println!("Adding readings:");
    for (minute, value) in [(10, "14.2"), (1, "13.1"), (5, "13.6"), (3, "13.4")] {
        list.add(reading(minute, value, Flag::Good)?)?;
        println!("  minute {:2}: {}°C", minute, value);
    }

    println!("\nRaw coordinates in order:");
    for coordinate in list.raw_coordinates() {
        println!("  {}", coordinate);
    }

    // A second reading at the same time is refused
    match list.add(reading(5, "99.9", Flag::Good)?) {
        Ok(()) => println!("\nUnexpectedly accepted a duplicate"),
        Err(e) => println!("\nDuplicate rejected: {}", e),
    }

    println!("\nSampling mode: {}", list.measurement_mode());

    // Point queries
    println!("\nQueries:");
    for minute in [5, 7] {
        let target = Coordinate::time(1, time(minute))?;

        match list.get_value(&target, false)? {
            Some(value) => println!("  minute {} exact:        {:.2}°C", minute, value.double_value()),
            None => println!("  minute {} exact:        no reading", minute),
        }

        if let Some(value) = list.get_value(&target, true)? {
            println!(
                "  minute {} interpolated: {:.2}°C{}",
                minute,
                value.double_value(),
                if value.is_interpolated() { " (interpolated)" } else { "" }
            );
        }
    }

    // A questionable reading is bridged by its good neighbours
    list.add(reading(11, "30.0", Flag::Questionable)?)?;
    list.add(reading(12, "14.4", Flag::Good)?)?;

    let target = Coordinate::time(1, time(11))?;
    if let Some(value) = list.get_value(&target, true)? {
        println!(
            "\nMinute 11 with a questionable reading: {:.2}°C (flag {:?}, around flags: {})",
            value.double_value(),
            value.flag(),
            value.interpolates_around_flags()
        );
    }

    // Periodic sampling: five-reading bursts every three hours
    println!("\nPeriodic sampling:");
    let mut periodic = TimestampSensorValuesList::new([1], &thermometer, UserOverrideResolver::shared())?;
    for burst in 0..4 {
        for i in 0..5 {
            let minute = burst * 180 + i;
            periodic.add(reading(minute, &format!("{}.{}", 12 + burst, i), Flag::Good)?)?;
        }
    }

    println!("  Mode: {}", periodic.measurement_mode());
    for value in periodic.values()? {
        println!(
            "  {} -> {:.2}°C from {} readings",
            value.coordinate(),
            value.double_value(),
            value.sources().len()
        );
    }

    Ok(())
}
