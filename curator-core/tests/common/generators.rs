//! Sensor value builders
//!
//! All coordinates belong to dataset 1 and are offsets from a fixed base
//! time, so expected results can be written in minutes or seconds.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use curator_core::{Coordinate, Direction, Flag, ProfilePosition, SensorValue};

/// Dataset all generated values belong to
pub const DATASET_ID: i64 = 1;

/// Base time of every generated series
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Time `seconds` after the base time
pub fn time_at(seconds: i64) -> NaiveDateTime {
    base_time() + Duration::seconds(seconds)
}

/// Coordinate `seconds` after the base time
pub fn seconds(seconds: i64) -> Coordinate {
    Coordinate::time(DATASET_ID, time_at(seconds)).unwrap()
}

/// Coordinate `minutes` after the base time
pub fn minutes(minutes: i64) -> Coordinate {
    seconds(minutes * 60)
}

/// Profile coordinate at a level of cycle 1
pub fn level(level: i32) -> Coordinate {
    let position = ProfilePosition {
        cycle: 1,
        profile: 0,
        direction: Direction::Ascending,
        level,
        pressure: level as f64 * 10.0,
    };
    Coordinate::profile(DATASET_ID, position).unwrap()
}

/// A value with a user flag
pub fn reading(column_id: i64, coordinate: Coordinate, value: &str, flag: Flag) -> SensorValue {
    SensorValue::new(DATASET_ID, column_id, coordinate, Some(value)).with_user_qc(flag, "")
}

/// A good numeric reading, shared
pub fn good(column_id: i64, coordinate: Coordinate, value: f64) -> Arc<SensorValue> {
    Arc::new(reading(column_id, coordinate, &value.to_string(), Flag::Good))
}

/// `count` good readings `interval` seconds apart, starting at the base time
pub fn evenly_spaced(column_id: i64, count: usize, interval: i64) -> Vec<Arc<SensorValue>> {
    (0..count)
        .map(|i| good(column_id, seconds(i as i64 * interval), 10.0 + i as f64))
        .collect()
}

/// `bursts` groups of `size` readings 5 seconds apart, one group every
/// `gap` seconds
pub fn bursts(column_id: i64, bursts: usize, size: usize, gap: i64) -> Vec<Arc<SensorValue>> {
    let mut values = Vec::with_capacity(bursts * size);
    for burst in 0..bursts {
        for i in 0..size {
            let offset = burst as i64 * gap + i as i64 * 5;
            values.push(good(column_id, seconds(offset), burst as f64));
        }
    }
    values
}
