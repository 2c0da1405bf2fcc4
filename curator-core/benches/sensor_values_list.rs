//! Sensor value list benchmarks
//!
//! Measures insertion (in order and shuffled) and point queries on a day of
//! one-minute readings.
//!
//! ```bash
//! cargo bench -p curator-core
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use curator_core::sensor_values_list::{SensorValuesList, TimestampSensorValuesList};
use curator_core::{
    Basis, Coordinate, InstrumentDescriptor, RecordNotFound, RunTypeCategory, SensorType, SensorValue,
    UserOverrideResolver, Variable,
};

const READINGS: i64 = 24 * 60;

struct Thermosalinograph(SensorType);

impl InstrumentDescriptor for Thermosalinograph {
    fn id(&self) -> i64 {
        1
    }

    fn basis(&self) -> Basis {
        Basis::Time
    }

    fn sensor_type_for_column(&self, _column_id: i64) -> Result<&SensorType, RecordNotFound> {
        Ok(&self.0)
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

fn time(minute: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::minutes(minute)
}

fn readings() -> Vec<Arc<SensorValue>> {
    (0..READINGS)
        .map(|minute| {
            let coordinate = Coordinate::time(1, time(minute)).unwrap();
            let value = format!("{:.3}", 10.0 + (minute as f64 / 60.0).sin());
            Arc::new(SensorValue::new(1, 1, coordinate, Some(&value)))
        })
        .collect()
}

fn build(instrument: &Thermosalinograph, values: &[Arc<SensorValue>]) -> TimestampSensorValuesList {
    let mut list = TimestampSensorValuesList::new([1], instrument, UserOverrideResolver::shared()).unwrap();
    for value in values {
        list.add(Arc::clone(value)).unwrap();
    }
    list
}

fn insertion(c: &mut Criterion) {
    let instrument = Thermosalinograph(SensorType::new(1, "Water Temperature"));
    let ordered = readings();

    // Deterministic interleave: evens ascending, then odds descending
    let mut shuffled: Vec<Arc<SensorValue>> = ordered.iter().step_by(2).cloned().collect();
    shuffled.extend(ordered.iter().skip(1).step_by(2).rev().cloned());

    c.bench_function("insert_in_order", |b| {
        b.iter(|| build(&instrument, black_box(&ordered)))
    });

    c.bench_function("insert_shuffled", |b| {
        b.iter(|| build(&instrument, black_box(&shuffled)))
    });
}

fn queries(c: &mut Criterion) {
    let instrument = Thermosalinograph(SensorType::new(1, "Water Temperature"));
    let values = readings();

    // Half-minute targets force interpolation
    let targets: Vec<Coordinate> = (0..READINGS - 1)
        .map(|minute| Coordinate::time(1, time(minute) + Duration::seconds(30)).unwrap())
        .collect();

    c.bench_function("first_output_build", |b| {
        b.iter_batched(
            || build(&instrument, &values),
            |list| list.values_size().unwrap(),
            BatchSize::SmallInput,
        )
    });

    let list = build(&instrument, &values);
    list.values_size().unwrap();

    c.bench_function("interpolated_point_query", |b| {
        b.iter(|| {
            for target in &targets {
                black_box(list.get_value(target, true).unwrap());
            }
        })
    });
}

criterion_group!(benches, insertion, queries);
criterion_main!(benches);
