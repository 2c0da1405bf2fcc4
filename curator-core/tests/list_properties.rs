//! Integration tests for sensor value lists
//!
//! Covers the ordering and uniqueness guarantees of raw storage, the
//! continuous/periodic classification fixtures and point queries.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use curator_core::sensor_values_list::{
    make_sensor_values_list, MeasurementMode, SensorValuesList, SimpleSensorValuesList,
    TimestampSensorValuesList,
};
use curator_core::{Flag, SensorValuesListError, UserOverrideResolver};

use common::generators::{bursts, evenly_spaced, good, level, minutes, reading, seconds};
use common::{assert_close, TestInstrument};

fn timestamp_list() -> TimestampSensorValuesList {
    TimestampSensorValuesList::new([1], &TestInstrument::thermometer(), UserOverrideResolver::shared()).unwrap()
}

fn profile_list() -> SimpleSensorValuesList {
    SimpleSensorValuesList::new([1], &TestInstrument::float(), UserOverrideResolver::shared()).unwrap()
}

proptest! {
    #[test]
    fn raw_values_stay_sorted(offsets in prop::collection::vec(0i64..100_000, 1..60)) {
        let mut list = timestamp_list();
        for offset in &offsets {
            let _ = list.add(good(1, seconds(*offset), 1.0));
        }

        let coordinates = list.raw_coordinates();
        prop_assert!(coordinates.windows(2).all(|pair| pair[0] < pair[1]));

        let unique: BTreeSet<i64> = offsets.iter().copied().collect();
        prop_assert_eq!(coordinates.len(), unique.len());
    }

    #[test]
    fn duplicates_always_rejected(
        offsets in prop::collection::btree_set(0i64..10_000, 1..30),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut list = timestamp_list();
        for offset in &offsets {
            list.add(good(1, seconds(*offset), 1.0)).unwrap();
        }

        let chosen = offsets.iter().nth(pick.index(offsets.len())).copied().unwrap();
        let result = list.add(good(1, seconds(chosen), 2.0));

        prop_assert!(
            matches!(result, Err(SensorValuesListError::DuplicateCoordinate { .. })),
            "expected duplicate error, got {:?}",
            result
        );
        prop_assert_eq!(list.raw_size(), offsets.len());
    }

    #[test]
    fn interpolation_is_linear(
        v1 in -1000.0f64..1000.0,
        v2 in -1000.0f64..1000.0,
        gap in 2i64..=300,
        at in 1i64..300,
    ) {
        prop_assume!(at < gap);

        let mut list = timestamp_list();
        list.add(good(1, seconds(0), v1)).unwrap();
        list.add(good(1, seconds(gap), v2)).unwrap();

        let value = list.get_value(&seconds(at), true).unwrap().unwrap();
        prop_assert!(value.is_interpolated());

        let expected = v1 + (v2 - v1) * at as f64 / gap as f64;
        prop_assert!((value.double_value() - expected).abs() < 1e-6);
    }
}

#[test]
fn mixed_bases_rejected() {
    let mut list = timestamp_list();
    list.add(good(1, minutes(0), 1.0)).unwrap();

    let result = list.add(good(1, level(1), 2.0));
    assert_eq!(result, Err(SensorValuesListError::IncompatibleCoordinateType));

    let mut profile = profile_list();
    profile.add(good(1, level(1), 1.0)).unwrap();
    let result = profile.add(good(1, minutes(0), 2.0));
    assert_eq!(result, Err(SensorValuesListError::IncompatibleCoordinateType));
    assert_eq!(profile.raw_size(), 1);
}

#[test]
fn raw_lookup_returns_same_value() {
    let mut list = timestamp_list();
    let value = good(1, minutes(4), 12.5);
    list.add(Arc::clone(&value)).unwrap();
    list.add(good(1, minutes(2), 11.0)).unwrap();

    let found = list.raw_sensor_value(&minutes(4)).unwrap();
    assert!(Arc::ptr_eq(found, &value));
    assert!(list.raw_sensor_value(&minutes(3)).is_none());
}

#[test]
fn minutes_one_three_five_ten() {
    let mut list = timestamp_list();
    for (minute, value) in [(10, 20.0), (1, 11.0), (5, 15.0), (3, 13.0)] {
        list.add(good(1, minutes(minute), value)).unwrap();
    }

    assert_eq!(
        list.raw_coordinates(),
        &[minutes(1), minutes(3), minutes(5), minutes(10)]
    );
    assert_eq!(list.measurement_mode(), MeasurementMode::Continuous);

    let value = list.get_value(&minutes(7), true).unwrap().unwrap();
    assert!(value.is_interpolated());
    assert_close(value.double_value(), 15.0 + (20.0 - 15.0) * 2.0 / 5.0);
    assert_eq!(value.coordinate(), &minutes(7));
}

#[test]
fn evenly_spaced_fixture_is_continuous() {
    let mut list = timestamp_list();
    for value in evenly_spaced(1, 30, 5) {
        list.add(value).unwrap();
    }

    assert_eq!(list.measurement_mode(), MeasurementMode::Continuous);
    assert_eq!(list.values_size().unwrap(), 30);
}

#[test]
fn burst_fixture_is_periodic() {
    let mut list = timestamp_list();
    for value in bursts(1, 10, 5, 3 * 3600) {
        list.add(value).unwrap();
    }

    assert_eq!(list.measurement_mode(), MeasurementMode::Periodic);

    let values = list.values().unwrap();
    assert_eq!(values.len(), 10);
    // Members of a burst are 5 s apart, so the group midpoint is 10 s in
    assert_eq!(values[1].coordinate(), &seconds(3 * 3600 + 10));
    assert_close(values[1].double_value(), 1.0);
}

#[test]
fn output_rebuilt_after_mutation() {
    let mut list = timestamp_list();
    list.add(good(1, minutes(0), 1.0)).unwrap();
    assert_eq!(list.values_size().unwrap(), 1);

    let later = good(1, minutes(1), 2.0);
    list.add(Arc::clone(&later)).unwrap();
    assert_eq!(list.values_size().unwrap(), 2);

    assert!(list.remove(&later));
    assert_eq!(list.values_size().unwrap(), 1);
    assert!(!list.remove(&later));
}

#[test]
fn factory_picks_strategy_from_basis() {
    let resolver = UserOverrideResolver::shared();

    let time_based = make_sensor_values_list([1], &TestInstrument::thermometer(), Arc::clone(&resolver), false).unwrap();
    assert!(time_based.as_timestamp().is_some());

    let profile_based = make_sensor_values_list([1], &TestInstrument::float(), resolver, false).unwrap();
    assert!(profile_based.as_timestamp().is_none());
}

#[test]
fn profile_lists_need_exact_matches() {
    let mut list = profile_list();
    list.add(good(1, level(1), 5.0)).unwrap();
    list.add(good(1, level(3), 7.0)).unwrap();

    assert_close(list.get_value(&level(3), true).unwrap().unwrap().double_value(), 7.0);
    assert!(list.get_value(&level(2), true).unwrap().is_none());
}

#[test]
fn bad_exact_match_replaced_by_interpolation() {
    let mut list = timestamp_list();
    list.add(good(1, minutes(0), 10.0)).unwrap();
    list.add(Arc::new(reading(1, minutes(1), "99.0", Flag::Bad))).unwrap();
    list.add(good(1, minutes(2), 12.0)).unwrap();

    let value = list.get_value(&minutes(1), true).unwrap().unwrap();
    assert!(value.interpolates_around_flags());
    assert_close(value.double_value(), 11.0);

    let exact = list.get_value(&minutes(1), false).unwrap().unwrap();
    assert_eq!(exact.flag(), Flag::Bad);
}
