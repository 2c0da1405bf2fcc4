//! Measurement mode classification and output construction for time-based
//! lists
//!
//! ## Classification
//!
//! Instruments either sample continuously (one reading every few seconds,
//! each reading used on its own) or periodically (wake up, take a short burst
//! of readings, sleep). Walking the raw values in time order, a new group
//! starts whenever the gap to the previous value exceeds
//! [`CONTINUOUS_MEASUREMENT_LIMIT_SECS`], or in string mode whenever the
//! value changes. The list is periodic when there is more than one time
//! boundary, the mean group size is at most [`MAX_PERIODIC_GROUP_SIZE`] and
//! no more than [`LARGE_GROUP_LIMIT`] groups exceed that size.
//!
//! ## Group values
//!
//! A numeric group is summarised by the mean of the members carrying the
//! best flag present. Its coordinate is the midpoint of the group's span.

use core::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::constants::{CONTINUOUS_MEASUREMENT_LIMIT_SECS, LARGE_GROUP_LIMIT, MAX_PERIODIC_GROUP_SIZE};
use crate::coordinate::Coordinate;
use crate::errors::{ListResult, SensorValuesListError};
use crate::flag::Flag;
use crate::sensor_value::SensorValue;
use crate::time::{interpolate, midpoint, seconds_between};

use super::storage::OrderedSensorValues;
use super::value::{combine_messages, ListValuePayload, SensorValuesListValue, ValueExtent};

/// Sampling cadence of a time-based list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementMode {
    /// Every raw value is an output value
    Continuous,
    /// Bursts of raw values are summarised as one output value
    Periodic,
}

impl fmt::Display for MeasurementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementMode::Continuous => f.write_str("continuous"),
            MeasurementMode::Periodic => f.write_str("periodic"),
        }
    }
}

/// Classify ordered raw values as continuous or periodic
pub fn classify_measurement_mode(values: &[Arc<SensorValue>], string_mode: bool) -> MeasurementMode {
    let mut large_group_count = 0usize;
    let mut groups_by_time = 0usize;
    let mut total_group_count = 0usize;
    let mut mean_group_size = 0f64;
    let mut group_size = 0usize;

    let mut close_group = |size: usize| {
        if size > MAX_PERIODIC_GROUP_SIZE {
            large_group_count += 1;
        }
        total_group_count += 1;
        mean_group_size += (size as f64 - mean_group_size) / total_group_count as f64;
    };

    for pair in values.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);

        let new_group_from_time = match (previous.coordinate().timestamp(), current.coordinate().timestamp()) {
            (Some(a), Some(b)) => seconds_between(a, b) > CONTINUOUS_MEASUREMENT_LIMIT_SECS,
            _ => false,
        };

        let new_group_from_value = string_mode && previous.value() != current.value();

        if new_group_from_time || new_group_from_value {
            if new_group_from_time {
                groups_by_time += 1;
            }

            if group_size > 0 {
                close_group(group_size);
                group_size = 0;
            }
        }

        group_size += 1;
    }

    if group_size > 0 {
        close_group(group_size);
    }

    if groups_by_time > 1
        && mean_group_size <= MAX_PERIODIC_GROUP_SIZE as f64
        && large_group_count <= LARGE_GROUP_LIMIT
    {
        MeasurementMode::Periodic
    } else {
        MeasurementMode::Continuous
    }
}

/// The stored coordinate at `time` if a raw value sits there, otherwise a new
/// unstored one
pub(crate) fn coordinate_at(storage: &OrderedSensorValues, dataset_id: i64, time: NaiveDateTime) -> ListResult<Coordinate> {
    let dummy = Coordinate::time(dataset_id, time)?;
    Ok(match storage.index_of(&dummy) {
        Some(index) => storage.coordinates()[index],
        None => dummy,
    })
}

/// An output value for one raw value
pub(crate) fn single_value(storage: &OrderedSensorValues, value: &Arc<SensorValue>, extent: ValueExtent) -> SensorValuesListValue {
    SensorValuesListValue::new(
        Arc::clone(storage.sensor_type()),
        *value.coordinate(),
        extent,
        storage.payload(value),
        storage.display_flag(value),
        storage.display_message(value),
        vec![Arc::clone(value)],
    )
}

/// Continuous outputs: every value with a payload that is not flushing
pub(crate) fn continuous_values(storage: &OrderedSensorValues) -> Vec<SensorValuesListValue> {
    storage
        .values()
        .iter()
        .filter(|v| v.value().is_some() && v.user_flag() != Flag::Flushing)
        .map(|v| {
            let coordinate = *v.coordinate();
            single_value(
                storage,
                v,
                ValueExtent::Span {
                    start: coordinate,
                    end: coordinate,
                },
            )
        })
        .collect()
}

/// Summarise a set of raw values as one numeric value.
///
/// NaN and flushing members are ignored. The value is the mean of the
/// members with the best flag present. If `allow_interpolates_around_flags`
/// is set and worse-flagged members were left out, the result is marked as
/// interpolating around flags. Returns `None` if no member is usable.
pub(crate) fn make_numeric_value(
    storage: &OrderedSensorValues,
    members: &[Arc<SensorValue>],
    nominal: Coordinate,
    allow_interpolates_around_flags: bool,
) -> ListResult<Option<SensorValuesListValue>> {
    let usable: Vec<(&Arc<SensorValue>, Flag)> = members
        .iter()
        .map(|v| (v, storage.display_flag(v)))
        .filter(|(v, flag)| !v.is_nan() && *flag != Flag::Flushing)
        .collect();

    let (start, end) = match (usable.first(), usable.last()) {
        (Some(first), Some(last)) => (*first.0.coordinate(), *last.0.coordinate()),
        _ => return Ok(None),
    };

    let mut present_flags: Vec<Flag> = Vec::new();
    for (_, flag) in &usable {
        if !present_flags.contains(flag) {
            present_flags.push(*flag);
        }
    }

    let chosen_flag = if present_flags.iter().any(|f| f.is_good()) {
        Flag::Good
    } else if present_flags.contains(&Flag::Questionable) {
        Flag::Questionable
    } else if present_flags.contains(&Flag::Bad) {
        Flag::Bad
    } else {
        return Err(SensorValuesListError::NoValidFlags);
    };

    let used: Vec<Arc<SensorValue>> = usable
        .iter()
        .filter(|(_, flag)| {
            if chosen_flag.is_good() {
                flag.is_good()
            } else {
                *flag == chosen_flag
            }
        })
        .map(|(v, _)| Arc::clone(v))
        .collect();

    let interpolates_around_flags =
        allow_interpolates_around_flags && Flag::contains_worse_flag(&present_flags, chosen_flag);

    let messages: Vec<String> = used.iter().map(|v| storage.display_message(v)).collect();
    let mean = used.iter().map(|v| v.double_value()).sum::<f64>() / used.len() as f64;

    let value = SensorValuesListValue::new(
        Arc::clone(storage.sensor_type()),
        nominal,
        ValueExtent::Span { start, end },
        ListValuePayload::Numeric(mean),
        chosen_flag,
        combine_messages(messages.iter().map(String::as_str)),
        used,
    )
    .with_interpolates_around_flags(interpolates_around_flags);

    Ok(Some(value))
}

/// Periodic numeric outputs: one value per burst of usable values
pub(crate) fn periodic_numeric_values(storage: &OrderedSensorValues) -> ListResult<Vec<SensorValuesListValue>> {
    let mut outputs = Vec::new();
    let mut group: Vec<Arc<SensorValue>> = Vec::new();
    let mut span: Option<(NaiveDateTime, NaiveDateTime)> = None;

    for value in storage.values() {
        if value.is_nan() || value.user_flag() == Flag::Flushing {
            continue;
        }

        let Some(time) = value.coordinate().timestamp() else {
            continue;
        };

        if let Some((start, end)) = span {
            if seconds_between(end, time) > CONTINUOUS_MEASUREMENT_LIMIT_SECS {
                push_numeric_group(storage, &group, start, end, &mut outputs)?;
                group.clear();
                span = None;
            }
        }

        span = Some(match span {
            Some((start, _)) => (start, time),
            None => (time, time),
        });
        group.push(Arc::clone(value));
    }

    if let Some((start, end)) = span {
        push_numeric_group(storage, &group, start, end, &mut outputs)?;
    }

    Ok(outputs)
}

fn push_numeric_group(
    storage: &OrderedSensorValues,
    group: &[Arc<SensorValue>],
    start: NaiveDateTime,
    end: NaiveDateTime,
    outputs: &mut Vec<SensorValuesListValue>,
) -> ListResult<()> {
    if let Some(first) = group.first() {
        let nominal = coordinate_at(storage, first.coordinate().dataset_id(), midpoint(start, end))?;
        if let Some(value) = make_numeric_value(storage, group, nominal, false)? {
            outputs.push(value);
        }
    }
    Ok(())
}

/// Periodic string outputs: a new group on every value change or time gap
pub(crate) fn periodic_string_values(storage: &OrderedSensorValues) -> ListResult<Vec<SensorValuesListValue>> {
    let mut outputs = Vec::new();
    let mut group: Vec<Arc<SensorValue>> = Vec::new();
    let mut group_end: Option<NaiveDateTime> = None;

    for value in storage.values() {
        let text = match value.value() {
            Some(text) if !text.is_empty() => text,
            _ => continue,
        };

        if value.user_flag() == Flag::Flushing {
            continue;
        }

        let Some(time) = value.coordinate().timestamp() else {
            continue;
        };

        let ends_group = match (group.first(), group_end) {
            (Some(first), Some(end)) => {
                first.value() != Some(text) || seconds_between(end, time) > CONTINUOUS_MEASUREMENT_LIMIT_SECS
            }
            _ => false,
        };

        if ends_group {
            if let Some(output) = string_group_value(storage, &group)? {
                outputs.push(output);
            }
            group.clear();
        }

        group.push(Arc::clone(value));
        group_end = Some(time);
    }

    if let Some(output) = string_group_value(storage, &group)? {
        outputs.push(output);
    }

    Ok(outputs)
}

fn string_group_value(
    storage: &OrderedSensorValues,
    group: &[Arc<SensorValue>],
) -> ListResult<Option<SensorValuesListValue>> {
    let (first, last) = match (group.first(), group.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(None),
    };

    let (Some(start_time), Some(end_time)) = (first.coordinate().timestamp(), last.coordinate().timestamp()) else {
        return Ok(None);
    };

    let nominal = coordinate_at(storage, first.coordinate().dataset_id(), midpoint(start_time, end_time))?;

    Ok(Some(SensorValuesListValue::new(
        Arc::clone(storage.sensor_type()),
        nominal,
        ValueExtent::Span {
            start: *first.coordinate(),
            end: *last.coordinate(),
        },
        ListValuePayload::Text(first.value().unwrap_or_default().to_string()),
        storage.display_flag(first),
        storage.display_message(first),
        group.to_vec(),
    )))
}

/// Interpolate between two outputs at `target`.
///
/// Only interpolates when both outputs exist and both are good. The result
/// spans from the start of `prior` to the end of `post`, combines their
/// sources and messages, and takes the more significant flag.
pub(crate) fn build_interpolated_value(
    prior: Option<&SensorValuesListValue>,
    post: Option<&SensorValuesListValue>,
    target: &Coordinate,
    interpolates_around_flags: bool,
) -> Option<SensorValuesListValue> {
    let (first, second) = (prior?, post?);

    if !first.flag().is_good() || !second.flag().is_good() {
        return None;
    }

    let value = interpolate(
        first.time()?,
        first.double_value(),
        second.time()?,
        second.double_value(),
        target.timestamp()?,
    );

    let mut sources: Vec<Arc<SensorValue>> = first.sources().iter().chain(second.sources()).cloned().collect();
    sources.sort_by(|a, b| {
        a.coordinate()
            .partial_cmp(b.coordinate())
            .unwrap_or(core::cmp::Ordering::Equal)
    });
    sources.dedup_by(|a, b| a.coordinate() == b.coordinate());

    let result = SensorValuesListValue::new(
        Arc::clone(first.shared_sensor_type()),
        *target,
        ValueExtent::Span {
            start: *first.start(),
            end: *second.end(),
        },
        ListValuePayload::Numeric(value),
        Flag::most_significant(first.flag(), second.flag()),
        combine_messages([first.message(), second.message()]),
        sources,
    )
    .interpolated()
    .with_interpolates_around_flags(interpolates_around_flags);

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn value_at(seconds: i64, payload: &str) -> Arc<SensorValue> {
        let coordinate = Coordinate::time(1, base() + Duration::seconds(seconds)).unwrap();
        Arc::new(SensorValue::new(1, 1, coordinate, Some(payload)))
    }

    fn bursts(count: usize, size: usize, gap_seconds: i64) -> Vec<Arc<SensorValue>> {
        let mut values = Vec::new();
        for burst in 0..count {
            for reading in 0..size {
                let seconds = burst as i64 * gap_seconds + reading as i64 * 5;
                values.push(value_at(seconds, "1.0"));
            }
        }
        values
    }

    #[test]
    fn evenly_spaced_values_are_continuous() {
        let values: Vec<_> = (0..30).map(|i| value_at(i * 5, "1.0")).collect();
        assert_eq!(classify_measurement_mode(&values, false), MeasurementMode::Continuous);
    }

    #[test]
    fn short_bursts_are_periodic() {
        let values = bursts(10, 5, 3 * 3600);
        assert_eq!(classify_measurement_mode(&values, false), MeasurementMode::Periodic);
    }

    #[test]
    fn single_gap_is_continuous() {
        let values = bursts(2, 5, 3600);
        assert_eq!(classify_measurement_mode(&values, false), MeasurementMode::Continuous);
    }

    #[test]
    fn long_bursts_are_continuous() {
        let values = bursts(4, 40, 3 * 3600);
        assert_eq!(classify_measurement_mode(&values, false), MeasurementMode::Continuous);
    }

    #[test]
    fn too_many_large_groups_are_continuous() {
        // Six groups of 30 push the large-group count over its limit, while
        // many small groups keep the mean size low.
        let mut values = bursts(6, 30, 3 * 3600);
        let offset = 6 * 3 * 3600;
        for burst in 0..40 {
            values.push(value_at(offset + burst * 3 * 3600, "1.0"));
        }
        assert_eq!(classify_measurement_mode(&values, false), MeasurementMode::Continuous);
    }

    #[test]
    fn string_changes_do_not_count_as_time_boundaries() {
        let values: Vec<_> = (0..20)
            .map(|i| value_at(i * 5, if i % 2 == 0 { "A" } else { "B" }))
            .collect();
        assert_eq!(classify_measurement_mode(&values, true), MeasurementMode::Continuous);
    }
}
