//! Time-based list with measurement-mode aware outputs
//!
//! Outputs depend on the list's [`MeasurementMode`]:
//!
//! - **Continuous**: one output per raw value. Point queries interpolate
//!   between the nearest good neighbours within
//!   [`CONTINUOUS_MEASUREMENT_LIMIT_SECS`] of the target.
//! - **Periodic**: one output per burst, placed at the burst's midpoint.
//!   Point queries return the burst covering the target, or choose between
//!   or interpolate the bursts either side.
//!
//! Callers that know the burst boundaries themselves (for example one burst
//! per run type) use [`TimestampSensorValuesList::get_value_in_range`].

use std::cell::OnceCell;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::constants::CONTINUOUS_MEASUREMENT_LIMIT_SECS;
use crate::coordinate::{self, Coordinate};
use crate::errors::{ListResult, SensorValuesListError};
use crate::instrument::{InstrumentDescriptor, SharedResolver};
use crate::sensor_value::SensorValue;
use crate::time::seconds_between;

use super::grouping::{self, build_interpolated_value, classify_measurement_mode, MeasurementMode};
use super::storage::OrderedSensorValues;
use super::value::SensorValuesListValue;
use super::{ListOutput, SensorValuesList};

#[derive(Clone, Copy)]
enum Step {
    Backward,
    Forward,
}

/// List of time-stamped values for one sensor type
pub struct TimestampSensorValuesList {
    storage: OrderedSensorValues,
    allow_string_groups: bool,
    mode: OnceCell<MeasurementMode>,
    output: OnceCell<ListOutput>,
}

impl TimestampSensorValuesList {
    /// Empty list for the given columns
    pub fn new<I>(column_ids: I, instrument: &dyn InstrumentDescriptor, resolver: SharedResolver) -> ListResult<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        Self::with_force_string(column_ids, instrument, resolver, false)
    }

    /// Empty list, optionally treating every payload as text
    pub fn with_force_string<I>(
        column_ids: I,
        instrument: &dyn InstrumentDescriptor,
        resolver: SharedResolver,
        force_string: bool,
    ) -> ListResult<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        Ok(Self {
            storage: OrderedSensorValues::new(column_ids, instrument, resolver, force_string)?,
            allow_string_groups: false,
            mode: OnceCell::new(),
            output: OnceCell::new(),
        })
    }

    fn reset(&mut self) {
        self.mode.take();
        self.output.take();
    }

    /// Let changes in text values start new groups.
    ///
    /// Fails with [`SensorValuesListError::NoStringValues`] when enabling on
    /// a list that holds no text values.
    pub fn allow_string_values_to_define_groups(&mut self, allow: bool) -> ListResult<()> {
        if allow && !self.storage.contains_string_value() {
            return Err(SensorValuesListError::NoStringValues);
        }

        if allow != self.allow_string_groups {
            self.allow_string_groups = allow;
            self.reset();
        }

        Ok(())
    }

    fn string_mode(&self) -> bool {
        self.allow_string_groups && self.storage.contains_string_value()
    }

    /// Sampling cadence of the current members
    pub fn measurement_mode(&self) -> MeasurementMode {
        *self.mode.get_or_init(|| {
            let mode = classify_measurement_mode(self.storage.values(), self.string_mode());
            log_debug!(
                "Classified {} values of {} as {}",
                self.storage.len(),
                self.storage.sensor_type().name,
                mode
            );
            mode
        })
    }

    fn build_output(&self) -> ListResult<ListOutput> {
        let values = if self.storage.is_empty() {
            Vec::new()
        } else {
            match self.measurement_mode() {
                MeasurementMode::Continuous => grouping::continuous_values(&self.storage),
                MeasurementMode::Periodic if self.storage.contains_string_value() => {
                    grouping::periodic_string_values(&self.storage)?
                }
                MeasurementMode::Periodic => grouping::periodic_numeric_values(&self.storage)?,
            }
        };

        log_debug!(
            "Built {} output values from {} raw values",
            values.len(),
            self.storage.len()
        );

        Ok(ListOutput::new(values))
    }

    /// The stored coordinate at `time`, or a new one if no raw value sits
    /// there. `None` for an empty list.
    pub fn coordinate_at(&self, time: NaiveDateTime) -> ListResult<Option<Coordinate>> {
        match self.storage.dataset_id() {
            Some(dataset_id) => grouping::coordinate_at(&self.storage, dataset_id, time).map(Some),
            None => Ok(None),
        }
    }

    /// Raw values with `start <= coordinate <= end`
    pub fn raw_values_between(&self, start: &Coordinate, end: &Coordinate) -> &[Arc<SensorValue>] {
        let coordinates = self.storage.coordinates();

        let first = match coordinate::search(coordinates, start) {
            Ok(Ok(index)) | Ok(Err(index)) => index,
            Err(_) => return &[],
        };

        let count = coordinates[first..].partition_point(|c| {
            c.try_cmp(end)
                .map(|o| o != core::cmp::Ordering::Greater)
                .unwrap_or(false)
        });

        &self.storage.values()[first..first + count]
    }

    /// Value built from the raw values between `start` and `end`, placed at
    /// `nominal`.
    ///
    /// The values are averaged as a periodic group would be, except that
    /// excluding worse-flagged values marks the result as interpolating
    /// around flags. If no usable value lies in the range and interpolation
    /// is allowed, falls back to a point query at `nominal`.
    pub fn get_value_in_range(
        &self,
        start: &Coordinate,
        end: &Coordinate,
        nominal: &Coordinate,
        allow_interpolation: bool,
    ) -> ListResult<Option<SensorValuesListValue>> {
        let members = self.raw_values_between(start, end);

        if let Some(value) = grouping::make_numeric_value(&self.storage, members, *nominal, true)? {
            return Ok(Some(value));
        }

        if allow_interpolation {
            self.get_value(nominal, true)
        } else {
            Ok(None)
        }
    }

    fn continuous_value(
        &self,
        output: &ListOutput,
        target: &Coordinate,
        allow_interpolation: bool,
    ) -> ListResult<Option<SensorValuesListValue>> {
        let values = output.values();

        let search = match coordinate::search(output.coordinates(), target) {
            Ok(search) => search,
            Err(_) => return Ok(None),
        };

        let exact_match = search.ok().and_then(|index| values.get(index));

        if !allow_interpolation || exact_match.is_some_and(|v| v.flag().is_good()) {
            return Ok(exact_match.cloned());
        }

        let Some(target_time) = target.timestamp() else {
            return Ok(exact_match.cloned());
        };

        let (prior_start, post_start) = match search {
            Ok(index) => (index.checked_sub(1), index + 1),
            Err(index) => (index.checked_sub(1), index),
        };

        let prior = prior_start.and_then(|start| find_interp_continuous_value(values, start, target_time, Step::Backward));
        let post = find_interp_continuous_value(values, post_start, target_time, Step::Forward);

        let around = prior.as_ref().is_some_and(|v| v.interpolates_around_flags())
            || post.as_ref().is_some_and(|v| v.interpolates_around_flags());

        let interpolated = build_interpolated_value(prior.as_ref(), post.as_ref(), target, around);

        Ok(match (interpolated, exact_match) {
            (Some(interpolated), None) => Some(interpolated),
            (Some(interpolated), Some(exact)) if exact.flag().more_significant_than(interpolated.flag()) => {
                Some(interpolated.with_interpolates_around_flags(true))
            }
            (Some(_), Some(exact)) | (None, Some(exact)) => Some(exact.clone()),
            (None, None) => match (prior, post) {
                (Some(only), None) | (None, Some(only)) => Some(only),
                _ => None,
            },
        })
    }

    fn periodic_value(
        &self,
        output: &ListOutput,
        target: &Coordinate,
        allow_interpolation: bool,
    ) -> ListResult<Option<SensorValuesListValue>> {
        let values = output.values();

        let index = match coordinate::search(output.coordinates(), target) {
            Ok(Ok(index)) => return Ok(values.get(index).map(|v| v.renominated(*target))),
            Ok(Err(index)) => index,
            Err(_) => return Ok(None),
        };

        if !allow_interpolation {
            return Ok(None);
        }

        let prior = index.checked_sub(1).and_then(|i| values.get(i));
        let post = values.get(index);

        let prior_encompasses = match prior {
            Some(value) => value.encompasses(target)?,
            None => false,
        };
        let post_encompasses = match post {
            Some(value) => value.encompasses(target)?,
            None => false,
        };

        Ok(match (prior, post) {
            (Some(value), _) if prior_encompasses => Some(value.renominated(*target)),
            (_, Some(value)) if post_encompasses => Some(value.renominated(*target)),
            (Some(only), None) | (None, Some(only)) => Some(only.renominated(*target)),
            (Some(first), Some(second)) => best_or_interpolate(first, second, target),
            (None, None) => None,
        })
    }
}

/// Walk away from the target looking for a good value within the
/// continuity limit. Returns the first good value found, or failing that the
/// best-flagged value seen. Passing over worse values on the way marks the
/// result as interpolating around flags.
fn find_interp_continuous_value(
    values: &[SensorValuesListValue],
    start: usize,
    target: NaiveDateTime,
    step: Step,
) -> Option<SensorValuesListValue> {
    let mut result: Option<SensorValuesListValue> = None;
    let mut index = start;

    while let Some(candidate) = values.get(index) {
        let Some(time) = candidate.time() else {
            break;
        };

        if seconds_between(target, time).abs() > CONTINUOUS_MEASUREMENT_LIMIT_SECS {
            break;
        }

        if candidate.flag().is_good() {
            let around = result.as_ref().is_some_and(|r| !r.flag().is_good());
            return Some(candidate.clone().with_interpolates_around_flags(around));
        }

        match &result {
            None => result = Some(candidate.clone().with_interpolates_around_flags(false)),
            Some(best) if best.flag().more_significant_than(candidate.flag()) => {
                result = Some(candidate.clone().with_interpolates_around_flags(true));
            }
            Some(_) => {}
        }

        index = match step {
            Step::Forward => index + 1,
            Step::Backward => match index.checked_sub(1) {
                Some(previous) => previous,
                None => break,
            },
        };
    }

    result
}

/// The better-flagged of two periodic groups, or their interpolation if the
/// flags are equally significant
fn best_or_interpolate(
    first: &SensorValuesListValue,
    second: &SensorValuesListValue,
    target: &Coordinate,
) -> Option<SensorValuesListValue> {
    if first.flag().more_significant_than(second.flag()) {
        Some(second.renominated(*target))
    } else if second.flag().more_significant_than(first.flag()) {
        Some(first.renominated(*target))
    } else {
        build_interpolated_value(Some(first), Some(second), target, false)
    }
}

impl SensorValuesList for TimestampSensorValuesList {
    fn storage(&self) -> &OrderedSensorValues {
        &self.storage
    }

    fn add(&mut self, value: Arc<SensorValue>) -> ListResult<()> {
        if value.coordinate().timestamp().is_none() {
            return Err(SensorValuesListError::IncompatibleCoordinateType);
        }

        self.storage.add(value)?;
        self.reset();
        Ok(())
    }

    fn remove(&mut self, value: &SensorValue) -> bool {
        let removed = self.storage.remove(value);
        if removed {
            self.reset();
        }
        removed
    }

    fn output(&self) -> ListResult<&ListOutput> {
        if let Some(output) = self.output.get() {
            return Ok(output);
        }

        let built = self.build_output()?;
        Ok(self.output.get_or_init(|| built))
    }

    fn get_value(
        &self,
        coordinate: &Coordinate,
        allow_interpolation: bool,
    ) -> ListResult<Option<SensorValuesListValue>> {
        let output = self.output()?;

        if output.values().is_empty() {
            return Ok(None);
        }

        match self.measurement_mode() {
            MeasurementMode::Continuous => self.continuous_value(output, coordinate, allow_interpolation),
            MeasurementMode::Periodic => self.periodic_value(output, coordinate, allow_interpolation),
        }
    }

    fn as_timestamp(&self) -> Option<&TimestampSensorValuesList> {
        Some(self)
    }

    fn as_timestamp_mut(&mut self) -> Option<&mut TimestampSensorValuesList> {
        Some(self)
    }
}
