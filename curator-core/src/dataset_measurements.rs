//! Measurements of a dataset grouped by variable and run type
//!
//! Measurements are filed under every (variable, run type) pair they carry.
//! A measurement whose run type applies to all variables is filed under
//! [`RUN_TYPE_DEFINES_VARIABLE`] and found by any variable id.
//!
//! A deduplicated, coordinate-ordered view of all measurements is built on
//! first use and dropped whenever a measurement is added.

use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::constants::RUN_TYPE_DEFINES_VARIABLE;
use crate::coordinate::{self, Coordinate};
use crate::errors::CoordinateResult;
use crate::measurement::Measurement;

#[derive(Debug, Default)]
struct OrderedMeasurements {
    measurements: Vec<Arc<Measurement>>,
    coordinates: Vec<Coordinate>,
}

/// All measurements of one dataset
#[derive(Debug, Default)]
pub struct DatasetMeasurements {
    measurements: HashMap<(i64, String), Vec<Arc<Measurement>>>,
    ordered: OnceCell<OrderedMeasurements>,
}

impl DatasetMeasurements {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// File a measurement under each of its (variable, run type) pairs.
    ///
    /// A measurement at the same coordinate as an existing one replaces it
    /// under every pair, whatever run types the old one carried.
    pub fn add_measurement(&mut self, measurement: Measurement) -> CoordinateResult<()> {
        let measurement = Arc::new(measurement);

        for list in self.measurements.values_mut() {
            if let Ok(index) = coordinate::search_by(list, measurement.coordinate(), |m| m.coordinate())? {
                list.remove(index);
            }
        }
        self.measurements.retain(|_, list| !list.is_empty());

        for (variable_id, run_type) in measurement.run_types() {
            let list = self
                .measurements
                .entry((*variable_id, run_type.clone()))
                .or_default();

            if let Err(index) = coordinate::search_by(list, measurement.coordinate(), |m| m.coordinate())? {
                list.insert(index, Arc::clone(&measurement));
            }
        }

        self.ordered.take();
        Ok(())
    }

    /// Number of distinct measurements
    pub fn len(&self) -> usize {
        self.ordered().measurements.len()
    }

    /// True if no measurement has been added
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Run types recorded for a variable
    pub fn run_types(&self, variable_id: i64) -> BTreeSet<&str> {
        self.measurements
            .keys()
            .filter(|(variable, _)| *variable == variable_id || *variable == RUN_TYPE_DEFINES_VARIABLE)
            .map(|(_, run_type)| run_type.as_str())
            .collect()
    }

    /// Measurements of a variable with the given run type, in coordinate
    /// order
    pub fn measurements(&self, variable_id: i64, run_type: &str) -> &[Arc<Measurement>] {
        self.measurements
            .get(&(variable_id, run_type.to_string()))
            .or_else(|| {
                self.measurements
                    .get(&(RUN_TYPE_DEFINES_VARIABLE, run_type.to_string()))
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn ordered(&self) -> &OrderedMeasurements {
        self.ordered.get_or_init(|| {
            let mut measurements: Vec<Arc<Measurement>> =
                self.measurements.values().flatten().cloned().collect();

            measurements.sort_by(|a, b| {
                a.coordinate()
                    .partial_cmp(b.coordinate())
                    .unwrap_or(core::cmp::Ordering::Equal)
            });
            measurements.dedup_by(|a, b| a.coordinate() == b.coordinate());

            let coordinates = measurements.iter().map(|m| *m.coordinate()).collect();
            OrderedMeasurements {
                measurements,
                coordinates,
            }
        })
    }

    /// Every measurement once, in coordinate order
    pub fn ordered_measurements(&self) -> &[Arc<Measurement>] {
        &self.ordered().measurements
    }

    /// Coordinates of [`ordered_measurements`](Self::ordered_measurements)
    pub fn measurement_coordinates(&self) -> &[Coordinate] {
        &self.ordered().coordinates
    }

    /// The unbroken run of measurements around `start` sharing its run type
    /// for the variable. Empty if `start` is not in the collection.
    pub fn measurements_in_same_run(&self, variable_id: i64, start: &Measurement) -> Vec<Arc<Measurement>> {
        let ordered = self.ordered();

        let position = match coordinate::search(&ordered.coordinates, start.coordinate()) {
            Ok(Ok(position)) => position,
            _ => return Vec::new(),
        };

        let run_type = start.run_type(variable_id);
        let same_run = |m: &Measurement| run_type.is_some() && m.run_type(variable_id) == run_type;

        let mut first = position;
        while first > 0 && same_run(&ordered.measurements[first - 1]) {
            first -= 1;
        }

        let mut last = position;
        while last + 1 < ordered.measurements.len() && same_run(&ordered.measurements[last + 1]) {
            last += 1;
        }

        ordered.measurements[first..=last].to_vec()
    }

    /// The last run of `run_type` strictly before `coordinate`
    pub fn run_before(&self, variable_id: i64, run_type: &str, coordinate: &Coordinate) -> Vec<Arc<Measurement>> {
        self.measurements(variable_id, run_type)
            .iter()
            .rev()
            .find(|m| matches!(m.coordinate().is_before(coordinate), Ok(true)))
            .map(|m| self.measurements_in_same_run(variable_id, m))
            .unwrap_or_default()
    }

    /// The first run of `run_type` strictly after `coordinate`
    pub fn run_after(&self, variable_id: i64, run_type: &str, coordinate: &Coordinate) -> Vec<Arc<Measurement>> {
        self.measurements(variable_id, run_type)
            .iter()
            .find(|m| matches!(m.coordinate().is_after(coordinate), Ok(true)))
            .map(|m| self.measurements_in_same_run(variable_id, m))
            .unwrap_or_default()
    }
}
