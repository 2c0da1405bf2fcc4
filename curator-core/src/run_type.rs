//! Run type periods
//!
//! Run types are recorded as a text column sampled alongside the sensors.
//! [`RunTypePeriods`] compresses that column into contiguous periods, each
//! labelled with one run type, so "which run type applies here" becomes a
//! range lookup.
//!
//! Periods are built in coordinate order. Once [`RunTypePeriods::finish`] is
//! called the last period extends to [`Coordinate::MAX`], covering everything
//! after the final run type change.

use core::cmp::Ordering;
use std::collections::BTreeSet;

use crate::coordinate::Coordinate;
use crate::errors::RunTypePeriodsError;
use crate::sensor_values_list::SensorValuesList;

/// Result type for run type period operations
pub type RunTypeResult<T> = Result<T, RunTypePeriodsError>;

/// A run type applying from `start` to `end`, inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct RunTypePeriod {
    run_type: String,
    start: Coordinate,
    end: Coordinate,
}

impl RunTypePeriod {
    fn new(run_type: &str, start: Coordinate) -> Self {
        Self {
            run_type: run_type.to_string(),
            start,
            end: start,
        }
    }

    /// Run type label
    pub fn run_type(&self) -> &str {
        &self.run_type
    }

    /// First coordinate of the period
    pub fn start(&self) -> &Coordinate {
        &self.start
    }

    /// Last coordinate of the period
    pub fn end(&self) -> &Coordinate {
        &self.end
    }

    /// True if `coordinate` lies within the period. A single-point period
    /// only matches that exact coordinate.
    pub fn encompasses(&self, coordinate: &Coordinate) -> bool {
        if self.start == self.end {
            return *coordinate == self.start;
        }

        matches!(coordinate.try_cmp(&self.start), Ok(Ordering::Equal | Ordering::Greater))
            && matches!(coordinate.try_cmp(&self.end), Ok(Ordering::Less | Ordering::Equal))
    }
}

/// Ordered run type periods for a dataset
#[derive(Debug, Clone, Default)]
pub struct RunTypePeriods {
    periods: Vec<RunTypePeriod>,
    finished: bool,
}

impl RunTypePeriods {
    /// Empty, unfinished periods
    pub fn new() -> Self {
        Self::default()
    }

    /// Build finished periods from a run type list's raw values. Empty
    /// values are skipped.
    pub fn from_values(list: &dyn SensorValuesList) -> RunTypeResult<Self> {
        let mut periods = Self::new();

        for value in list.raw_values() {
            match value.value() {
                Some(run_type) if !run_type.is_empty() => periods.add(run_type, *value.coordinate())?,
                _ => continue,
            }
        }

        periods.finish();
        Ok(periods)
    }

    /// Record `run_type` at `coordinate`.
    ///
    /// The same run type as the last period extends it. A different run type
    /// opens a new period. Coordinates must come after the last period's end.
    pub fn add(&mut self, run_type: &str, coordinate: Coordinate) -> RunTypeResult<()> {
        if self.finished {
            return Err(RunTypePeriodsError::Finished);
        }

        let Some(current) = self.periods.last_mut() else {
            self.periods.push(RunTypePeriod::new(run_type, coordinate));
            return Ok(());
        };

        if !coordinate.is_after(&current.end)? {
            return Err(RunTypePeriodsError::OutOfOrder {
                coordinate: coordinate.to_string(),
            });
        }

        if current.run_type == run_type {
            current.end = coordinate;
        } else {
            self.periods.push(RunTypePeriod::new(run_type, coordinate));
        }

        Ok(())
    }

    /// Stop accepting run types and stretch the last period to the end of
    /// time
    pub fn finish(&mut self) {
        if let Some(last) = self.periods.last_mut() {
            last.end = Coordinate::MAX;
        }
        self.finished = true;
    }

    /// True once [`finish`](Self::finish) has been called
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The periods in order
    pub fn periods(&self) -> &[RunTypePeriod] {
        &self.periods
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// True if no run type has been added
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// True if any period encompasses `coordinate`
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.periods.iter().any(|p| p.encompasses(coordinate))
    }

    /// Run type of the period encompassing `coordinate`
    pub fn run_type_at(&self, coordinate: &Coordinate) -> Option<&str> {
        self.periods
            .iter()
            .find(|p| p.encompasses(coordinate))
            .map(RunTypePeriod::run_type)
    }

    /// True if any period has this run type
    pub fn contains_run_type(&self, run_type: &str) -> bool {
        self.periods.iter().any(|p| p.run_type == run_type)
    }

    /// Distinct run types, sorted
    pub fn run_type_names(&self) -> BTreeSet<&str> {
        self.periods.iter().map(RunTypePeriod::run_type).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> Coordinate {
        let time = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap();
        Coordinate::time(1, time).unwrap()
    }

    fn periods() -> RunTypePeriods {
        let mut periods = RunTypePeriods::new();
        periods.add("STD1", at(0)).unwrap();
        periods.add("STD1", at(2)).unwrap();
        periods.add("EQU", at(4)).unwrap();
        periods.add("EQU", at(8)).unwrap();
        periods
    }

    #[test]
    fn same_run_type_extends_period() {
        let periods = periods();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods.periods()[0].end(), &at(2));
        assert_eq!(periods.periods()[1].start(), &at(4));
    }

    #[test]
    fn encompasses_is_inclusive() {
        let periods = periods();
        let equ = &periods.periods()[1];
        assert!(equ.encompasses(&at(4)));
        assert!(equ.encompasses(&at(6)));
        assert!(equ.encompasses(&at(8)));
        assert!(!equ.encompasses(&at(3)));
        assert!(!equ.encompasses(&at(9)));
    }

    #[test]
    fn single_point_period_matches_only_itself() {
        let mut periods = RunTypePeriods::new();
        periods.add("AIR", at(5)).unwrap();
        periods.add("EQU", at(10)).unwrap();

        let air = &periods.periods()[0];
        assert!(air.encompasses(&at(5)));
        assert!(!air.encompasses(&at(6)));
    }

    #[test]
    fn finish_extends_last_period() {
        let mut periods = periods();
        assert!(!periods.contains(&at(30)));

        periods.finish();
        assert!(periods.contains(&at(30)));
        assert_eq!(periods.run_type_at(&at(59)), Some("EQU"));
        assert!(periods.periods()[1].end().is_max());
    }

    #[test]
    fn gaps_between_periods_have_no_run_type() {
        let periods = periods();
        assert_eq!(periods.run_type_at(&at(3)), None);
        assert_eq!(periods.run_type_at(&at(1)), Some("STD1"));
    }

    #[test]
    fn out_of_order_rejected() {
        let mut periods = periods();
        assert!(matches!(periods.add("EQU", at(8)), Err(RunTypePeriodsError::OutOfOrder { .. })));
        assert!(matches!(periods.add("STD1", at(1)), Err(RunTypePeriodsError::OutOfOrder { .. })));
    }

    #[test]
    fn finished_rejects_additions() {
        let mut periods = periods();
        periods.finish();
        assert_eq!(periods.add("EQU", at(40)), Err(RunTypePeriodsError::Finished));
    }

    #[test]
    fn run_type_names_are_distinct() {
        let mut periods = periods();
        periods.add("STD1", at(10)).unwrap();
        let names: Vec<&str> = periods.run_type_names().into_iter().collect();
        assert_eq!(names, vec!["EQU", "STD1"]);
        assert!(periods.contains_run_type("STD1"));
        assert!(!periods.contains_run_type("AIR"));
    }
}
