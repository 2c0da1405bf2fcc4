//! Pass-through list: every raw value is an output value

use std::cell::OnceCell;
use std::sync::Arc;

use crate::coordinate::{self, Coordinate};
use crate::errors::ListResult;
use crate::instrument::{InstrumentDescriptor, SharedResolver};
use crate::sensor_value::SensorValue;

use super::grouping::single_value;
use super::storage::OrderedSensorValues;
use super::value::{SensorValuesListValue, ValueExtent};
use super::{ListOutput, SensorValuesList};

/// List with no grouping or interpolation, used for non-time bases
pub struct SimpleSensorValuesList {
    storage: OrderedSensorValues,
    output: OnceCell<ListOutput>,
}

impl SimpleSensorValuesList {
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
            output: OnceCell::new(),
        })
    }

    fn build_output(&self) -> ListOutput {
        log_debug!("Building {} simple output values", self.storage.len());
        ListOutput::new(
            self.storage
                .values()
                .iter()
                .map(|v| single_value(&self.storage, v, ValueExtent::Point))
                .collect(),
        )
    }
}

impl SensorValuesList for SimpleSensorValuesList {
    fn storage(&self) -> &OrderedSensorValues {
        &self.storage
    }

    fn add(&mut self, value: Arc<SensorValue>) -> ListResult<()> {
        self.storage.add(value)?;
        self.output.take();
        Ok(())
    }

    fn remove(&mut self, value: &SensorValue) -> bool {
        let removed = self.storage.remove(value);
        if removed {
            self.output.take();
        }
        removed
    }

    fn output(&self) -> ListResult<&ListOutput> {
        Ok(self.output.get_or_init(|| self.build_output()))
    }

    fn get_value(
        &self,
        coordinate: &Coordinate,
        _allow_interpolation: bool,
    ) -> ListResult<Option<SensorValuesListValue>> {
        let output = self.output()?;
        Ok(match coordinate::search(output.coordinates(), coordinate) {
            Ok(Ok(index)) => output.values().get(index).cloned(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::{Basis, Direction, ProfilePosition};
    use crate::errors::{RecordNotFound, SensorValuesListError};
    use crate::flag::Flag;
    use crate::instrument::{RunTypeCategory, SensorType, UserOverrideResolver, Variable};

    struct Float(SensorType);

    impl InstrumentDescriptor for Float {
        fn id(&self) -> i64 {
            7
        }

        fn basis(&self) -> Basis {
            Basis::Profile
        }

        fn sensor_type_for_column(&self, column_id: i64) -> Result<&SensorType, RecordNotFound> {
            if column_id == 1 {
                Ok(&self.0)
            } else {
                Err(RecordNotFound::new("Sensor type for column", column_id))
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

    fn level(level: i32) -> Coordinate {
        Coordinate::profile(
            1,
            ProfilePosition {
                cycle: 3,
                profile: 1,
                direction: Direction::Ascending,
                level,
                pressure: level as f64 * 2.0,
            },
        )
        .unwrap()
    }

    fn list() -> SimpleSensorValuesList {
        let instrument = Float(SensorType::new(1, "Pressure"));
        SimpleSensorValuesList::new([1], &instrument, UserOverrideResolver::shared()).unwrap()
    }

    #[test]
    fn one_output_per_raw_value() {
        let mut list = list();
        for l in [3, 1, 2] {
            list.add(Arc::new(SensorValue::new(1, 1, level(l), Some("4.2")))).unwrap();
        }

        assert_eq!(list.values_size().unwrap(), 3);
        assert_eq!(list.value_coordinates().unwrap(), &[level(1), level(2), level(3)]);
    }

    #[test]
    fn exact_lookup_only() {
        let mut list = list();
        list.add(Arc::new(SensorValue::new(1, 1, level(1), Some("1.0")))).unwrap();
        list.add(Arc::new(SensorValue::new(1, 1, level(3), Some("3.0")))).unwrap();

        assert_eq!(list.get_value(&level(3), false).unwrap().unwrap().double_value(), 3.0);
        assert!(list.get_value(&level(2), true).unwrap().is_none());
    }

    #[test]
    fn output_carries_display_flag() {
        let mut list = list();
        let value = SensorValue::new(1, 1, level(1), Some("1.0")).with_user_qc(Flag::Bad, "Spike");
        list.add(Arc::new(value)).unwrap();

        let output = list.get_value(&level(1), false).unwrap().unwrap();
        assert_eq!(output.flag(), Flag::Bad);
        assert_eq!(output.message(), "Spike");
    }

    #[test]
    fn output_rebuilt_after_mutation() {
        let mut list = list();
        let first = Arc::new(SensorValue::new(1, 1, level(1), Some("1.0")));
        list.add(Arc::clone(&first)).unwrap();
        assert_eq!(list.values_size().unwrap(), 1);

        list.add(Arc::new(SensorValue::new(1, 1, level(2), Some("2.0")))).unwrap();
        assert_eq!(list.values_size().unwrap(), 2);

        assert!(list.remove(&first));
        assert_eq!(list.values_size().unwrap(), 1);
        assert!(!list.remove(&first));
    }

    #[test]
    fn duplicate_rejected() {
        let mut list = list();
        list.add(Arc::new(SensorValue::new(1, 1, level(1), Some("1.0")))).unwrap();
        let result = list.add(Arc::new(SensorValue::new(1, 1, level(1), Some("2.0"))));
        assert!(matches!(result, Err(SensorValuesListError::DuplicateCoordinate { .. })));
    }

    #[test]
    fn foreign_column_rejected() {
        let mut list = list();
        let result = list.add(Arc::new(SensorValue::new(1, 5, level(1), Some("1.0"))));
        assert!(matches!(result, Err(SensorValuesListError::InvalidColumn { column_id: 5 })));
    }
}
