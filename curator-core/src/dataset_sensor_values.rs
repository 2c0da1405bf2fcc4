//! Every sensor value of a dataset, with one list per column

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::ListResult;
use crate::instrument::{InstrumentDescriptor, SharedResolver};
use crate::sensor_value::SensorValue;
use crate::sensor_values_list::{make_sensor_values_list, new_from_sensor_value_collection, SensorValuesList};

/// Instrument description shared between the parts of a dataset
pub type SharedInstrument = Arc<dyn InstrumentDescriptor + Send + Sync>;

/// Sensor values of one dataset
pub struct DatasetSensorValues {
    dataset_id: i64,
    instrument: SharedInstrument,
    resolver: SharedResolver,
    by_id: HashMap<i64, Arc<SensorValue>>,
    columns: BTreeMap<i64, Box<dyn SensorValuesList>>,
}

impl DatasetSensorValues {
    /// Empty collection for a dataset
    pub fn new(dataset_id: i64, instrument: SharedInstrument, resolver: SharedResolver) -> Self {
        Self {
            dataset_id,
            instrument,
            resolver,
            by_id: HashMap::new(),
            columns: BTreeMap::new(),
        }
    }

    /// Dataset identity
    pub fn dataset_id(&self) -> i64 {
        self.dataset_id
    }

    /// The instrument the dataset came from
    pub fn instrument(&self) -> &dyn InstrumentDescriptor {
        self.instrument.as_ref()
    }

    /// Resolver used for display flags
    pub fn resolver(&self) -> &SharedResolver {
        &self.resolver
    }

    /// Add a value to its column's list. The run type column's list treats
    /// every payload as text.
    pub fn add(&mut self, value: SensorValue) -> ListResult<Arc<SensorValue>> {
        let value = Arc::new(value);
        let column_id = value.column_id();

        match self.columns.get_mut(&column_id) {
            Some(list) => list.add(Arc::clone(&value))?,
            None => {
                let force_string = self.instrument.run_type_column() == Some(column_id);
                let mut list = make_sensor_values_list(
                    [column_id],
                    self.instrument.as_ref(),
                    Arc::clone(&self.resolver),
                    force_string,
                )?;
                list.add(Arc::clone(&value))?;
                self.columns.insert(column_id, list);
            }
        }

        if let Some(id) = value.id() {
            self.by_id.insert(id, Arc::clone(&value));
        }

        Ok(value)
    }

    /// Add several values
    pub fn add_all<I>(&mut self, values: I) -> ListResult<()>
    where
        I: IntoIterator<Item = SensorValue>,
    {
        for value in values {
            self.add(value)?;
        }
        Ok(())
    }

    /// Columns holding at least one value
    pub fn column_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.columns.keys().copied()
    }

    /// The list for one column
    pub fn column_values(&self, column_id: i64) -> Option<&dyn SensorValuesList> {
        self.columns.get(&column_id).map(|list| list.as_ref())
    }

    /// Mutable access to one column's list
    pub fn column_values_mut(&mut self, column_id: i64) -> Option<&mut (dyn SensorValuesList + 'static)> {
        self.columns.get_mut(&column_id).map(|list| list.as_mut())
    }

    /// The run type column's list, if the instrument has one and it holds
    /// values
    pub fn run_types(&self) -> Option<&dyn SensorValuesList> {
        self.instrument
            .run_type_column()
            .and_then(|column| self.column_values(column))
    }

    /// A new list combining several columns of the same sensor type
    pub fn sensor_values<I>(&self, column_ids: I, force_string: bool) -> ListResult<Box<dyn SensorValuesList>>
    where
        I: IntoIterator<Item = i64>,
    {
        let column_ids: Vec<i64> = column_ids.into_iter().collect();
        let values: Vec<Arc<SensorValue>> = column_ids
            .iter()
            .filter_map(|column| self.columns.get(column))
            .flat_map(|list| list.raw_values().iter().cloned())
            .collect();

        if values.is_empty() {
            return make_sensor_values_list(column_ids, self.instrument.as_ref(), Arc::clone(&self.resolver), force_string);
        }

        new_from_sensor_value_collection(values, self.instrument.as_ref(), Arc::clone(&self.resolver), force_string)
    }

    /// Value with the given database identity
    pub fn by_id(&self, id: i64) -> Option<&Arc<SensorValue>> {
        self.by_id.get(&id)
    }

    /// Total number of values
    pub fn len(&self) -> usize {
        self.columns.values().map(|list| list.raw_size()).sum()
    }

    /// True if the dataset holds no values
    pub fn is_empty(&self) -> bool {
        self.columns.values().all(|list| list.is_empty())
    }
}
