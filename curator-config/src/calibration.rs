//! Calibration sets loaded from configuration
//!
//! File format: a list of sets, each tagged with its instrument.
//!
//! ```json
//! [
//!   {
//!     "instrument_id": 1,
//!     "deployment_date": "2023-01-01T00:00:00",
//!     "standards": {
//!       "STD1": { "xCO₂ (with standards)": 250.0 },
//!       "STD2": { "xCO₂ (with standards)": 400.0 }
//!     }
//!   }
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use curator_core::calibration::CalibrationResult;
use curator_core::{CalibrationError, CalibrationProvider, CalibrationSet};

use crate::ConfigError;

#[derive(Deserialize)]
struct CalibrationRecord {
    instrument_id: i64,
    #[serde(flatten)]
    set: CalibrationSet,
}

/// Calibration sets per instrument, ordered by deployment date
#[derive(Debug, Clone, Default)]
pub struct CalibrationStore {
    sets: BTreeMap<i64, Vec<CalibrationSet>>,
}

impl CalibrationStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON list of calibration sets
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let records: Vec<CalibrationRecord> = serde_json::from_str(json)?;

        let mut store = Self::new();
        for record in records {
            store.add(record.instrument_id, record.set)?;
        }
        Ok(store)
    }

    /// Load a JSON file of calibration sets
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = crate::read_file(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Add a set. Two sets for the same instrument cannot share a
    /// deployment date.
    pub fn add(&mut self, instrument_id: i64, set: CalibrationSet) -> Result<(), ConfigError> {
        let sets = self.sets.entry(instrument_id).or_default();

        match sets.binary_search_by(|s| s.deployment_date().cmp(&set.deployment_date())) {
            Ok(_) => Err(ConfigError::ValidationError(format!(
                "Instrument {} already has calibrations deployed at {}",
                instrument_id,
                set.deployment_date()
            ))),
            Err(index) => {
                sets.insert(index, set);
                Ok(())
            }
        }
    }

    /// Sets for an instrument, oldest first
    pub fn sets(&self, instrument_id: i64) -> &[CalibrationSet] {
        self.sets.get(&instrument_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of sets
    pub fn len(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }

    /// True if the store holds no sets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CalibrationProvider for CalibrationStore {
    type Connection = ();

    fn calibrations_at(&self, _connection: &(), instrument_id: i64, time: NaiveDateTime) -> CalibrationResult<CalibrationSet> {
        self.sets(instrument_id)
            .iter()
            .rev()
            .find(|set| set.deployment_date() <= time)
            .cloned()
            .ok_or_else(|| CalibrationError::NoCalibrations {
                instrument_id,
                time: time.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    const SETS: &str = r#"[
        {
            "instrument_id": 1,
            "deployment_date": "2023-06-01T00:00:00",
            "standards": { "STD1": { "xCO₂ (with standards)": 260.0 } }
        },
        {
            "instrument_id": 1,
            "deployment_date": "2023-01-01T00:00:00",
            "standards": {
                "STD1": { "xCO₂ (with standards)": 250.0 },
                "STD2": { "xCO₂ (with standards)": 400.0 }
            }
        },
        {
            "instrument_id": 2,
            "deployment_date": "2023-01-01T00:00:00",
            "standards": {}
        }
    ]"#;

    fn at(month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, month, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn most_recent_set_used() {
        let store = CalibrationStore::from_json(SETS).unwrap();
        assert_eq!(store.len(), 3);

        let march = store.calibrations_at(&(), 1, at(3)).unwrap();
        assert_eq!(march.concentration("STD2", "xCO₂ (with standards)"), Some(400.0));

        let july = store.calibrations_at(&(), 1, at(7)).unwrap();
        assert_eq!(july.concentration("STD1", "xCO₂ (with standards)"), Some(260.0));
        assert_eq!(july.concentration("STD2", "xCO₂ (with standards)"), None);
    }

    #[test]
    fn no_set_before_time() {
        let store = CalibrationStore::from_json(SETS).unwrap();
        let early = NaiveDate::from_ymd_opt(2022, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert!(matches!(
            store.calibrations_at(&(), 1, early),
            Err(CalibrationError::NoCalibrations { instrument_id: 1, .. })
        ));
        assert!(store.calibrations_at(&(), 3, at(3)).is_err());
    }

    #[test]
    fn duplicate_deployment_rejected() {
        let mut store = CalibrationStore::from_json(SETS).unwrap();
        let deployed = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let duplicate = CalibrationSet::new(deployed);
        assert!(matches!(store.add(1, duplicate), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SETS.as_bytes()).unwrap();

        let store = CalibrationStore::from_file(file.path()).unwrap();
        assert_eq!(store.sets(1).len(), 2);
        assert!(store.sets(1)[0].deployment_date() < store.sets(1)[1].deployment_date());
    }
}
