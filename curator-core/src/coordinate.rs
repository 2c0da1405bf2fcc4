//! Coordinates: where a value sits along an instrument's measurement basis
//!
//! A coordinate is either a timestamp (time-based instruments), a profile
//! position (profiling floats), or the `MAX` sentinel that compares greater
//! than everything else.
//!
//! ## Ordering
//!
//! Coordinates of the same basis are totally ordered:
//!
//! - Dataset identity is compared first.
//! - Time coordinates order by timestamp.
//! - Profile coordinates order by cycle, then direction (descending before
//!   ascending), then profile number, then level. Pressure depends on the
//!   other fields so it plays no part in equality or ordering.
//!
//! Comparing a time coordinate with a profile coordinate is a programming
//! error and returns [`CoordinateError::IncompatibleTypes`]. `MAX` can be
//! compared with anything.
//!
//! ```rust
//! use curator_core::Coordinate;
//! use chrono::NaiveDate;
//!
//! let noon = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let coordinate = Coordinate::time(1, noon).unwrap();
//!
//! assert!(coordinate.is_before(&Coordinate::MAX).unwrap());
//! assert!(!coordinate.is_in_database());
//! ```

use core::cmp::Ordering;
use core::fmt;

use chrono::NaiveDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoordinateError, CoordinateResult};

/// Database identity used for records that have not been stored
pub const NO_DATABASE_RECORD: i64 = -1;

/// Measurement basis of an instrument, and of its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Basis {
    /// Wall-clock time
    Time,
    /// Float profile position
    Profile,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Time => f.write_str("time"),
            Basis::Profile => f.write_str("profile"),
        }
    }
}

/// Direction of travel for a profile
///
/// Declaration order gives descending profiles priority in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Descending profile ('D')
    Descending,
    /// Ascending profile ('A')
    Ascending,
}

impl Direction {
    /// Parse a direction flag
    pub fn from_char(c: char) -> CoordinateResult<Self> {
        match c {
            'D' => Ok(Direction::Descending),
            'A' => Ok(Direction::Ascending),
            other => Err(CoordinateError::InvalidDirection(other)),
        }
    }

    /// Direction flag character
    pub fn as_char(self) -> char {
        match self {
            Direction::Descending => 'D',
            Direction::Ascending => 'A',
        }
    }
}

/// Position within a float profile
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfilePosition {
    /// Cycle number
    pub cycle: i32,
    /// Profile number within the cycle
    pub profile: i32,
    /// Direction of travel
    pub direction: Direction,
    /// Level number within the profile
    pub level: i32,
    /// Pressure at this level (dbar). Not part of the ordering key.
    pub pressure: f64,
}

impl ProfilePosition {
    fn key(&self) -> (i32, Direction, i32, i32) {
        (self.cycle, self.direction, self.profile, self.level)
    }
}

/// Basis-specific part of a coordinate
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoordinateKind {
    /// A timestamp
    Time(NaiveDateTime),
    /// A profile position
    Profile(ProfilePosition),
    /// Greater than every other coordinate
    Max,
}

/// An ordering key for sensor values and measurements
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    id: Option<i64>,
    dataset_id: i64,
    kind: CoordinateKind,
}

impl Coordinate {
    /// Open-ended upper bound
    pub const MAX: Coordinate = Coordinate {
        id: None,
        dataset_id: NO_DATABASE_RECORD,
        kind: CoordinateKind::Max,
    };

    fn new(dataset_id: i64, kind: CoordinateKind) -> CoordinateResult<Self> {
        if dataset_id <= 0 {
            return Err(CoordinateError::InvalidDatasetId(dataset_id));
        }

        Ok(Self {
            id: None,
            dataset_id,
            kind,
        })
    }

    /// A time coordinate that has not been stored
    pub fn time(dataset_id: i64, time: NaiveDateTime) -> CoordinateResult<Self> {
        Self::new(dataset_id, CoordinateKind::Time(time))
    }

    /// A profile coordinate that has not been stored
    pub fn profile(dataset_id: i64, position: ProfilePosition) -> CoordinateResult<Self> {
        Self::new(dataset_id, CoordinateKind::Profile(position))
    }

    /// Builder form of [`Coordinate::set_id`]
    pub fn with_id(mut self, id: i64) -> CoordinateResult<Self> {
        self.set_id(id)?;
        Ok(self)
    }

    /// Stamp the database identity. Fails if one is already set.
    pub fn set_id(&mut self, id: i64) -> CoordinateResult<()> {
        if let Some(existing) = self.id {
            return Err(CoordinateError::IdAlreadySet { existing });
        }
        self.id = Some(id);
        Ok(())
    }

    /// Database identity, if stored
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// True once the coordinate has a database identity
    pub fn is_in_database(&self) -> bool {
        self.id.is_some()
    }

    /// Owning dataset
    pub fn dataset_id(&self) -> i64 {
        self.dataset_id
    }

    /// Basis-specific fields
    pub fn kind(&self) -> &CoordinateKind {
        &self.kind
    }

    /// Basis of this coordinate. `None` for `MAX`.
    pub fn basis(&self) -> Option<Basis> {
        match self.kind {
            CoordinateKind::Time(_) => Some(Basis::Time),
            CoordinateKind::Profile(_) => Some(Basis::Profile),
            CoordinateKind::Max => None,
        }
    }

    /// True for the `MAX` sentinel
    pub fn is_max(&self) -> bool {
        matches!(self.kind, CoordinateKind::Max)
    }

    /// Timestamp of a time coordinate
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self.kind {
            CoordinateKind::Time(time) => Some(time),
            _ => None,
        }
    }

    /// Profile position of a profile coordinate
    pub fn profile_position(&self) -> Option<&ProfilePosition> {
        match &self.kind {
            CoordinateKind::Profile(position) => Some(position),
            _ => None,
        }
    }

    /// Compare two coordinates, failing if their bases differ
    pub fn try_cmp(&self, other: &Coordinate) -> CoordinateResult<Ordering> {
        match (&self.kind, &other.kind) {
            (CoordinateKind::Max, CoordinateKind::Max) => Ok(Ordering::Equal),
            (CoordinateKind::Max, _) => Ok(Ordering::Greater),
            (_, CoordinateKind::Max) => Ok(Ordering::Less),
            (CoordinateKind::Time(a), CoordinateKind::Time(b)) => {
                Ok(self.dataset_id.cmp(&other.dataset_id).then_with(|| a.cmp(b)))
            }
            (CoordinateKind::Profile(a), CoordinateKind::Profile(b)) => Ok(self
                .dataset_id
                .cmp(&other.dataset_id)
                .then_with(|| a.key().cmp(&b.key()))),
            (CoordinateKind::Time(_), CoordinateKind::Profile(_)) => {
                Err(CoordinateError::IncompatibleTypes {
                    left: Basis::Time,
                    right: Basis::Profile,
                })
            }
            (CoordinateKind::Profile(_), CoordinateKind::Time(_)) => {
                Err(CoordinateError::IncompatibleTypes {
                    left: Basis::Profile,
                    right: Basis::Time,
                })
            }
        }
    }

    /// Strictly before `other`
    pub fn is_before(&self, other: &Coordinate) -> CoordinateResult<bool> {
        Ok(self.try_cmp(other)? == Ordering::Less)
    }

    /// Strictly after `other`
    pub fn is_after(&self, other: &Coordinate) -> CoordinateResult<bool> {
        Ok(self.try_cmp(other)? == Ordering::Greater)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.try_cmp(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CoordinateKind::Time(time) => write!(f, "{}", time.format("%Y-%m-%dT%H:%M:%S")),
            CoordinateKind::Profile(p) => write!(
                f,
                "{}/{}{}/{} ({} dbar)",
                p.cycle,
                p.profile,
                p.direction.as_char(),
                p.level,
                p.pressure
            ),
            CoordinateKind::Max => f.write_str("MAX"),
        }
    }
}

/// Binary search a coordinate-ordered slice
///
/// Returns `Ok(Ok(index))` for an exact match and `Ok(Err(insertion_point))`
/// otherwise, in the manner of `slice::binary_search_by`. Fails if the target
/// cannot be compared with the slice members.
pub fn search_by<T, F>(items: &[T], target: &Coordinate, key: F) -> CoordinateResult<Result<usize, usize>>
where
    F: Fn(&T) -> &Coordinate,
{
    let mut low = 0;
    let mut high = items.len();

    while low < high {
        let mid = low + (high - low) / 2;
        match key(&items[mid]).try_cmp(target)? {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => return Ok(Ok(mid)),
        }
    }

    Ok(Err(low))
}

/// Binary search a slice of coordinates
pub fn search(coordinates: &[Coordinate], target: &Coordinate) -> CoordinateResult<Result<usize, usize>> {
    search_by(coordinates, target, |c| c)
}
