//! Quality control flags
//!
//! Flags carry a severity (good, questionable, bad) plus two sentinel states
//! that are not quality judgements:
//!
//! - `Needed`: a user has to look at the value before it can be used.
//! - `Flushing`: the instrument was flushing; the value must never be used.
//!
//! When flags are compared for "worse than" decisions the ranking is
//! `Good == AssumedGood < Questionable < Bad < Needed < Flushing`.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A QC flag attached to a sensor value or derived value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Flag {
    /// Value checked and good
    Good,
    /// No checks failed, value assumed good
    AssumedGood,
    /// Value may have problems
    Questionable,
    /// Value is bad
    Bad,
    /// User action required
    Needed,
    /// Instrument flushing, exclude from all use
    Flushing,
}

impl Flag {
    /// Good and assumed-good values are both usable
    pub fn is_good(self) -> bool {
        matches!(self, Flag::Good | Flag::AssumedGood)
    }

    /// Rank used for significance comparisons
    fn rank(self) -> u8 {
        match self {
            Flag::Good | Flag::AssumedGood => 0,
            Flag::Questionable => 1,
            Flag::Bad => 2,
            Flag::Needed => 3,
            Flag::Flushing => 4,
        }
    }

    /// True if this flag is worse than `other`
    pub fn more_significant_than(self, other: Flag) -> bool {
        self.rank() > other.rank()
    }

    /// The worse of two flags
    pub fn most_significant(a: Flag, b: Flag) -> Flag {
        if b.more_significant_than(a) {
            b
        } else {
            a
        }
    }

    /// True if any flag in `flags` is worse than `flag`
    pub fn contains_worse_flag<'a, I>(flags: I, flag: Flag) -> bool
    where
        I: IntoIterator<Item = &'a Flag>,
    {
        flags.into_iter().any(|f| f.more_significant_than(flag))
    }

    /// Single-character code
    pub fn as_char(self) -> char {
        match self {
            Flag::Good => 'G',
            Flag::AssumedGood => 'A',
            Flag::Questionable => 'Q',
            Flag::Bad => 'B',
            Flag::Needed => 'N',
            Flag::Flushing => 'F',
        }
    }

    /// Parse a single-character code
    pub fn from_char(c: char) -> Option<Flag> {
        match c.to_ascii_uppercase() {
            'G' => Some(Flag::Good),
            'A' => Some(Flag::AssumedGood),
            'Q' => Some(Flag::Questionable),
            'B' => Some(Flag::Bad),
            'N' => Some(Flag::Needed),
            'F' => Some(Flag::Flushing),
            _ => None,
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Flag::AssumedGood
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flag::Good => "Good",
            Flag::AssumedGood => "Assumed Good",
            Flag::Questionable => "Questionable",
            Flag::Bad => "Bad",
            Flag::Needed => "Needed",
            Flag::Flushing => "Flushing",
        };
        f.write_str(name)
    }
}
