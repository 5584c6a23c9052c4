//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// One minor cycle. Cycle 1 is the first tick after the start instant.
pub type Cycle = u64;

/// Stable sensor identifier, e.g. "d1", "m3", "t2".
pub type SensorId = &'static str;

pub const MS_PER_DAY: u64 = 86_400_000;

/// A sensor value that is either a real reading or the modeled
/// missing-data case. Sentinels only exist at the encoding boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Sample<T> {
    Real(T),
    Missing,
}

impl<T: Copy> Sample<T> {
    pub fn real(&self) -> Option<T> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Cardinal side of the house relevant to sun exposure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    East,
    West,
}
