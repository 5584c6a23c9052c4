//! Simulation clock — owns the cycle counter and maps cycles to wall time.
//!
//! INVARIANT: elapsed simulated ms == current_cycle * minor_cycle_ms.
//! Timestamps are always recomputed from the start instant, never accumulated.

use crate::{
    error::{SimError, SimResult},
    types::{Cycle, MS_PER_DAY},
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub start:          NaiveDateTime,
    pub minor_cycle_ms: u64,
    pub current_cycle:  Cycle,
    pub total_cycles:   Cycle,
}

impl SimClock {
    pub fn new(start: NaiveDateTime, minor_cycle_ms: u64, days: u64) -> SimResult<Self> {
        assert!(minor_cycle_ms > 0, "minor cycle must be positive");
        let total_cycles = Self::cycles_for(days, minor_cycle_ms).ok_or_else(|| {
            SimError::config("days_to_simulate", format!("{days} days overflows the cycle counter"))
        })?;
        Ok(Self {
            start,
            minor_cycle_ms,
            current_cycle: 0,
            total_cycles,
        })
    }

    /// ⌈days · 86 400 000 / minor_cycle_ms⌉, or `None` on overflow.
    pub fn cycles_for(days: u64, minor_cycle_ms: u64) -> Option<Cycle> {
        days.checked_mul(MS_PER_DAY)
            .map(|ms| ms.div_ceil(minor_cycle_ms))
    }

    /// Timestamp of the final cycle of a run, or `None` when it is not
    /// representable.
    pub fn end_of_run(start: NaiveDateTime, minor_cycle_ms: u64, days: u64) -> Option<NaiveDateTime> {
        let span_ms = Self::cycles_for(days, minor_cycle_ms)?.checked_mul(minor_cycle_ms)?;
        let span = Duration::try_milliseconds(i64::try_from(span_ms).ok()?)?;
        start.checked_add_signed(span)
    }

    /// Advance one cycle. Returns the new cycle number.
    /// Panics if the run is already over — callers must check.
    pub fn advance(&mut self) -> Cycle {
        assert!(!self.finished(), "advance() called on finished clock");
        self.current_cycle += 1;
        self.current_cycle
    }

    pub fn finished(&self) -> bool {
        self.current_cycle >= self.total_cycles
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.current_cycle * self.minor_cycle_ms
    }

    /// Simulated timestamp of the current cycle.
    pub fn now(&self) -> NaiveDateTime {
        self.timestamp_of(self.current_cycle)
    }

    pub fn timestamp_of(&self, cycle: Cycle) -> NaiveDateTime {
        let ms = (cycle * self.minor_cycle_ms) as i64;
        self.start + Duration::milliseconds(ms)
    }
}
