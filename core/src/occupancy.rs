//! Occupancy model — per-cycle trigger draws for door and motion sensors.
//!
//! κ = n · β / 86 400 000 is a per-millisecond rate; the per-cycle
//! probability is p = κ · minor_cycle_ms. No occupant position is modeled:
//! every sensor gets its own independent Bernoulli(p) draw each cycle.

use crate::{
    rng::SubsystemRng,
    types::MS_PER_DAY,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassiveStyle {
    Door,
    Motion,
}

impl PassiveStyle {
    /// Expected triggers per occupant per day.
    pub fn beta(&self, is_day: bool) -> f64 {
        match (self, is_day) {
            (Self::Motion, true)  => 24.0,
            (Self::Motion, false) => 4.0,
            (Self::Door, true)    => 6.0,
            (Self::Door, false)   => 1.0,
        }
    }
}

/// Per-millisecond trigger rate κ = n · β / 86 400 000.
pub fn kappa(occupants: u32, style: PassiveStyle, is_day: bool) -> f64 {
    occupants as f64 * style.beta(is_day) / MS_PER_DAY as f64
}

/// Per-cycle trigger probability p = κ · m, capped at 1.
pub fn trigger_probability(
    occupants: u32,
    style: PassiveStyle,
    is_day: bool,
    minor_cycle_ms: u64,
) -> f64 {
    (kappa(occupants, style, is_day) * minor_cycle_ms as f64).min(1.0)
}

/// Trigger edges for one cycle, indexed like the sensor lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerDraws {
    pub doors:   Vec<bool>,
    pub motions: Vec<bool>,
}

impl TriggerDraws {
    pub fn any(&self) -> bool {
        self.doors.iter().chain(&self.motions).any(|t| *t)
    }

    pub fn for_style(&self, style: PassiveStyle) -> &[bool] {
        match style {
            PassiveStyle::Door => &self.doors,
            PassiveStyle::Motion => &self.motions,
        }
    }
}

pub struct OccupancyModel {
    occupants:      u32,
    minor_cycle_ms: u64,
    door_count:     usize,
    motion_count:   usize,
    /// Total edges produced so far, per style.
    pub door_triggers:   u64,
    pub motion_triggers: u64,
}

impl OccupancyModel {
    pub fn new(occupants: u32, minor_cycle_ms: u64, door_count: usize, motion_count: usize) -> Self {
        Self {
            occupants,
            minor_cycle_ms,
            door_count,
            motion_count,
            door_triggers: 0,
            motion_triggers: 0,
        }
    }

    pub fn probability(&self, style: PassiveStyle, is_day: bool) -> f64 {
        trigger_probability(self.occupants, style, is_day, self.minor_cycle_ms)
    }

    /// Draw every sensor's trigger for this cycle. Always consumes the same
    /// number of draws regardless of outcome, so the stream stays aligned.
    pub fn draw(&mut self, is_day: bool, rng: &mut SubsystemRng) -> TriggerDraws {
        let p_door = self.probability(PassiveStyle::Door, is_day);
        let p_motion = self.probability(PassiveStyle::Motion, is_day);

        let doors: Vec<bool> = (0..self.door_count).map(|_| rng.chance(p_door)).collect();
        let motions: Vec<bool> = (0..self.motion_count).map(|_| rng.chance(p_motion)).collect();

        self.door_triggers += doors.iter().filter(|t| **t).count() as u64;
        self.motion_triggers += motions.iter().filter(|t| **t).count() as u64;

        TriggerDraws { doors, motions }
    }
}
