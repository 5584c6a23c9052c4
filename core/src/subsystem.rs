//! Sensor subsystem trait.
//!
//! RULE: Every sensor family implements SensorSubsystem.
//! The engine calls update() on each registered family
//! in registration order, every cycle. Each family owns its own
//! cadence counters and persistent state; nothing is global.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    environment::EnvironmentState,
    event::SensorReading,
    occupancy::TriggerDraws,
    rng::{SubsystemRng, SubsystemSlot},
    types::Cycle,
};
use chrono::NaiveDateTime;
use std::any::Any;

/// Everything a family may look at for one cycle.
#[derive(Debug, Clone)]
pub struct CycleContext<'a> {
    pub cycle:       Cycle,
    pub timestamp:   NaiveDateTime,
    pub environment: EnvironmentState,
    pub triggers:    &'a TriggerDraws,
}

/// The contract every sensor family must fulfill.
pub trait SensorSubsystem: Send {
    /// Unique stable name for this family.
    fn name(&self) -> &'static str;

    /// RNG slot the engine derives this family's stream from.
    fn slot(&self) -> SubsystemSlot;

    /// Called once per cycle by the engine.
    ///
    /// - `ctx`: the cycle's timestamp, environment and trigger draws
    /// - `rng`: this family's deterministic RNG stream (persists across cycles)
    ///
    /// Returns the readings completed this cycle, possibly none.
    fn update(&mut self, ctx: &CycleContext<'_>, rng: &mut SubsystemRng) -> Vec<SensorReading>;

    /// For downcasting in tests and tooling only.
    /// Production sim code never uses this.
    fn as_any(&self) -> &dyn Any;
}
