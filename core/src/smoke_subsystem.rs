//! Smoke detector — two independent hazard processes.
//!
//! Smoke:   Bernoulli(m · hazard_per_ms) every cycle, at most one event per cycle.
//! Battery: fires every ⌊20 736 000 000 / m⌋ ± ⌊2 592 000 000 / m⌋ cycles
//!          (240 days ± 30 days). The jitter is drawn once per occurrence,
//!          uniformly over the ± range, and the next occurrence is scheduled
//!          from the cycle the alarm fired on.
//!
//! Execution: every cycle.

use crate::{
    event::{ReadingKind, SensorReading, SmokeReason},
    rng::{SubsystemRng, SubsystemSlot},
    subsystem::{CycleContext, SensorSubsystem},
    types::Cycle,
};

pub const BATTERY_INTERVAL_MS: u64 = 20_736_000_000;
pub const BATTERY_JITTER_MS: u64 = 2_592_000_000;

pub struct SmokeSubsystem {
    smoke_probability: f64,
    battery_interval:  Cycle,
    battery_jitter:    Cycle,
    /// Persists for the whole run.
    pub next_battery_event_cycle: Cycle,
    pub smoke_events:   u64,
    pub battery_events: u64,
}

impl SmokeSubsystem {
    /// Schedules the first battery alarm from cycle 0 using `rng`.
    pub fn new(minor_cycle_ms: u64, hazard_per_ms: f64, rng: &mut SubsystemRng) -> Self {
        let mut detector = Self {
            smoke_probability: (minor_cycle_ms as f64 * hazard_per_ms).min(1.0),
            battery_interval:  BATTERY_INTERVAL_MS / minor_cycle_ms,
            battery_jitter:    BATTERY_JITTER_MS / minor_cycle_ms,
            next_battery_event_cycle: 0,
            smoke_events: 0,
            battery_events: 0,
        };
        detector.next_battery_event_cycle = detector.schedule_battery(0, rng);
        detector
    }

    pub fn smoke_probability(&self) -> f64 {
        self.smoke_probability
    }

    /// (interval, jitter) in cycles.
    pub fn battery_window(&self) -> (Cycle, Cycle) {
        (self.battery_interval, self.battery_jitter)
    }

    fn schedule_battery(&self, from: Cycle, rng: &mut SubsystemRng) -> Cycle {
        let jitter = self.battery_jitter as i64;
        let offset = self.battery_interval as i64 + rng.range_i64(-jitter, jitter);
        from + offset.max(1) as Cycle
    }
}

impl SensorSubsystem for SmokeSubsystem {
    fn name(&self) -> &'static str { "smoke" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Smoke }

    fn update(&mut self, ctx: &CycleContext<'_>, rng: &mut SubsystemRng) -> Vec<SensorReading> {
        let mut readings = Vec::new();
        let mut emit = |reason| {
            readings.push(SensorReading {
                cycle:     ctx.cycle,
                timestamp: ctx.timestamp,
                kind:      ReadingKind::Smoke { reason },
            })
        };

        if ctx.cycle >= self.next_battery_event_cycle {
            self.battery_events += 1;
            self.next_battery_event_cycle = self.schedule_battery(ctx.cycle, rng);
            log::debug!(
                "cycle={} smoke detector: battery alarm, next at cycle {}",
                ctx.cycle,
                self.next_battery_event_cycle
            );
            emit(SmokeReason::Battery);
        }

        if rng.chance(self.smoke_probability) {
            self.smoke_events += 1;
            log::debug!("cycle={} smoke detector: smoke alarm", ctx.cycle);
            emit(SmokeReason::Smoke);
        }

        readings
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
