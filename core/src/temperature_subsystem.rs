//! Hub temperature sensors (T1 decimal, T2 narrowed float).
//!
//! Both sensors read one shared sample per cycle:
//!   baseline + environment bias for the thermostat side + uniform noise,
//! clamped to [-100, 250] °F. A failed read (probability = failure rate)
//! yields `Missing` for that cycle.
//!
//! Execution: every cycle.

use crate::{
    encoding::clamp_temperature,
    event::{ReadingKind, SensorReading},
    rng::{SubsystemRng, SubsystemSlot},
    subsystem::{CycleContext, SensorSubsystem},
    types::{Sample, Side},
};

pub struct TemperatureSubsystem {
    baseline_f:   f64,
    noise_f:      f64,
    side:         Side,
    failure_rate: f64,
    pub readings: u64,
    pub dropouts: u64,
}

impl TemperatureSubsystem {
    pub fn new(baseline_f: f64, noise_f: f64, side: Side, failure_rate: f64) -> Self {
        Self {
            baseline_f,
            noise_f,
            side,
            failure_rate,
            readings: 0,
            dropouts: 0,
        }
    }

    /// One sensor read. Draws noise, then the failure roll, every call.
    pub fn sample(&mut self, bias_f: f64, rng: &mut SubsystemRng) -> Sample<f64> {
        let noise = rng.uniform(-self.noise_f, self.noise_f);
        let failed = rng.chance(self.failure_rate);
        self.readings += 1;
        if failed {
            self.dropouts += 1;
            return Sample::Missing;
        }
        Sample::Real(clamp_temperature(self.baseline_f + bias_f + noise))
    }
}

impl SensorSubsystem for TemperatureSubsystem {
    fn name(&self) -> &'static str { "temperature" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Temperature }

    fn update(&mut self, ctx: &CycleContext<'_>, rng: &mut SubsystemRng) -> Vec<SensorReading> {
        let value = self.sample(ctx.environment.bias(self.side), rng);
        if value.is_missing() {
            log::debug!("cycle={} temperature dropout", ctx.cycle);
        }
        vec![SensorReading {
            cycle:     ctx.cycle,
            timestamp: ctx.timestamp,
            kind:      ReadingKind::Temperature { value },
        }]
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
