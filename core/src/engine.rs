//! The simulation engine — drives the minor-cycle loop.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. Advance the clock by one minor cycle
//!   1. Environment model   (pure, from the new timestamp)
//!   2. Occupancy model     (door/motion trigger draws)
//!   3. Temperature         (every cycle)
//!   4. Door / motion       (every cycle; reports at 30 s or on edges)
//!   5. Humidity / CO2      (every 100 / 150 cycles)
//!   6. Smoke detector      (every cycle)
//!   7. Encoder layer       (readings → emitted events)
//!
//! RULES:
//!   - One cycle fully completes before the next begins.
//!   - Each family draws only from its own RNG stream.
//!   - Configuration is validated before the first cycle; a run that
//!     fails validation produces no events at all.

use crate::{
    clock::SimClock,
    config::SimulationConfig,
    door_motion_subsystem::DoorMotionSubsystem,
    encoding::{self, EncoderSettings},
    environment::environment_at,
    error::SimResult,
    event::EmittedEvent,
    humidity_co2_subsystem::HumidityCo2Subsystem,
    occupancy::OccupancyModel,
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    smoke_subsystem::SmokeSubsystem,
    subsystem::{CycleContext, SensorSubsystem},
    temperature_subsystem::TemperatureSubsystem,
    types::Cycle,
};
use chrono::NaiveTime;
use std::collections::VecDeque;

pub struct SimEngine {
    pub clock:     SimClock,
    pub occupancy: OccupancyModel,
    seed:          u64,
    sun_bias:      f64,
    encoder:       EncoderSettings,
    occupancy_rng: SubsystemRng,
    subsystems:    Vec<(SubsystemRng, Box<dyn SensorSubsystem>)>,
    pending:       VecDeque<EmittedEvent>,
}

impl SimEngine {
    /// Validate `config` and build a fully wired engine with every
    /// family registered. Fails before any cycle runs.
    pub fn build(config: &SimulationConfig) -> SimResult<Self> {
        config.validate()?;

        let seed = config.resolve_seed();
        let bank = RngBank::new(seed);
        let minor_cycle_ms = config.minor_cycle();
        let start = config.start_date.and_time(NaiveTime::MIN);
        let clock = SimClock::new(start, minor_cycle_ms, config.days())?;

        let door_motion = DoorMotionSubsystem::new(minor_cycle_ms);
        let occupancy = OccupancyModel::new(
            config.occupants(),
            minor_cycle_ms,
            door_motion.door_count(),
            door_motion.motion_count(),
        );

        let mut smoke_rng = bank.for_subsystem(SubsystemSlot::Smoke);
        let smoke = SmokeSubsystem::new(minor_cycle_ms, config.smoke_hazard_per_ms, &mut smoke_rng);

        log::info!(
            "run built: seed={seed} start={} days={} minor_cycle={}ms cycles={} occupants={}",
            config.start_date,
            config.days(),
            minor_cycle_ms,
            clock.total_cycles,
            config.occupants()
        );
        if config.random_seed.is_none() {
            log::info!("no seed configured; generated seed {seed} (pass it back to reproduce)");
        }

        let mut engine = Self {
            clock,
            occupancy,
            seed,
            sun_bias: config.sun_bias,
            encoder: EncoderSettings {
                temperature: config.temperature_encoding,
                smoke_tag:   config.smoke_tag_format,
            },
            occupancy_rng: bank.for_subsystem(SubsystemSlot::Occupancy),
            subsystems: Vec::new(),
            pending: VecDeque::new(),
        };

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(
            &bank,
            Box::new(TemperatureSubsystem::new(
                config.baseline_temp_f,
                config.temp_noise_f,
                config.thermostat_side,
                config.sensor_failure_rate,
            )),
        );
        engine.register(&bank, Box::new(door_motion));
        engine.register(
            &bank,
            Box::new(HumidityCo2Subsystem::new(config.sensor_failure_rate, config.occupants())),
        );
        // Smoke's stream already scheduled the first battery alarm; keep it.
        log::debug!("registered {} on slot {:?}", smoke.name(), smoke.slot());
        engine.subsystems.push((smoke_rng, Box::new(smoke) as Box<dyn SensorSubsystem>));

        Ok(engine)
    }

    /// Register a family with a fresh stream for its slot.
    /// Call in the documented execution order.
    pub fn register(&mut self, bank: &RngBank, subsystem: Box<dyn SensorSubsystem>) {
        let rng = bank.for_subsystem(subsystem.slot());
        log::debug!("registered {} on slot {:?}", subsystem.name(), subsystem.slot());
        self.subsystems.push((rng, subsystem));
    }

    /// The seed actually used, configured or generated.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn finished(&self) -> bool {
        self.clock.finished()
    }

    /// Advance one minor cycle. This is the core simulation step.
    /// Returns the events of the new cycle, all sharing its timestamp.
    pub fn tick(&mut self) -> Vec<EmittedEvent> {
        let cycle = self.clock.advance();
        let timestamp = self.clock.now();
        let environment = environment_at(timestamp, self.sun_bias);
        let triggers = self.occupancy.draw(environment.is_day(), &mut self.occupancy_rng);

        let ctx = CycleContext { cycle, timestamp, environment, triggers: &triggers };

        let mut events = Vec::new();
        for (rng, subsystem) in &mut self.subsystems {
            for reading in subsystem.update(&ctx, rng) {
                events.push(encoding::encode(&reading, &self.encoder));
            }
        }

        log::trace!("cycle={cycle} at {timestamp}: {} events", events.len());
        events
    }

    /// Run up to `n` cycles eagerly, stopping early at the end date.
    /// Used for testing and fast-forward.
    pub fn run_cycles(&mut self, n: Cycle) -> Vec<EmittedEvent> {
        let mut out: Vec<EmittedEvent> = self.pending.drain(..).collect();
        for _ in 0..n {
            if self.finished() {
                break;
            }
            out.extend(self.tick());
        }
        out
    }

    /// Query a registered family's state by concrete type.
    /// Used by tests and the runner to print end-of-run summaries.
    pub fn subsystem<T: 'static>(&self) -> Option<&T> {
        self.subsystems
            .iter()
            .find_map(|(_, sub)| sub.as_any().downcast_ref::<T>())
    }
}

/// Lazy event stream: cycles run only as the consumer pulls.
/// Dropping the engine early abandons the run without side effects.
impl Iterator for SimEngine {
    type Item = EmittedEvent;

    fn next(&mut self) -> Option<EmittedEvent> {
        while self.pending.is_empty() {
            if self.finished() {
                return None;
            }
            let events = self.tick();
            self.pending.extend(events);
        }
        self.pending.pop_front()
    }
}

/// Build a run from `config` and return its lazy, finite event sequence,
/// ordered non-decreasing by timestamp.
pub fn run(config: &SimulationConfig) -> SimResult<SimEngine> {
    SimEngine::build(config)
}
