//! Synthetic telemetry for a multi-sensor home-monitoring hub.
//!
//! `engine::run` validates a `SimulationConfig` and returns a lazy,
//! deterministic stream of `EmittedEvent`s, one minor cycle at a time.

pub mod clock;
pub mod config;
pub mod door_motion_subsystem;
pub mod encoding;
pub mod engine;
pub mod environment;
pub mod error;
pub mod event;
pub mod humidity_co2_subsystem;
pub mod occupancy;
pub mod rng;
pub mod smoke_subsystem;
pub mod subsystem;
pub mod temperature_subsystem;
pub mod types;

pub use config::SimulationConfig;
pub use engine::{run, SimEngine};
pub use error::{SimError, SimResult};
pub use event::{EmittedEvent, EventPayload, SensorFamily};
