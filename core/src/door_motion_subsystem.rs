//! Door and motion sensors — passive voltage state machines.
//!
//! States per sensor:
//!   Low ──trigger──▶ Rising ──▶ High ──window elapsed──▶ Falling ──▶ Low
//! A trigger while High restarts the detection window; a trigger while
//! Falling restarts the ramp; a trigger while Rising is absorbed.
//!
//! Voltages:
//!   Low            0..=1800 mV
//!   High           3100..=5000 mV
//!   Rising/Falling 1801..=3099 mV, stepping through the undefined band
//!
//! Reports: every sensor reports at each 30 s boundary (snapshot), and a
//! sensor also reports on any cycle its logic band changes (edge).
//!
//! Execution: every cycle (voltage evolves even when nothing is reported).

use crate::{
    encoding::{DETECTED_MIN_MV, UNDETECTED_MAX_MV},
    event::{LogicBand, ReadingKind, ReportKind, SensorReading},
    occupancy::PassiveStyle,
    rng::{SubsystemRng, SubsystemSlot},
    subsystem::{CycleContext, SensorSubsystem},
    types::{Cycle, SensorId},
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_PERIOD_MS: u64 = 30_000;
/// Cycles spent crossing the undefined band in either direction.
pub const RAMP_CYCLES: u8 = 2;
pub const DOOR_WINDOW_MS: u64 = 2_000;
pub const MOTION_WINDOW_MS: u64 = 5_000;
const HIGH_MAX_MV: u16 = 5_000;
const RAMP_JITTER_MV: i64 = 100;

pub const DOOR_IDS: [SensorId; 3] = ["d1", "d2", "d3"];
pub const MOTION_IDS: [SensorId; 3] = ["m1", "m2", "m3"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PassiveState {
    Low,
    Rising { step: u8 },
    High { remaining: Cycle },
    Falling { step: u8 },
}

impl PassiveState {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rising { .. } | Self::Falling { .. })
    }

    fn next(self, triggered: bool, window: Cycle) -> Self {
        match self {
            Self::Low if triggered => Self::Rising { step: 0 },
            Self::Low => Self::Low,
            Self::Rising { step } if step + 1 < RAMP_CYCLES => Self::Rising { step: step + 1 },
            Self::Rising { .. } => Self::High { remaining: window },
            Self::High { .. } if triggered => Self::High { remaining: window },
            Self::High { remaining } if remaining > 1 => Self::High { remaining: remaining - 1 },
            Self::High { .. } => Self::Falling { step: 0 },
            Self::Falling { .. } if triggered => Self::Rising { step: 0 },
            Self::Falling { step } if step + 1 < RAMP_CYCLES => Self::Falling { step: step + 1 },
            Self::Falling { .. } => Self::Low,
        }
    }
}

/// Centre of the undefined band at `step` of a ramp.
fn ramp_centre_mv(step: u8, rising: bool) -> i64 {
    let span = (DETECTED_MIN_MV - UNDETECTED_MAX_MV) as i64;
    let offset = span * (step as i64 + 1) / (RAMP_CYCLES as i64 + 1);
    if rising {
        UNDETECTED_MAX_MV as i64 + offset
    } else {
        DETECTED_MIN_MV as i64 - offset
    }
}

#[derive(Debug, Clone)]
pub struct PassiveSensor {
    pub id:     SensorId,
    pub style:  PassiveStyle,
    pub state:  PassiveState,
    window:     Cycle,
    last_band:  LogicBand,
}

/// Result of one sensor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveStep {
    pub voltage_mv: u16,
    pub band:       LogicBand,
    pub edge:       bool,
}

impl PassiveSensor {
    pub fn new(id: SensorId, style: PassiveStyle, window: Cycle) -> Self {
        Self {
            id,
            style,
            state: PassiveState::Low,
            window: window.max(1),
            last_band: LogicBand::Undetected,
        }
    }

    /// Advance one cycle and read the voltage of the new state.
    pub fn step(&mut self, triggered: bool, rng: &mut SubsystemRng) -> PassiveStep {
        self.state = self.state.next(triggered, self.window);
        let voltage_mv = self.voltage(rng);
        let band = LogicBand::of(voltage_mv);
        let edge = band != self.last_band;
        self.last_band = band;
        PassiveStep { voltage_mv, band, edge }
    }

    fn voltage(&self, rng: &mut SubsystemRng) -> u16 {
        let mv = match self.state {
            PassiveState::Low => rng.range_i64(0, UNDETECTED_MAX_MV as i64),
            PassiveState::High { .. } => rng.range_i64(DETECTED_MIN_MV as i64, HIGH_MAX_MV as i64),
            PassiveState::Rising { step } | PassiveState::Falling { step } => {
                let rising = matches!(self.state, PassiveState::Rising { .. });
                let jitter = rng.range_i64(-RAMP_JITTER_MV, RAMP_JITTER_MV);
                (ramp_centre_mv(step, rising) + jitter).clamp(
                    UNDETECTED_MAX_MV as i64 + 1,
                    DETECTED_MIN_MV as i64 - 1,
                )
            }
        };
        mv as u16
    }
}

pub struct DoorMotionSubsystem {
    pub sensors:     Vec<PassiveSensor>,
    snapshot_period: Cycle,
    pub snapshots:   u64,
    pub edges:       u64,
}

impl DoorMotionSubsystem {
    /// The fixed house topology: three door and three motion sensors.
    pub fn new(minor_cycle_ms: u64) -> Self {
        let cycles = |ms: u64| (ms / minor_cycle_ms).max(1);
        let doors = DOOR_IDS
            .into_iter()
            .map(|id| PassiveSensor::new(id, PassiveStyle::Door, cycles(DOOR_WINDOW_MS)));
        let motions = MOTION_IDS
            .into_iter()
            .map(|id| PassiveSensor::new(id, PassiveStyle::Motion, cycles(MOTION_WINDOW_MS)));
        Self {
            sensors: doors.chain(motions).collect(),
            snapshot_period: cycles(SNAPSHOT_PERIOD_MS),
            snapshots: 0,
            edges: 0,
        }
    }

    pub fn snapshot_period(&self) -> Cycle {
        self.snapshot_period
    }

    pub fn door_count(&self) -> usize {
        DOOR_IDS.len()
    }

    pub fn motion_count(&self) -> usize {
        MOTION_IDS.len()
    }
}

impl SensorSubsystem for DoorMotionSubsystem {
    fn name(&self) -> &'static str { "door_motion" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::DoorMotion }

    fn update(&mut self, ctx: &CycleContext<'_>, rng: &mut SubsystemRng) -> Vec<SensorReading> {
        let snapshot = ctx.cycle.is_multiple_of(self.snapshot_period);
        let (mut door_idx, mut motion_idx) = (0usize, 0usize);
        let mut readings = Vec::new();

        for sensor in &mut self.sensors {
            let draws = ctx.triggers.for_style(sensor.style);
            let idx = match sensor.style {
                PassiveStyle::Door => &mut door_idx,
                PassiveStyle::Motion => &mut motion_idx,
            };
            let triggered = draws.get(*idx).copied().unwrap_or(false);
            *idx += 1;

            let step = sensor.step(triggered, rng);
            if !(snapshot || step.edge) {
                continue;
            }
            let report = if step.edge {
                self.edges += 1;
                ReportKind::Edge
            } else {
                self.snapshots += 1;
                ReportKind::Snapshot
            };
            readings.push(SensorReading {
                cycle:     ctx.cycle,
                timestamp: ctx.timestamp,
                kind:      ReadingKind::DoorMotion {
                    sensor_id:  sensor.id,
                    style:      sensor.style,
                    voltage_mv: step.voltage_mv,
                    band:       step.band,
                    report,
                },
            });
        }
        readings
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
