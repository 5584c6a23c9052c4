//! Humidity / CO2 sensor pair sharing one hub.
//!
//! Two independent cadence counters:
//!   humidity updates every 100 cycles, CO2 every 150 cycles.
//! The hub writes one record every cycle. A slot whose counter is not due
//! carries `Missing`, which the encoder writes as its sentinel. A due reading can still fail (probability = failure rate),
//! in which case it is `Missing` too.

use crate::{
    event::{ReadingKind, SensorReading},
    rng::{SubsystemRng, SubsystemSlot},
    subsystem::{CycleContext, SensorSubsystem},
    types::{Cycle, Sample},
};

pub const HUMIDITY_PERIOD: Cycle = 100;
pub const CO2_PERIOD: Cycle = 150;

const HUMIDITY_MEAN: f64 = 45.0;
const HUMIDITY_STEP: f64 = 0.5;
const HUMIDITY_REVERSION: f64 = 0.05;

const CO2_OUTDOOR_PPM: f64 = 420.0;
/// Added per occupant; occupants are home and doors are shut at night.
const CO2_PER_OCCUPANT_DAY: f64 = 80.0;
const CO2_PER_OCCUPANT_NIGHT: f64 = 140.0;
const CO2_NOISE_PPM: f64 = 25.0;

pub struct HumidityCo2Subsystem {
    failure_rate:  f64,
    occupants:     u32,
    humidity:      f64,
    pub humidity_updates:  u64,
    pub co2_updates:       u64,
    pub dropouts:          u64,
}

impl HumidityCo2Subsystem {
    pub fn new(failure_rate: f64, occupants: u32) -> Self {
        Self {
            failure_rate,
            occupants,
            humidity: HUMIDITY_MEAN,
            humidity_updates: 0,
            co2_updates: 0,
            dropouts: 0,
        }
    }

    /// Mean-reverting random walk around the indoor mean.
    fn next_humidity(&mut self, rng: &mut SubsystemRng) -> f64 {
        let step = rng.uniform(-HUMIDITY_STEP, HUMIDITY_STEP);
        self.humidity += step + HUMIDITY_REVERSION * (HUMIDITY_MEAN - self.humidity);
        self.humidity
    }

    fn next_co2(&self, is_day: bool, rng: &mut SubsystemRng) -> f64 {
        let per_occupant = if is_day { CO2_PER_OCCUPANT_DAY } else { CO2_PER_OCCUPANT_NIGHT };
        CO2_OUTDOOR_PPM
            + self.occupants as f64 * per_occupant
            + rng.uniform(-CO2_NOISE_PPM, CO2_NOISE_PPM)
    }

    fn with_dropout(&mut self, value: f64, rng: &mut SubsystemRng) -> Sample<f64> {
        if rng.chance(self.failure_rate) {
            self.dropouts += 1;
            Sample::Missing
        } else {
            Sample::Real(value)
        }
    }
}

impl SensorSubsystem for HumidityCo2Subsystem {
    fn name(&self) -> &'static str { "humidity_co2" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::HumidityCo2 }

    fn update(&mut self, ctx: &CycleContext<'_>, rng: &mut SubsystemRng) -> Vec<SensorReading> {
        let humidity_due = ctx.cycle.is_multiple_of(HUMIDITY_PERIOD);
        let co2_due = ctx.cycle.is_multiple_of(CO2_PERIOD);

        let humidity = if humidity_due {
            self.humidity_updates += 1;
            let value = self.next_humidity(rng);
            self.with_dropout(value, rng)
        } else {
            Sample::Missing
        };

        let co2_ppm = if co2_due {
            self.co2_updates += 1;
            let value = self.next_co2(ctx.environment.is_day(), rng);
            self.with_dropout(value, rng)
        } else {
            Sample::Missing
        };

        vec![SensorReading {
            cycle:     ctx.cycle,
            timestamp: ctx.timestamp,
            kind:      ReadingKind::HumidityCo2 { humidity, co2_ppm },
        }]
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
