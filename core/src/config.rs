//! Run configuration.
//!
//! Every tunable of a run lives on `SimulationConfig`. The struct is
//! deserialized from a JSON file (`load`) or built in code, and must pass
//! `validate()` before the engine will accept it.

use crate::{
    clock::SimClock,
    error::{SimError, SimResult},
    types::Side,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Upper bound on a single minor cycle: one simulated day.
pub const MAX_MINOR_CYCLE_MS: i64 = 86_400_000;

/// Every emitted date must fit a four-digit year field.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Smoke hazard per simulated millisecond.
///
/// With `p = minor_cycle_ms · hazard` this gives about 4 alarms per
/// simulated year. Use 3.1688e-10 for roughly 10 per year.
pub const DEFAULT_SMOKE_HAZARD_PER_MS: f64 = 1.27e-10;

/// Wire width of the T2 narrowed float.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureEncoding {
    /// IEEE 754 binary16, two byte packets.
    Half,
    /// IEEE 754 binary32, four byte packets.
    #[default]
    Single,
}

impl TemperatureEncoding {
    pub fn packet_count(&self) -> usize {
        match self {
            Self::Half => 2,
            Self::Single => 4,
        }
    }
}

/// Width of the smoke detector reason tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmokeTagFormat {
    /// `S` / `B`
    #[default]
    Char,
    /// `SMOK` / `BATT`
    Word,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Only used by persistence to name output files.
    pub base_name:           String,
    pub start_date:          NaiveDate,
    pub days_to_simulate:    i64,
    pub minor_cycle_ms:      i64,
    pub occupant_count:      i64,
    /// Degrees F applied to the sun side by day and removed from both sides at night.
    pub sun_bias:            f64,
    pub sensor_failure_rate: f64,
    pub random_seed:         Option<u64>,

    pub temperature_encoding: TemperatureEncoding,
    pub smoke_tag_format:     SmokeTagFormat,
    pub baseline_temp_f:      f64,
    /// Half-width of the uniform temperature sensor noise, degrees F.
    pub temp_noise_f:         f64,
    /// Wall the hub thermostat (T1/T2) is mounted on.
    pub thermostat_side:      Side,
    pub smoke_hazard_per_ms:  f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_name:            "homesim".into(),
            start_date:           NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days_to_simulate:     365,
            minor_cycle_ms:       500,
            occupant_count:       2,
            sun_bias:             2.0,
            sensor_failure_rate:  0.001,
            random_seed:          None,
            temperature_encoding: TemperatureEncoding::default(),
            smoke_tag_format:     SmokeTagFormat::default(),
            baseline_temp_f:      72.0,
            temp_noise_f:         0.1,
            thermostat_side:      Side::East,
            smoke_hazard_per_ms:  DEFAULT_SMOKE_HAZARD_PER_MS,
        }
    }
}

impl SimulationConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    /// The result is not validated; the engine validates on build.
    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Config with hardcoded values for use in tests: one day of
    /// one-second cycles, fixed seed, no sensor failures.
    pub fn default_test() -> Self {
        Self {
            base_name:           "test".into(),
            start_date:          NaiveDate::from_ymd_opt(1995, 2, 1).unwrap_or_default(),
            days_to_simulate:    1,
            minor_cycle_ms:      1_000,
            occupant_count:      2,
            sun_bias:            2.0,
            sensor_failure_rate: 0.0,
            random_seed:         Some(42),
            ..Self::default()
        }
    }

    /// Reject every out-of-range option. Called before any tick runs.
    pub fn validate(&self) -> SimResult<()> {
        if self.days_to_simulate <= 0 {
            return Err(SimError::config(
                "days_to_simulate",
                format!("must be positive, got {}", self.days_to_simulate),
            ));
        }
        if self.minor_cycle_ms <= 0 || self.minor_cycle_ms > MAX_MINOR_CYCLE_MS {
            return Err(SimError::config(
                "minor_cycle_ms",
                format!("must be in 1..={MAX_MINOR_CYCLE_MS}, got {}", self.minor_cycle_ms),
            ));
        }
        if self.start_date.year() < MIN_YEAR {
            return Err(SimError::config(
                "start_date",
                format!("year must be within {MIN_YEAR}..={MAX_YEAR}, got {}", self.start_date),
            ));
        }
        let start = self.start_date.and_time(NaiveTime::MIN);
        match SimClock::end_of_run(start, self.minor_cycle(), self.days()) {
            Some(end) if end.year() <= MAX_YEAR => {}
            _ => {
                return Err(SimError::config(
                    "days_to_simulate",
                    format!(
                        "{} days from {} runs past the year {MAX_YEAR}",
                        self.days_to_simulate, self.start_date
                    ),
                ))
            }
        }
        if self.occupant_count < 0 {
            return Err(SimError::config(
                "occupant_count",
                format!("must be non-negative, got {}", self.occupant_count),
            ));
        }
        if !(0.0..=1.0).contains(&self.sensor_failure_rate) {
            return Err(SimError::config(
                "sensor_failure_rate",
                format!("must be within [0, 1], got {}", self.sensor_failure_rate),
            ));
        }
        if !self.sun_bias.is_finite() {
            return Err(SimError::config("sun_bias", "must be finite"));
        }
        if !self.baseline_temp_f.is_finite() {
            return Err(SimError::config("baseline_temp_f", "must be finite"));
        }
        if !self.temp_noise_f.is_finite() || self.temp_noise_f < 0.0 {
            return Err(SimError::config(
                "temp_noise_f",
                format!("must be finite and non-negative, got {}", self.temp_noise_f),
            ));
        }
        if !(0.0..=1.0).contains(&self.smoke_hazard_per_ms) {
            return Err(SimError::config(
                "smoke_hazard_per_ms",
                format!("must be within [0, 1], got {}", self.smoke_hazard_per_ms),
            ));
        }
        Ok(())
    }

    /// The configured seed, or a freshly drawn one when absent.
    /// The only place the platform RNG is consulted.
    pub fn resolve_seed(&self) -> u64 {
        self.random_seed.unwrap_or_else(rand::random)
    }

    /// Typed accessors; only meaningful after `validate()` succeeded.
    pub fn minor_cycle(&self) -> u64 {
        self.minor_cycle_ms as u64
    }

    pub fn days(&self) -> u64 {
        self.days_to_simulate as u64
    }

    pub fn occupants(&self) -> u32 {
        self.occupant_count.clamp(0, u32::MAX as i64) as u32
    }
}
