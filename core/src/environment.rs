//! Environment model — sun position and per-side temperature bias.
//!
//! Pure function of simulated time. Nothing here is stored between cycles.
//!   - Sun is up iff local time ∈ [06:00, 18:00).
//!   - Altitude is sin(π · (t − 06:00) / 12h): 0 at sunrise/sunset, 1 at noon.
//!   - Mornings light the east side, afternoons (from 12:00) the west side.
//!   - By day the lit side warms by sun_bias · altitude; by night both sides
//!     cool by sun_bias.

use crate::types::Side;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const SUNRISE_HOUR: u32 = 6;
pub const SUNSET_HOUR: u32 = 18;
const NOON_SECONDS: f64 = 12.0 * 3600.0;
const DAYLIGHT_SECONDS: f64 = ((SUNSET_HOUR - SUNRISE_HOUR) * 3600) as f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentState {
    /// Side currently facing the sun; `None` at night.
    pub sun_side:  Option<Side>,
    /// Normalised solar altitude in [0, 1].
    pub altitude:  f64,
    pub bias_east: f64,
    pub bias_west: f64,
}

impl EnvironmentState {
    pub fn is_day(&self) -> bool {
        self.sun_side.is_some()
    }

    pub fn bias(&self, side: Side) -> f64 {
        match side {
            Side::East => self.bias_east,
            Side::West => self.bias_west,
        }
    }
}

/// True iff local time ∈ [06:00, 18:00).
pub fn is_daytime(at: NaiveDateTime) -> bool {
    (SUNRISE_HOUR..SUNSET_HOUR).contains(&at.hour())
}

pub fn environment_at(at: NaiveDateTime, sun_bias: f64) -> EnvironmentState {
    if !is_daytime(at) {
        return EnvironmentState {
            sun_side:  None,
            altitude:  0.0,
            bias_east: -sun_bias,
            bias_west: -sun_bias,
        };
    }

    let secs = at.num_seconds_from_midnight() as f64 + at.nanosecond() as f64 * 1e-9;
    let since_sunrise = secs - (SUNRISE_HOUR * 3600) as f64;
    let altitude = (PI * since_sunrise / DAYLIGHT_SECONDS).sin().max(0.0);
    let warm = sun_bias * altitude;

    if secs < NOON_SECONDS {
        EnvironmentState { sun_side: Some(Side::East), altitude, bias_east: warm, bias_west: 0.0 }
    } else {
        EnvironmentState { sun_side: Some(Side::West), altitude, bias_east: 0.0, bias_west: warm }
    }
}
