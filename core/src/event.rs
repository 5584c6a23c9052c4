//! Typed sensor readings and the emitted event records.
//!
//! RULE: Sensor subsystems produce `SensorReading`s only.
//! The encoder layer is the single place that turns a reading into
//! its wire representation, producing an immutable `EmittedEvent`.

use crate::{
    types::{Cycle, Sample, SensorId},
    occupancy::PassiveStyle,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Routing tag for the persistence collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SensorFamily {
    Temperature,
    DoorMotion,
    HumidityCo2,
    Smoke,
}

impl SensorFamily {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::DoorMotion  => "door_motion",
            Self::HumidityCo2 => "humidity_co2",
            Self::Smoke       => "smoke",
        }
    }
}

/// Voltage logic bands of a passive sensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogicBand {
    /// ≤ 1800 mV
    Undetected,
    /// 1801..=3099 mV
    Undefined,
    /// ≥ 3100 mV
    Detected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Fixed 30 s report, regardless of state.
    Snapshot,
    /// Logic band changed this cycle.
    Edge,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SmokeReason {
    Smoke,
    Battery,
}

/// A typed reading, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub cycle:     Cycle,
    pub timestamp: NaiveDateTime,
    pub kind:      ReadingKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingKind {
    /// Clamped true temperature shared by T1 and T2.
    Temperature {
        value: Sample<f64>,
    },
    DoorMotion {
        sensor_id:  SensorId,
        style:      PassiveStyle,
        voltage_mv: u16,
        band:       LogicBand,
        report:     ReportKind,
    },
    /// Raw model values; range policy is applied by the encoder.
    HumidityCo2 {
        humidity: Sample<f64>,
        co2_ppm:  Sample<f64>,
    },
    Smoke {
        reason: SmokeReason,
    },
}

impl ReadingKind {
    pub fn family(&self) -> SensorFamily {
        match self {
            Self::Temperature { .. } => SensorFamily::Temperature,
            Self::DoorMotion { .. }  => SensorFamily::DoorMotion,
            Self::HumidityCo2 { .. } => SensorFamily::HumidityCo2,
            Self::Smoke { .. }       => SensorFamily::Smoke,
        }
    }
}

/// The unit handed to the persistence collaborator. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmittedEvent {
    pub cycle:     Cycle,
    pub timestamp: NaiveDateTime,
    pub family:    SensorFamily,
    pub payload:   EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Temperature(TemperatureRecord),
    DoorMotion(DoorMotionRecord),
    HumidityCo2(HumidityCo2Record),
    Smoke(SmokeRecord),
}

/// One row per packet: T1 carries a single decimal packet, T2 carries
/// the narrowed float split into byte packets, least significant first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureRecord {
    /// `YYYY-MM-DD`
    pub date:    String,
    /// `HH:MM:SS.mmm`
    pub time:    String,
    pub value:   Sample<f64>,
    /// True when narrowing overflowed to ±infinity.
    pub saturated: bool,
    pub packets: Vec<TemperaturePacket>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemperaturePacket {
    pub sensor:    String,
    pub packet_id: String,
    pub payload:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoorMotionRecord {
    /// `YYYYJJJ-SSSSS`
    pub stamp:      String,
    pub sensor_id:  String,
    pub style:      PassiveStyle,
    pub voltage_mv: u16,
    pub band:       LogicBand,
    pub report:     ReportKind,
}

/// Fixed-width `YYYYMMMDDHHMMSS=AAA.aaa%BBBBBppm` record plus its audit flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HumidityCo2Record {
    pub text:             String,
    pub humidity:         Sample<f64>,
    pub co2_ppm:          Sample<u32>,
    pub humidity_clamped: bool,
    pub co2_clamped:      bool,
}

/// Minute-resolution smoke detector record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmokeRecord {
    pub year:   u64,
    pub month:  u8,
    pub day:    u8,
    pub hour:   u8,
    pub minute: u8,
    pub reason: SmokeReason,
    pub tag:    String,
    /// Fixed-layout struct bytes, see `encoding::smoke_bytes`.
    pub bytes:  Vec<u8>,
}
