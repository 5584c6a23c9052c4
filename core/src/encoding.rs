//! Encoder layer — pure functions from typed readings to wire formats.
//!
//! Formats produced here are the contract with downstream consumers:
//!   - Julian stamps            `YYYYJJJ-SSSSS`
//!   - T1 decimal text          `72.054`
//!   - T2 narrowed float        IEEE 754 binary16/binary32, byte packets LSB first
//!   - Humidity/CO2 record      `YYYYMMMDDHHMMSS=AAA.aaa%BBBBBppm`
//!   - Smoke struct             year:u64 LE | month | day | hour | minute | tag
//!
//! Out-of-range values are clamped (or saturate, for floats) and flagged;
//! they are never an error.

use crate::{
    config::{SmokeTagFormat, TemperatureEncoding},
    event::{
        DoorMotionRecord, EmittedEvent, EventPayload, HumidityCo2Record, LogicBand,
        ReadingKind, SensorReading, SmokeReason, SmokeRecord, TemperaturePacket,
        TemperatureRecord,
    },
    types::Sample,
};
use chrono::{Datelike, NaiveDateTime, Timelike};
use half::f16;

pub const TEMP_MIN_F: f64 = -100.0;
pub const TEMP_MAX_F: f64 = 250.0;

pub const HUMIDITY_MIN: f64 = 0.0;
pub const HUMIDITY_MAX: f64 = 100.0;
pub const CO2_MAX_PPM: u32 = 50_000;

pub const HUMIDITY_SENTINEL: &str = "999.999";
pub const CO2_SENTINEL: &str = "99999";

pub const UNDETECTED_MAX_MV: u16 = 1_800;
pub const DETECTED_MIN_MV: u16 = 3_100;

/// Per-run choices for the formats that have more than one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderSettings {
    pub temperature: TemperatureEncoding,
    pub smoke_tag:   SmokeTagFormat,
}

// ── Timestamps ───────────────────────────────────────────────────────────────

/// `YYYYJJJ-SSSSS`: year, day of year, seconds since midnight.
pub fn julian_stamp(at: NaiveDateTime) -> String {
    format!(
        "{:04}{:03}-{:05}",
        at.year(),
        at.ordinal(),
        at.num_seconds_from_midnight()
    )
}

// ── Temperature ──────────────────────────────────────────────────────────────

pub fn clamp_temperature(value: f64) -> f64 {
    value.clamp(TEMP_MIN_F, TEMP_MAX_F)
}

/// T1 payload: signed decimal, three places.
pub fn temperature_text(value: f64) -> String {
    format!("{value:.3}")
}

/// Narrow to the target width with IEEE round-to-nearest-even.
/// Returns little-endian bytes and whether the result overflowed to ±inf.
pub fn narrow_temperature(value: f64, encoding: TemperatureEncoding) -> (Vec<u8>, bool) {
    match encoding {
        TemperatureEncoding::Single => {
            let narrowed = value as f32;
            (narrowed.to_le_bytes().to_vec(), narrowed.is_infinite() && value.is_finite())
        }
        TemperatureEncoding::Half => {
            let narrowed = f16::from_f64(value);
            (narrowed.to_le_bytes().to_vec(), narrowed.is_infinite() && value.is_finite())
        }
    }
}

/// Reassemble packets (LSB first) back into full precision.
/// Returns `None` when the packet count does not match the encoding.
pub fn widen_temperature(bytes: &[u8], encoding: TemperatureEncoding) -> Option<f64> {
    match encoding {
        TemperatureEncoding::Single => {
            let raw: [u8; 4] = bytes.try_into().ok()?;
            Some(f32::from_le_bytes(raw) as f64)
        }
        TemperatureEncoding::Half => {
            let raw: [u8; 2] = bytes.try_into().ok()?;
            Some(f16::from_le_bytes(raw).to_f64())
        }
    }
}

/// Packet ids carry the index in two binary digits: `T2P00`, `T2P01`, `T2P10`, `T2P11`.
pub fn temperature_packets(sensor: &str, bytes: &[u8]) -> Vec<TemperaturePacket> {
    bytes
        .iter()
        .enumerate()
        .map(|(i, b)| TemperaturePacket {
            sensor:    sensor.to_string(),
            packet_id: format!("{sensor}P{i:02b}"),
            payload:   format!("0x{b:02x}"),
        })
        .collect()
}

/// Parse T2 packet payloads back into bytes, in packet order.
pub fn packet_bytes(packets: &[TemperaturePacket]) -> Option<Vec<u8>> {
    packets
        .iter()
        .map(|p| u8::from_str_radix(p.payload.trim_start_matches("0x"), 16).ok())
        .collect()
}

fn encode_temperature(
    at: NaiveDateTime,
    value: Sample<f64>,
    encoding: TemperatureEncoding,
) -> TemperatureRecord {
    let date = at.format("%Y-%m-%d").to_string();
    let time = at.format("%H:%M:%S%.3f").to_string();

    let Sample::Real(v) = value else {
        return TemperatureRecord { date, time, value, saturated: false, packets: vec![] };
    };

    let (bytes, saturated) = narrow_temperature(v, encoding);
    debug_assert_eq!(bytes.len(), encoding.packet_count());
    let mut packets = vec![TemperaturePacket {
        sensor:    "T1".into(),
        packet_id: "T1P00".into(),
        payload:   temperature_text(v),
    }];
    packets.extend(temperature_packets("T2", &bytes));

    TemperatureRecord { date, time, value, saturated, packets }
}

// ── Door / motion ────────────────────────────────────────────────────────────

impl LogicBand {
    pub fn of(voltage_mv: u16) -> Self {
        if voltage_mv <= UNDETECTED_MAX_MV {
            Self::Undetected
        } else if voltage_mv >= DETECTED_MIN_MV {
            Self::Detected
        } else {
            Self::Undefined
        }
    }
}

// ── Humidity / CO2 ───────────────────────────────────────────────────────────

/// Clamp to [0, 100] %. Returns the value and whether it was clamped.
pub fn clamp_humidity(value: f64) -> (f64, bool) {
    let clamped = value.clamp(HUMIDITY_MIN, HUMIDITY_MAX);
    (clamped, clamped != value)
}

/// Round and clamp to [0, 50 000] ppm.
pub fn clamp_co2(value: f64) -> (u32, bool) {
    let rounded = value.round();
    let clamped = rounded.clamp(0.0, CO2_MAX_PPM as f64);
    (clamped as u32, clamped != rounded)
}

pub fn humidity_field(value: Sample<f64>) -> String {
    match value {
        Sample::Real(v) => format!("{v:07.3}"),
        Sample::Missing => HUMIDITY_SENTINEL.to_string(),
    }
}

pub fn co2_field(value: Sample<u32>) -> String {
    match value {
        Sample::Real(v) => format!("{v:05}"),
        Sample::Missing => CO2_SENTINEL.to_string(),
    }
}

/// `YYYYMMMDDHHMMSS=AAA.aaa%BBBBBppm`, 32 characters.
pub fn humidity_co2_text(at: NaiveDateTime, humidity: Sample<f64>, co2: Sample<u32>) -> String {
    format!(
        "{}={}%{}ppm",
        at.format("%Y%b%d%H%M%S"),
        humidity_field(humidity),
        co2_field(co2)
    )
}

fn encode_humidity_co2(
    at: NaiveDateTime,
    humidity: Sample<f64>,
    co2_ppm: Sample<f64>,
) -> HumidityCo2Record {
    let (humidity, humidity_clamped) = match humidity {
        Sample::Real(v) => {
            let (v, clamped) = clamp_humidity(v);
            (Sample::Real(v), clamped)
        }
        Sample::Missing => (Sample::Missing, false),
    };
    let (co2_ppm, co2_clamped) = match co2_ppm {
        Sample::Real(v) => {
            let (v, clamped) = clamp_co2(v);
            (Sample::Real(v), clamped)
        }
        Sample::Missing => (Sample::Missing, false),
    };
    HumidityCo2Record {
        text: humidity_co2_text(at, humidity, co2_ppm),
        humidity,
        co2_ppm,
        humidity_clamped,
        co2_clamped,
    }
}

// ── Smoke ────────────────────────────────────────────────────────────────────

pub fn smoke_tag(reason: SmokeReason, format: SmokeTagFormat) -> &'static str {
    match (reason, format) {
        (SmokeReason::Smoke, SmokeTagFormat::Char)   => "S",
        (SmokeReason::Battery, SmokeTagFormat::Char) => "B",
        (SmokeReason::Smoke, SmokeTagFormat::Word)   => "SMOK",
        (SmokeReason::Battery, SmokeTagFormat::Word) => "BATT",
    }
}

/// year:u64 LE | month:u8 | day:u8 | hour:u8 | minute:u8 | tag (1 or 4 ASCII bytes)
pub fn smoke_bytes(year: u64, month: u8, day: u8, hour: u8, minute: u8, tag: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + tag.len());
    out.extend_from_slice(&year.to_le_bytes());
    out.extend_from_slice(&[month, day, hour, minute]);
    out.extend_from_slice(tag.as_bytes());
    out
}

fn encode_smoke(at: NaiveDateTime, reason: SmokeReason, format: SmokeTagFormat) -> SmokeRecord {
    let year = at.year().max(0) as u64;
    let (month, day) = (at.month() as u8, at.day() as u8);
    let (hour, minute) = (at.hour() as u8, at.minute() as u8);
    let tag = smoke_tag(reason, format);
    SmokeRecord {
        year,
        month,
        day,
        hour,
        minute,
        reason,
        tag: tag.to_string(),
        bytes: smoke_bytes(year, month, day, hour, minute, tag),
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

/// Translate one typed reading into its emitted event.
pub fn encode(reading: &SensorReading, settings: &EncoderSettings) -> EmittedEvent {
    let at = reading.timestamp;
    let payload = match &reading.kind {
        ReadingKind::Temperature { value } => {
            EventPayload::Temperature(encode_temperature(at, *value, settings.temperature))
        }
        ReadingKind::DoorMotion { sensor_id, style, voltage_mv, band, report } => {
            EventPayload::DoorMotion(DoorMotionRecord {
                stamp:      julian_stamp(at),
                sensor_id:  sensor_id.to_string(),
                style:      *style,
                voltage_mv: *voltage_mv,
                band:       *band,
                report:     *report,
            })
        }
        ReadingKind::HumidityCo2 { humidity, co2_ppm } => {
            EventPayload::HumidityCo2(encode_humidity_co2(at, *humidity, *co2_ppm))
        }
        ReadingKind::Smoke { reason } => {
            EventPayload::Smoke(encode_smoke(at, *reason, settings.smoke_tag))
        }
    };
    EmittedEvent {
        cycle: reading.cycle,
        timestamp: at,
        family: reading.kind.family(),
        payload,
    }
}
