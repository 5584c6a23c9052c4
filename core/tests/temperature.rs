use homesim_core::{
    config::TemperatureEncoding,
    encoding::{packet_bytes, widen_temperature, TEMP_MAX_F, TEMP_MIN_F},
    engine::SimEngine,
    event::{EventPayload, TemperatureRecord},
    temperature_subsystem::TemperatureSubsystem,
    types::Sample,
    SimulationConfig,
};

fn temperature_records(engine: SimEngine) -> Vec<TemperatureRecord> {
    engine
        .filter_map(|e| match e.payload {
            EventPayload::Temperature(r) => Some(r),
            _ => None,
        })
        .collect()
}

fn t2_value(record: &TemperatureRecord, encoding: TemperatureEncoding) -> f64 {
    let t2: Vec<_> = record.packets.iter().filter(|p| p.sensor == "T2").cloned().collect();
    let bytes = packet_bytes(&t2).expect("hex payloads");
    widen_temperature(&bytes, encoding).expect("packet count")
}

/// Scenario: 500 ms cycles from 1995-02-01, no sun bias, baseline 72.0 °F.
/// At 13:46:08 T1 sits within the noise bound of the baseline and the
/// four LSW-first single-precision packets reassemble to T1's value.
#[test]
fn afternoon_reading_without_sun_bias() {
    let cfg = SimulationConfig {
        minor_cycle_ms: 500,
        sun_bias: 0.0,
        baseline_temp_f: 72.0,
        temp_noise_f: 0.1,
        temperature_encoding: TemperatureEncoding::Single,
        random_seed: Some(1995),
        ..SimulationConfig::default_test()
    };
    let target_cycle = (13 * 3600 + 46 * 60 + 8) * 2;

    let mut engine = SimEngine::build(&cfg).unwrap();
    engine.run_cycles(target_cycle - 1);
    let events = engine.tick();

    let record = events
        .iter()
        .find_map(|e| match &e.payload {
            EventPayload::Temperature(r) => Some(r),
            _ => None,
        })
        .expect("temperature every cycle");

    assert_eq!(record.date, "1995-02-01");
    assert_eq!(record.time, "13:46:08.000");

    let ids: Vec<&str> = record.packets.iter().map(|p| p.packet_id.as_str()).collect();
    assert_eq!(ids, ["T1P00", "T2P00", "T2P01", "T2P10", "T2P11"]);

    let t1: f64 = record.packets[0].payload.parse().unwrap();
    assert!((t1 - 72.0).abs() <= 0.1 + 5e-4, "T1={t1} outside noise bound");
    assert_eq!(record.packets[0].payload.split('.').nth(1).map(str::len), Some(3));

    let t2 = t2_value(record, TemperatureEncoding::Single);
    assert!((t2 - t1).abs() <= 5.1e-4, "T2={t2} does not round to T1={t1}");
}

#[test]
fn t1_values_stay_within_bounds() {
    // A huge sun bias pushes the model well past both limits.
    let cfg = SimulationConfig {
        minor_cycle_ms: 60_000,
        sun_bias: 500.0,
        random_seed: Some(3),
        ..SimulationConfig::default_test()
    };
    let records = temperature_records(SimEngine::build(&cfg).unwrap());
    assert_eq!(records.len(), 1_440);

    let mut saw_max = false;
    let mut saw_min = false;
    for r in &records {
        let v = r.value.real().expect("no failures configured");
        assert!((TEMP_MIN_F..=TEMP_MAX_F).contains(&v), "T1={v} out of range");
        saw_max |= v == TEMP_MAX_F;
        saw_min |= v == TEMP_MIN_F;
        assert!(!r.saturated);
    }
    assert!(saw_max && saw_min, "expected clamping at both ends");
}

#[test]
fn half_precision_mode_emits_two_packets() {
    let cfg = SimulationConfig {
        minor_cycle_ms: 60_000,
        temperature_encoding: TemperatureEncoding::Half,
        ..SimulationConfig::default_test()
    };
    for r in temperature_records(SimEngine::build(&cfg).unwrap()).iter().take(200) {
        let ids: Vec<&str> = r.packets.iter().map(|p| p.packet_id.as_str()).collect();
        assert_eq!(ids, ["T1P00", "T2P00", "T2P01"]);

        let v = r.value.real().unwrap();
        let widened = t2_value(r, TemperatureEncoding::Half);
        // binary16 spacing between 64 and 128 °F is 1/16.
        assert!((widened - v).abs() <= 1.0 / 32.0);
    }
}

#[test]
fn full_failure_rate_drops_every_reading() {
    let cfg = SimulationConfig {
        minor_cycle_ms: 60_000,
        sensor_failure_rate: 1.0,
        ..SimulationConfig::default_test()
    };
    let records = temperature_records(SimEngine::build(&cfg).unwrap());
    assert!(!records.is_empty());
    for r in records {
        assert_eq!(r.value, Sample::Missing);
        assert!(r.packets.is_empty());
    }
}

#[test]
fn dropout_rate_tracks_failure_rate() {
    let cfg = SimulationConfig {
        minor_cycle_ms: 1_000,
        sensor_failure_rate: 0.25,
        ..SimulationConfig::default_test()
    };
    let mut engine = SimEngine::build(&cfg).unwrap();
    engine.run_cycles(20_000);
    let temps = engine.subsystem::<TemperatureSubsystem>().unwrap();
    assert_eq!(temps.readings, 20_000);
    let rate = temps.dropouts as f64 / temps.readings as f64;
    assert!((rate - 0.25).abs() < 0.02, "dropout rate {rate}");
}

#[test]
fn sunny_side_runs_warmer_than_night() {
    let cfg = SimulationConfig {
        minor_cycle_ms: 60_000,
        sun_bias: 4.0,
        ..SimulationConfig::default_test()
    };
    let records = temperature_records(SimEngine::build(&cfg).unwrap());
    let mean = |hours: std::ops::Range<&str>| {
        let vals: Vec<f64> = records
            .iter()
            .filter(|r| hours.contains(&&r.time[..2]))
            .filter_map(|r| r.value.real())
            .collect();
        vals.iter().sum::<f64>() / vals.len() as f64
    };
    // Thermostat faces east by default: mornings are lit.
    let morning = mean("08".."11");
    let night = mean("00".."05");
    assert!(morning > night + 4.0, "morning {morning} vs night {night}");
}
