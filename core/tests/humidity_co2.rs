use homesim_core::{
    encoding::{CO2_SENTINEL, HUMIDITY_SENTINEL},
    engine::SimEngine,
    event::{EventPayload, HumidityCo2Record},
    humidity_co2_subsystem::{HumidityCo2Subsystem, CO2_PERIOD, HUMIDITY_PERIOD},
    types::Sample,
    SimulationConfig,
};

fn records(cfg: &SimulationConfig) -> Vec<(u64, HumidityCo2Record)> {
    SimEngine::build(cfg)
        .unwrap()
        .filter_map(|e| match e.payload {
            EventPayload::HumidityCo2(r) => Some((e.cycle, r)),
            _ => None,
        })
        .collect()
}

fn humidity_slot(text: &str) -> &str {
    &text[16..23]
}

fn co2_slot(text: &str) -> &str {
    &text[24..29]
}

#[test]
fn one_record_per_cycle() {
    let recs = records(&SimulationConfig::default_test());
    assert_eq!(recs.len(), 86_400);
    assert!(recs.iter().zip(1..).all(|((cycle, _), expected)| *cycle == expected));

    let mut engine = SimEngine::build(&SimulationConfig::default_test()).unwrap();
    let first: Vec<_> = engine
        .run_cycles(300)
        .into_iter()
        .filter_map(|e| match e.payload {
            EventPayload::HumidityCo2(r) => Some(r.text),
            _ => None,
        })
        .collect();
    assert_eq!(first.len(), 300);
    assert_eq!(first[0], "1995Feb01000001=999.999%99999ppm");
    let real = first.iter().filter(|t| !t.ends_with("=999.999%99999ppm")).count();
    // Cycles 100, 150, 200 and 300.
    assert_eq!(real, 4);
}

#[test]
fn off_cadence_slots_always_carry_sentinels() {
    let recs = records(&SimulationConfig::default_test());
    for (cycle, r) in &recs {
        assert_eq!(r.text.len(), 32);
        if cycle % HUMIDITY_PERIOD != 0 {
            assert_eq!(r.humidity, Sample::Missing);
            assert_eq!(humidity_slot(&r.text), HUMIDITY_SENTINEL);
        } else {
            // No failures configured: a due reading is always real.
            assert!(r.humidity.real().is_some());
            assert_ne!(humidity_slot(&r.text), HUMIDITY_SENTINEL);
        }
        if cycle % CO2_PERIOD != 0 {
            assert_eq!(r.co2_ppm, Sample::Missing);
            assert_eq!(co2_slot(&r.text), CO2_SENTINEL);
        } else {
            assert!(r.co2_ppm.real().is_some());
            assert_ne!(co2_slot(&r.text), CO2_SENTINEL);
        }
    }
}

#[test]
fn failed_readings_become_sentinels_even_when_due() {
    let cfg = SimulationConfig { sensor_failure_rate: 1.0, ..SimulationConfig::default_test() };
    let recs = records(&cfg);
    assert_eq!(recs.len(), 86_400);
    for (_, r) in &recs {
        assert!(r.text.ends_with("=999.999%99999ppm"), "{}", r.text);
        assert!(!r.humidity_clamped && !r.co2_clamped);
    }
}

#[test]
fn real_values_stay_in_range() {
    let cfg = SimulationConfig {
        days_to_simulate: 30,
        minor_cycle_ms: 60_000,
        occupant_count: 6,
        ..SimulationConfig::default_test()
    };
    let recs = records(&cfg);
    assert!(!recs.is_empty());
    for (_, r) in &recs {
        if let Some(h) = r.humidity.real() {
            assert!((0.0..=100.0).contains(&h));
        }
        if let Some(c) = r.co2_ppm.real() {
            assert!(c <= 50_000);
            // 420 ppm outdoors plus at least 80 ppm per occupant, minus noise.
            assert!(c >= 420 + 6 * 80 - 25);
        }
    }
}

#[test]
fn concatenated_stream_has_no_delimiters() {
    let recs = records(&SimulationConfig::default_test());
    let stream: String = recs.iter().map(|(_, r)| r.text.as_str()).collect();
    assert_eq!(stream.len(), recs.len() * 32);
    assert!(stream.starts_with("1995Feb01000001=999.999%99999ppm1995Feb01000002="), "{}", &stream[..64]);
    assert_eq!(&stream[99 * 32..99 * 32 + 16], "1995Feb01000140=");
}

#[test]
fn counters_match_cadence() {
    let mut engine = SimEngine::build(&SimulationConfig::default_test()).unwrap();
    engine.run_cycles(3_000);
    let hub = engine.subsystem::<HumidityCo2Subsystem>().unwrap();
    assert_eq!(hub.humidity_updates, 30);
    assert_eq!(hub.co2_updates, 20);
    assert_eq!(hub.dropouts, 0);
}
