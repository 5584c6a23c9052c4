use chrono::NaiveDate;
use homesim_core::{
    config::{SimulationConfig, SmokeTagFormat, DEFAULT_SMOKE_HAZARD_PER_MS},
    environment::environment_at,
    engine::SimEngine,
    event::{EventPayload, ReadingKind, SmokeReason},
    occupancy::TriggerDraws,
    rng::{RngBank, SubsystemSlot},
    smoke_subsystem::SmokeSubsystem,
    subsystem::{CycleContext, SensorSubsystem},
};

/// Step a lone detector for `cycles` cycles and return (cycle, reason) pairs.
fn drive(minor_cycle_ms: u64, hazard: f64, seed: u64, cycles: u64) -> Vec<(u64, SmokeReason)> {
    let mut rng = RngBank::new(seed).for_subsystem(SubsystemSlot::Smoke);
    let mut detector = SmokeSubsystem::new(minor_cycle_ms, hazard, &mut rng);
    let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let triggers = TriggerDraws::default();
    let environment = environment_at(timestamp, 0.0);

    let mut out = Vec::new();
    for cycle in 1..=cycles {
        let ctx = CycleContext { cycle, timestamp, environment, triggers: &triggers };
        for reading in detector.update(&ctx, &mut rng) {
            if let ReadingKind::Smoke { reason } = reading.kind {
                out.push((cycle, reason));
            }
        }
    }
    out
}

fn battery_cycles(events: &[(u64, SmokeReason)]) -> Vec<u64> {
    events
        .iter()
        .filter(|(_, r)| *r == SmokeReason::Battery)
        .map(|(c, _)| *c)
        .collect()
}

#[test]
fn battery_alarms_are_spaced_by_interval_plus_jitter() {
    for m in [86_400_000u64, 3_600_000, 600_000] {
        let interval = 20_736_000_000 / m;
        let jitter = 2_592_000_000 / m;
        let events = drive(m, 0.0, m ^ 0xBA77, interval * 25);
        let cycles = battery_cycles(&events);
        assert!(cycles.len() >= 20, "m={m}: only {} alarms", cycles.len());

        assert!(cycles[0] >= interval - jitter && cycles[0] <= interval + jitter);
        let gaps: Vec<u64> = cycles.windows(2).map(|w| w[1] - w[0]).collect();
        for gap in &gaps {
            assert!(
                *gap >= interval - jitter && *gap <= interval + jitter,
                "m={m}: gap {gap} outside {interval}±{jitter}"
            );
        }
        assert!(gaps.iter().any(|g| *g != gaps[0]), "m={m}: jitter never varied");
    }
}

#[test]
fn battery_window_matches_formula() {
    let mut rng = RngBank::new(1).for_subsystem(SubsystemSlot::Smoke);
    let detector = SmokeSubsystem::new(60_000, DEFAULT_SMOKE_HAZARD_PER_MS, &mut rng);
    assert_eq!(detector.battery_window(), (345_600, 43_200));
    assert!((detector.smoke_probability() - 7.62e-6).abs() < 1e-15);
}

/// One-minute cycles over a 365.25-day year; expected count = cycles · m · hazard.
/// Averaged over many simulated years to keep the tolerance tight.
fn assert_annual_rate(hazard: f64, years: u64) {
    const M: u64 = 60_000;
    let cycles_per_year = (365.25 * 24.0 * 60.0) as u64;
    let expected_per_year = cycles_per_year as f64 * M as f64 * hazard;

    let total: usize = (0..years)
        .map(|seed| {
            drive(M, hazard, 1_000 + seed, cycles_per_year)
                .iter()
                .filter(|(_, r)| *r == SmokeReason::Smoke)
                .count()
        })
        .sum();

    let expected = expected_per_year * years as f64;
    let tolerance = 4.0 * expected.sqrt();
    assert!(
        (total as f64 - expected).abs() <= tolerance,
        "observed {total} smoke events, expected {expected:.1} ± {tolerance:.1}"
    );
}

#[test]
fn default_hazard_matches_formula_rate() {
    // 1.27e-10 per ms is ≈ 4.0 alarms per year.
    assert_annual_rate(DEFAULT_SMOKE_HAZARD_PER_MS, 40);
}

#[test]
fn calibrated_hazard_gives_ten_alarms_a_year() {
    let hazard = 10.0 / (365.25 * 86_400_000.0);
    assert_annual_rate(hazard, 20);
}

#[test]
fn engine_emits_tagged_smoke_records() {
    let cfg = SimulationConfig {
        days_to_simulate: 3,
        minor_cycle_ms: 60_000,
        smoke_hazard_per_ms: 1e-7,
        smoke_tag_format: SmokeTagFormat::Word,
        ..SimulationConfig::default_test()
    };
    let records: Vec<_> = SimEngine::build(&cfg)
        .unwrap()
        .filter_map(|e| match e.payload {
            EventPayload::Smoke(r) => Some(r),
            _ => None,
        })
        .collect();

    assert!(!records.is_empty());
    for r in &records {
        assert_eq!(r.reason, SmokeReason::Smoke);
        assert_eq!(r.tag, "SMOK");
        assert_eq!(r.bytes.len(), 16);
        assert_eq!(&r.bytes[..8], &1995u64.to_le_bytes());
        assert_eq!(r.month, 2);
        assert!((1..=3).contains(&r.day));
        assert!(r.hour < 24 && r.minute < 60);
    }
}
