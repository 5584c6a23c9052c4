use homesim_core::{
    clock::SimClock,
    engine::{run, SimEngine},
    event::SensorFamily,
    SimulationConfig,
};
use std::collections::HashSet;

#[test]
fn cycle_count_rounds_up() {
    assert_eq!(SimClock::cycles_for(1, 1_000), Some(86_400));
    assert_eq!(SimClock::cycles_for(1, 7_000), Some(12_343));
    assert_eq!(SimClock::cycles_for(2, 86_400_000), Some(2));
    assert_eq!(SimClock::cycles_for(300_000_000_000, 500), None);

    let cfg = SimulationConfig { minor_cycle_ms: 7_000, ..SimulationConfig::default_test() };
    let mut engine = SimEngine::build(&cfg).unwrap();
    engine.run_cycles(u64::MAX);
    assert_eq!(engine.clock.current_cycle, 12_343);
    assert!(engine.finished());
}

#[test]
fn events_are_ordered_by_timestamp() {
    let cfg = SimulationConfig { minor_cycle_ms: 2_000, occupant_count: 10, ..SimulationConfig::default_test() };
    let events: Vec<_> = run(&cfg).unwrap().collect();
    assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert!(events.windows(2).all(|w| w[0].cycle <= w[1].cycle));

    let families: HashSet<SensorFamily> = events.iter().map(|e| e.family).collect();
    assert!(families.contains(&SensorFamily::Temperature));
    assert!(families.contains(&SensorFamily::DoorMotion));
    assert!(families.contains(&SensorFamily::HumidityCo2));
}

#[test]
fn clock_elapsed_matches_cycle_count() {
    let cfg = SimulationConfig { minor_cycle_ms: 500, ..SimulationConfig::default_test() };
    let mut engine = SimEngine::build(&cfg).unwrap();
    engine.run_cycles(12_345);
    assert_eq!(engine.clock.elapsed_ms(), 12_345 * 500);
    assert_eq!(
        engine.clock.now(),
        cfg.start_date.and_hms_opt(1, 42, 52).unwrap() + chrono::Duration::milliseconds(500)
    );
}

#[test]
fn stream_is_lazy_and_can_be_abandoned() {
    let cfg = SimulationConfig { days_to_simulate: 365, ..SimulationConfig::default_test() };
    let mut engine = run(&cfg).unwrap();
    let first: Vec<_> = engine.by_ref().take(10).collect();
    assert_eq!(first.len(), 10);
    assert!(engine.clock.current_cycle <= 10, "pulled 10 events, ran {} cycles", engine.clock.current_cycle);
    drop(engine);
}

#[test]
fn empty_stream_after_end() {
    let cfg = SimulationConfig { minor_cycle_ms: 86_400_000, ..SimulationConfig::default_test() };
    let mut engine = SimEngine::build(&cfg).unwrap();
    let events: Vec<_> = engine.by_ref().collect();
    assert_eq!(engine.clock.current_cycle, 1);
    assert!(!events.is_empty());
    assert_eq!(engine.next(), None);
    assert!(engine.run_cycles(5).is_empty());
}
