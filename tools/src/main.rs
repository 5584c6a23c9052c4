//! sim-runner: headless runner for the home-monitoring telemetry simulator.
//!
//! Usage:
//!   sim-runner --name twoyears --start 2024-01-01 --days 730 --occup 3
//!   sim-runner --name hifail --days 70 --occup 5 --fail 0.15 --seed 12345
//!   sim-runner --config run.json --outdir ./output
//!   sim-runner --name twoyears --days 730 --estimate --mult 2.0

mod sink;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use homesim_core::{
    config::{SmokeTagFormat, TemperatureEncoding},
    door_motion_subsystem::DoorMotionSubsystem,
    engine::SimEngine,
    smoke_subsystem::SmokeSubsystem,
    temperature_subsystem::TemperatureSubsystem,
    SensorFamily, SimulationConfig,
};
use sink::{DataLimits, OutputSink};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let quiet = has_flag(&args, "--quiet");

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if quiet { "warn" } else { "info" }),
    )
    .init();

    let config = build_config(&args)?;
    let outdir = parse_str(&args, "--outdir").unwrap_or("./");

    if !quiet {
        println!("Home monitoring data generator — sim-runner");
        println!("  name:        {}", config.base_name);
        println!("  start:       {}", config.start_date);
        println!("  days:        {}", config.days_to_simulate);
        println!("  occupants:   {}", config.occupant_count);
        println!("  minor cycle: {} ms", config.minor_cycle_ms);
        println!("  sun bias:    {}", config.sun_bias);
        println!("  fail rate:   {}", config.sensor_failure_rate);
        println!();
    }

    if has_flag(&args, "--estimate") {
        let multiplier = parse_arg(&args, "--mult", 2.0f64);
        return estimate(&config, multiplier);
    }

    let mut engine = SimEngine::build(&config)?;
    let seed = engine.seed();

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let run_dir = PathBuf::from(outdir).join(format!("{}_{}", config.base_name, &tag[..12]));
    let mut sink = OutputSink::create(&run_dir, &config.base_name, DataLimits::default())?;

    let started = Instant::now();
    for event in engine.by_ref() {
        sink.route(&event)?;
    }
    let counts = sink.counts.clone();
    let files = sink.finish()?;

    print_summary(&engine, &counts, seed, started.elapsed().as_secs_f64());
    println!("  files:          {files} written to {}", run_dir.display());
    Ok(())
}

/// Start from `--config` (or defaults), then apply individual flags on top.
fn build_config(args: &[String]) -> Result<SimulationConfig> {
    let mut config = match parse_str(args, "--config") {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("Cannot load config {path}"))?,
        None => SimulationConfig::default(),
    };

    if let Some(name) = parse_str(args, "--name") {
        config.base_name = name.to_string();
    }
    if let Some(start) = parse_str(args, "--start") {
        config.start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .with_context(|| format!("Invalid --start {start}, expected YYYY-MM-DD"))?;
    }
    config.days_to_simulate = parse_arg(args, "--days", config.days_to_simulate);
    config.occupant_count = parse_arg(args, "--occup", config.occupant_count);
    config.minor_cycle_ms = parse_arg(args, "--cycle", config.minor_cycle_ms);
    config.sun_bias = parse_arg(args, "--bias", config.sun_bias);
    config.sensor_failure_rate = parse_arg(args, "--fail", config.sensor_failure_rate);
    if let Some(seed) = parse_str(args, "--seed") {
        config.random_seed = Some(seed.parse().with_context(|| format!("Invalid --seed {seed}"))?);
    }
    match parse_str(args, "--t2") {
        Some("half") => config.temperature_encoding = TemperatureEncoding::Half,
        Some("single") => config.temperature_encoding = TemperatureEncoding::Single,
        Some(other) => log::warn!("Unknown --t2 mode: {other}, keeping {:?}", config.temperature_encoding),
        None => {}
    }
    match parse_str(args, "--smoke-tag") {
        Some("char") => config.smoke_tag_format = SmokeTagFormat::Char,
        Some("word") => config.smoke_tag_format = SmokeTagFormat::Word,
        Some(other) => log::warn!("Unknown --smoke-tag format: {other}, keeping {:?}", config.smoke_tag_format),
        None => {}
    }
    Ok(config)
}

/// Time one simulated day and extrapolate to the full run.
fn estimate(config: &SimulationConfig, multiplier: f64) -> Result<()> {
    config.validate()?;
    let sample = SimulationConfig { days_to_simulate: 1, ..config.clone() };
    let engine = SimEngine::build(&sample)?;

    let started = Instant::now();
    let events = engine.count();
    let per_day = started.elapsed().as_secs_f64();

    let days = config.days_to_simulate as f64;
    let estimate = per_day * days * multiplier;
    println!("=== ESTIMATE ===");
    println!("  sample day:     {per_day:.2}s, {events} events");
    println!("  multiplier:     {multiplier}");
    println!("  estimated run:  {estimate:.0}s (~{:.1} h) for {days} days", estimate / 3600.0);
    println!("  est. events:    {:.0}", events as f64 * days);
    Ok(())
}

fn print_summary(
    engine: &SimEngine,
    counts: &std::collections::HashMap<SensorFamily, u64>,
    seed: u64,
    wall_secs: f64,
) {
    let count = |f: SensorFamily| counts.get(&f).copied().unwrap_or(0);

    println!("=== RUN SUMMARY ===");
    println!("  seed:           {seed}");
    println!("  cycles run:     {}", engine.clock.current_cycle);
    println!("  final time:     {}", engine.clock.now());
    println!("  wall time:      {wall_secs:.1}s");
    for family in [
        SensorFamily::Temperature,
        SensorFamily::DoorMotion,
        SensorFamily::HumidityCo2,
        SensorFamily::Smoke,
    ] {
        println!("  {:<14}  {}", format!("{}:", family.name()), count(family));
    }
    if let Some(t) = engine.subsystem::<TemperatureSubsystem>() {
        println!("  temp dropouts:  {} / {}", t.dropouts, t.readings);
    }
    if let Some(d) = engine.subsystem::<DoorMotionSubsystem>() {
        println!("  door/motion:    {} snapshots, {} edges", d.snapshots, d.edges);
    }
    println!(
        "  triggers:       {} door, {} motion",
        engine.occupancy.door_triggers, engine.occupancy.motion_triggers
    );
    if let Some(s) = engine.subsystem::<SmokeSubsystem>() {
        println!("  smoke alarms:   {} smoke, {} battery", s.smoke_events, s.battery_events);
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
