//! demand-runner: headless booking-request generation.
//!
//! Usage:
//!   demand-runner                               built-in SIN-BKK sample
//!   demand-runner --input demand.json --runs 3
//!   demand-runner --sample-crs --runs 5          built-in SIN/BKK/HKG markets
//!   demand-runner --seed 42 --json > requests.jsonl
//!   demand-runner --print-sample > demand.json

use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use trademgen_core::{
    demand_manager::DemandManager, event_queue::TimelineQueue, DemandConfig, DemandEvent,
};

#[derive(serde::Serialize)]
struct RunSummary {
    run: u64,
    streams: usize,
    expected: f64,
    actual: u64,
    generated: u64,
    delivered: u64,
    nudged: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let runs = parse_arg(&args, "--runs", 1u64);
    let json = args.iter().any(|a| a == "--json");
    let sample_crs = args.iter().any(|a| a == "--sample-crs");
    let input = args
        .windows(2)
        .find(|w| w[0] == "--input")
        .map(|w| w[1].as_str());

    if args.iter().any(|a| a == "--print-sample") {
        println!("{}", serde_json::to_string_pretty(&DemandConfig::sample())?);
        return Ok(());
    }

    let mut config = match input {
        Some(path) => DemandConfig::load(path).with_context(|| format!("loading {path}"))?,
        None if sample_crs => DemandConfig::sample_crs(),
        None => DemandConfig::sample(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);

    if !json {
        println!("trademgen demand-runner");
        println!("  seed:      {}", config.seed);
        println!("  runs:      {runs}");
        let builtin = if sample_crs { "(built-in three-market sample)" } else { "(built-in sample)" };
        println!("  input:     {}", input.unwrap_or(builtin));
        println!();
    }

    let mut manager = DemandManager::from_config(&config)?;
    let mut queue = TimelineQueue::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for run in 1..=runs {
        if run > 1 {
            manager.reset_all(&mut queue)?;
        }

        let mut write_error = None;
        let delivered = manager.play_all(&mut queue, |event: &DemandEvent| {
            if !json || write_error.is_some() {
                return;
            }
            let line = serde_json::to_string(&event.request).map_err(anyhow::Error::from);
            if let Err(e) = line.and_then(|l| writeln!(out, "{l}").map_err(anyhow::Error::from)) {
                write_error = Some(e);
            }
        })?;
        if let Some(e) = write_error {
            return Err(e.context("writing requests"));
        }

        let summary = RunSummary {
            run,
            streams: manager.len(),
            expected: manager.status().expected,
            actual: manager.status().actual,
            generated: manager.status().current,
            delivered,
            nudged: queue.nudged(),
        };
        if json {
            log::info!("run summary: {}", serde_json::to_string(&summary)?);
        } else {
            print_summary(&manager, &summary);
        }
    }

    out.flush()?;
    Ok(())
}

fn print_summary(manager: &DemandManager, summary: &RunSummary) {
    let status = manager.status();
    println!("=== RUN {} SUMMARY ===", summary.run);
    println!("  streams:        {}", summary.streams);
    println!("  expected:       {:.1}", summary.expected);
    println!("  actual (drawn): {}", summary.actual);
    println!("  generated:      {}", summary.generated);
    println!("  delivered:      {}", summary.delivered);
    println!("  nudged:         {}", summary.nudged);
    println!(
        "  progress:       {:.1}% of actual, {:.1}% of expected",
        status.actual_progress(),
        status.expected_progress()
    );

    println!();
    println!("=== STREAMS ===");
    for (key, stream_status) in manager.stream_statuses() {
        println!("  {key} | {stream_status}");
    }
    println!();
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
