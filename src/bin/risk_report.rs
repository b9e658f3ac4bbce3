//! Risk profile report: simulate every profile side by side and write a CSV
//!
//! Usage: cargo run --bin risk_report -- <initial> <monthly> <rate> <years> [runs] [seed]

use fincalc_engine::{Engine, EngineConfig, RiskProfile, SimulationInputs, SimulationResult};
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::time::Instant;

fn parse_arg<T: std::str::FromStr>(
    args: &[String],
    i: usize,
    default: Option<T>,
) -> anyhow::Result<T> {
    match args.get(i) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("argument {} ('{}') is not a valid number", i, raw)),
        None => default.ok_or_else(|| {
            anyhow::anyhow!("usage: risk_report <initial> <monthly> <rate> <years> [runs] [seed]")
        }),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let initial: f64 = parse_arg(&args, 1, None)?;
    let monthly: f64 = parse_arg(&args, 2, None)?;
    let rate: f64 = parse_arg(&args, 3, None)?;
    let years: u32 = parse_arg(&args, 4, None)?;
    let runs: u32 = parse_arg(&args, 5, Some(1000))?;
    let seed: u64 = parse_arg(&args, 6, Some(42))?;

    let engine = Engine::new(EngineConfig::default())?;
    let start = Instant::now();

    // Profiles run concurrently; each simulation is itself parallel over trials
    let results: Vec<SimulationResult> = RiskProfile::ALL
        .par_iter()
        .map(|&risk_profile| {
            let inputs = SimulationInputs {
                initial,
                monthly_contribution: monthly,
                base_rate_percent: rate,
                years,
                risk_profile,
                runs,
            };
            engine.simulate_seeded(&inputs, seed)
        })
        .collect::<Result<Vec<_>, _>>()?;

    println!("Simulated {} runs x {} profiles in {:?}", runs, results.len(), start.elapsed());
    println!();

    let percentiles = &engine.config().percentiles;
    print!("{:<14}", "Profile");
    for p in percentiles {
        print!(" {:>14}", format!("P{}", p));
    }
    println!(" {:>10}", "P(gain)");
    println!("{}", "-".repeat(14 + 15 * percentiles.len() + 11));

    for result in &results {
        print!("{:<14}", result.risk_profile);
        for outcome in &result.percentiles {
            print!(" {:>14.2}", outcome.value);
        }
        println!(" {:>9.1}%", result.probability_of_gain() * 100.0);
    }

    let csv_path = "risk_report.csv";
    let mut file = File::create(csv_path)?;
    writeln!(file, "profile,volatility,percentile,value")?;
    for result in &results {
        for outcome in &result.percentiles {
            writeln!(
                file,
                "{},{},{},{:.2}",
                result.risk_profile, result.volatility, outcome.percentile, outcome.value
            )?;
        }
    }
    println!("\nPercentiles written to: {}", csv_path);

    Ok(())
}
