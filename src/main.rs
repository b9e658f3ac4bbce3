//! Financial projection engine CLI
//!
//! Runs one calculation and prints the result as JSON.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use fincalc_engine::balance::load_balances;
use fincalc_engine::growth::early_withdrawal_value;
use fincalc_engine::scenario::ComparisonRequest;
use fincalc_engine::{
    AllocationPolicy, CertificateTerms, Engine, EngineConfig, LoggingObserver, RatePolicy,
    RiskProfile, SimulationInputs,
};

#[derive(Parser, Debug)]
#[command(name = "fincalc")]
#[command(version)]
#[command(about = "Amortization, debt payoff, savings growth and risk projections")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to JSON engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Amortize a single balance
    Schedule {
        #[arg(long)]
        principal: f64,

        /// Annual percentage rate (after any intro period)
        #[arg(long)]
        apr: f64,

        /// Fixed monthly payment; derived from --term when omitted
        #[arg(long)]
        payment: Option<f64>,

        /// Number of months to pay off in
        #[arg(long)]
        term: Option<u32>,

        #[arg(long, requires = "intro_periods")]
        intro_apr: Option<f64>,

        #[arg(long, requires = "intro_apr")]
        intro_periods: Option<u32>,

        /// Date the balance starts accruing (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Split a monthly budget across balances loaded from CSV
    Allocate {
        /// CSV with id,principal,apr,minimum_payment[,elected_payment,intro_apr,intro_periods]
        #[arg(long)]
        balances: PathBuf,

        #[arg(long)]
        budget: f64,

        /// avalanche, snowball or blended; every policy when omitted
        #[arg(long)]
        policy: Option<AllocationPolicy>,
    },
    /// Project compound growth of savings
    Project {
        #[arg(long, default_value = "0")]
        initial: f64,

        #[arg(long, default_value = "0")]
        contribution: f64,

        /// Annual rate, percent
        #[arg(long)]
        rate: f64,

        #[arg(long)]
        years: u32,

        /// Annual inflation, percent
        #[arg(long, default_value = "0")]
        inflation: f64,
    },
    /// Monte Carlo simulation of savings growth
    Simulate {
        #[arg(long, default_value = "0")]
        initial: f64,

        #[arg(long, default_value = "0")]
        contribution: f64,

        #[arg(long)]
        rate: f64,

        #[arg(long)]
        years: u32,

        /// conservative, moderate or aggressive
        #[arg(long, default_value = "moderate")]
        profile: RiskProfile,

        #[arg(long, default_value = "1000")]
        runs: u32,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print only the percentile summary, not every trial
        #[arg(long)]
        summary: bool,
    },
    /// Rank offers described in a JSON request file
    Compare {
        #[arg(long)]
        request: PathBuf,
    },
    /// Project a certificate of deposit
    Certificate {
        #[arg(long)]
        deposit: f64,

        /// Annual percentage yield
        #[arg(long)]
        apy: f64,

        /// Term in months
        #[arg(long)]
        term: u32,

        /// Early withdrawal penalty in months of interest
        #[arg(long, default_value = "0")]
        penalty: u32,

        /// Also report the payout when closing after this many months
        #[arg(long)]
        withdraw_after: Option<u32>,
    },
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}

fn rate_policy(apr: f64, intro_apr: Option<f64>, intro_periods: Option<u32>) -> RatePolicy {
    match (intro_apr, intro_periods) {
        (Some(intro), Some(periods)) => RatePolicy::introductory(intro, periods, apr),
        _ => RatePolicy::fixed(apr),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config)?.with_observer(Arc::new(LoggingObserver));

    match args.command {
        Commands::Schedule {
            principal,
            apr,
            payment,
            term,
            intro_apr,
            intro_periods,
            start,
        } => {
            let rate = rate_policy(apr, intro_apr, intro_periods);
            let schedule = match (payment, term) {
                (Some(payment), _) => engine.schedule(principal, payment, &rate)?,
                (None, Some(term)) => engine.schedule_for_term(principal, &rate, term)?,
                (None, None) => bail!("either --payment or --term is required"),
            };

            if let Some(warning) = schedule.warning() {
                eprintln!("warning: {}", warning);
            }

            #[derive(Serialize)]
            struct Output<'a> {
                summary: fincalc_engine::amortization::ScheduleSummary,
                payoff_date: Option<NaiveDate>,
                entries: &'a [fincalc_engine::ScheduleEntry],
            }
            print_json(
                &Output {
                    summary: schedule.summary(),
                    payoff_date: start.and_then(|d| schedule.payoff_date(d)),
                    entries: &schedule.entries,
                },
                args.compact,
            )?;
        }

        Commands::Allocate {
            balances,
            budget,
            policy,
        } => {
            let balances = load_balances(&balances)
                .with_context(|| format!("loading balances from {}", balances.display()))?;
            log::info!("loaded {} balances", balances.len());

            let results = match policy {
                Some(policy) => vec![engine.allocate(&balances, budget, policy)?],
                None => engine.allocate_all(&balances, budget)?,
            };
            for result in &results {
                for (id, warning) in result.warnings() {
                    eprintln!("warning: {} ({}): {}", id, result.policy, warning);
                }
            }
            print_json(&results, args.compact)?;
        }

        Commands::Project {
            initial,
            contribution,
            rate,
            years,
            inflation,
        } => {
            let projection = engine.project(initial, contribution, rate, years, inflation)?;
            print_json(&projection, args.compact)?;
        }

        Commands::Simulate {
            initial,
            contribution,
            rate,
            years,
            profile,
            runs,
            seed,
            summary,
        } => {
            let inputs = SimulationInputs {
                initial,
                monthly_contribution: contribution,
                base_rate_percent: rate,
                years,
                risk_profile: profile,
                runs,
            };
            let mut result = engine.simulate_seeded(&inputs, seed)?;
            if summary {
                result.terminal_values.clear();
            }
            print_json(&result, args.compact)?;
        }

        Commands::Compare { request } => {
            let parsed = ComparisonRequest::from_json_path(&request)
                .with_context(|| format!("loading comparison from {}", request.display()))?;
            let ranked = engine.compare_offers(&parsed)?;
            print_json(&ranked, args.compact)?;
        }

        Commands::Certificate {
            deposit,
            apy,
            term,
            penalty,
            withdraw_after,
        } => {
            let terms = CertificateTerms::new(apy, term, penalty);
            let outcome = engine.certificate(deposit, &terms)?;

            #[derive(Serialize)]
            struct Output {
                #[serde(flatten)]
                outcome: fincalc_engine::growth::CertificateOutcome,
                early_withdrawal_value: Option<f64>,
            }
            let early = withdraw_after
                .map(|month| early_withdrawal_value(deposit, &terms, month))
                .transpose()?;
            print_json(
                &Output {
                    outcome,
                    early_withdrawal_value: early,
                },
                args.compact,
            )?;
        }
    }

    Ok(())
}
