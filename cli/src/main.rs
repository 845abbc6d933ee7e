//! sapling CLI - Command-line harness for the birth-death tree simulation
//!
//! `sapling trial` runs a single seeded trial; `sapling survey` runs many and
//! prints the return-time and peak-frontier histograms.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use sapling_engine::{run_trial, SlotProbabilities};
use sapling_survey::{run_survey, SurveyConfig, SurveyReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sapling", version, about = "Evolving binary tree birth-death simulator")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. `info`, `sapling_engine=trace`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Growth probability of slot 0.
    #[arg(long, default_value_t = 0.5)]
    p0: f64,
    /// Growth probability of slot 1.
    #[arg(long, default_value_t = 0.5)]
    p1: f64,
    /// Absorbing height bound.
    #[arg(long, default_value_t = 10)]
    height_bound: u32,
    /// Random seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one trial and print its outcome.
    Trial {
        #[command(flatten)]
        process: ProcessArgs,
    },
    /// Run many trials and print histograms.
    Survey {
        #[command(flatten)]
        process: ProcessArgs,
        /// Number of trials.
        #[arg(long, default_value_t = 1_000)]
        trials: u64,
        /// Give up on a trial after this many steps.
        #[arg(long)]
        step_ceiling: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Trial { process } => cmd_trial(&process)?,
        Commands::Survey {
            process,
            trials,
            step_ceiling,
        } => cmd_survey(&process, trials, step_ceiling)?,
    }

    Ok(())
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log level {default_level:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn probabilities(process: &ProcessArgs) -> Result<SlotProbabilities> {
    SlotProbabilities::new(process.p0, process.p1).context("invalid growth probabilities")
}

fn cmd_trial(process: &ProcessArgs) -> Result<()> {
    let probs = probabilities(process)?;
    let mut rng = SmallRng::seed_from_u64(process.seed);
    let result = run_trial(probs, process.height_bound, &mut rng).context("trial failed")?;

    println!("Outcome: {}", result.outcome);
    println!("  Steps: {}", result.steps);
    println!("  Peak frontier: {}", result.peak_frontier_size);
    Ok(())
}

fn cmd_survey(process: &ProcessArgs, trials: u64, step_ceiling: Option<u64>) -> Result<()> {
    let config = SurveyConfig::default()
        .with_probabilities(probabilities(process)?)
        .with_height_bound(process.height_bound)
        .with_trials(trials)
        .with_seed(process.seed)
        .with_step_ceiling(step_ceiling);
    let report = run_survey(&config).context("survey failed")?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &SurveyReport) {
    println!("Trials: {}", report.trials);
    println!(
        "  Returned: {} ({:.4})",
        report.returned(),
        report.return_fraction()
    );
    println!("  Absorbed: {}", report.absorbed);
    if report.truncated > 0 {
        println!("  Truncated: {}", report.truncated);
    }
    if let Some(mean) = report.mean_return_time() {
        println!("  Mean return time: {mean:.3}");
    }

    println!();
    println!("Return times:");
    for (steps, count) in &report.return_times {
        println!("  {steps:>6}  {count}");
    }

    println!();
    println!("Peak frontier sizes:");
    for (peak, count) in &report.peak_sizes {
        println!("  {peak:>6}  {count}");
    }
}
