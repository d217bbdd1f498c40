//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - builds the model and observable registries
//! - resolves deck + flag settings into run configs
//! - runs the simulate / fit pipelines
//! - prints reports and writes outputs

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FitArgs, SimulateArgs};
use crate::domain::{FitRunConfig, SimulateConfig};
use crate::error::AppError;
use crate::histogram::{BinSpec, BinStyle};
use crate::io::Deck;

pub mod pipeline;

/// Seed used when neither the CLI, the deck nor the environment sets one.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of trials when neither the CLI nor the deck sets one.
pub const DEFAULT_TRIALS: usize = 1000;

/// Environment variable (optionally from `.env`) providing a default seed.
pub const SEED_ENV: &str = "JUNCTION_STATS_SEED";

/// Entry point for the `jstat` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.log_level);

    match cli.command {
        Command::Simulate(args) => handle_simulate(args),
        Command::Fit(args) => handle_fit(args),
        Command::Models => {
            let (models, observables) = crate::transport::registries();
            print!("{}", crate::report::format_model_listing(&models, &observables));
            Ok(())
        }
    }
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| AppError::new(2, format!("Failed to start worker threads: {e}")))?;
    }

    let deck = Deck::from_path(&args.deck)?;
    let config = simulate_config_from_args(&args, &deck, env_seed()?);
    let bins = resolve_bins(&args, &deck)?;
    info!(deck = %config.deck.display(), trials = config.trials, seed = config.seed, "simulate");

    let (models, observables) = crate::transport::registries();
    let run = pipeline::run_simulation(&config, &deck, &bins, &models, &observables)?;

    println!("{}", crate::report::format_simulation_summary(&run, &config));

    if let Some(path) = &config.output {
        crate::io::write_rows(path, &run.columns, &run.output.rows)?;
    }
    if let (Some(path), Some(hist)) = (&config.histogram_output, &run.histogram) {
        crate::io::write_histogram(path, hist)?;
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_fit_summary(&run.report));

    if let Some(path) = &config.export {
        crate::io::write_fit_json(path, &run.report)?;
    }
    Ok(())
}

/// Merge flags over deck values: flags win, then the deck, then defaults.
pub fn simulate_config_from_args(
    args: &SimulateArgs,
    deck: &Deck,
    env_seed: Option<u64>,
) -> SimulateConfig {
    SimulateConfig {
        deck: args.deck.clone(),
        trials: args.trials.or(deck.trials).unwrap_or(DEFAULT_TRIALS),
        seed: args.seed.or(deck.seed).or(env_seed).unwrap_or(DEFAULT_SEED),
        output: args.output.clone().or_else(|| deck.output.clone()),
        histogram_output: args.histogram.clone(),
        policy: args.policy,
        max_redraws: args.max_redraws,
        chunk_size: args.chunk_size,
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitRunConfig {
    FitRunConfig {
        input: args.histogram.clone(),
        model: args.model,
        max_iterations: args.max_iters,
        tolerance: args.tolerance,
        export: args.export.clone(),
    }
}

/// Deck `bin` lines if present, otherwise the flag style on every column.
fn resolve_bins(args: &SimulateArgs, deck: &Deck) -> Result<Vec<BinSpec>, AppError> {
    if !deck.bins.is_empty() {
        return Ok(deck.bins.clone());
    }
    let style = BinStyle::from_scale(args.bin_style, args.log_base)
        .map_err(|e| AppError::new(2, format!("Error: {e}")))?;
    Ok(vec![BinSpec::new(args.bins, style); deck.observables.len()])
}

fn env_seed() -> Result<Option<u64>, AppError> {
    dotenvy::dotenv().ok();
    match std::env::var(SEED_ENV) {
        Ok(value) => value.trim().parse::<u64>().map(Some).map_err(|_| {
            AppError::new(2, format!("{SEED_ENV} must be an unsigned integer, found \"{value}\"."))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::Cli;

    fn simulate_args(extra: &[&str]) -> SimulateArgs {
        let mut argv = vec!["jstat", "simulate", "--deck", "run.deck"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Simulate(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_override_deck_settings() {
        let deck = Deck::parse("trials 50\nseed 9\noutput deck.dat").unwrap();

        let config = simulate_config_from_args(&simulate_args(&[]), &deck, Some(1));
        assert_eq!(config.trials, 50);
        assert_eq!(config.seed, 9);
        assert_eq!(config.output, Some(PathBuf::from("deck.dat")));

        let args = simulate_args(&["-n", "7", "--seed", "3", "-o", "cli.dat"]);
        let config = simulate_config_from_args(&args, &deck, Some(1));
        assert_eq!(config.trials, 7);
        assert_eq!(config.seed, 3);
        assert_eq!(config.output, Some(PathBuf::from("cli.dat")));
    }

    #[test]
    fn environment_seed_is_the_last_resort() {
        let deck = Deck::parse("").unwrap();
        let config = simulate_config_from_args(&simulate_args(&[]), &deck, Some(11));
        assert_eq!(config.seed, 11);
        assert_eq!(config.trials, DEFAULT_TRIALS);

        let config = simulate_config_from_args(&simulate_args(&[]), &deck, None);
        assert_eq!(config.seed, DEFAULT_SEED);
    }

    #[test]
    fn bins_default_to_one_axis_per_observable() {
        let deck = Deck::parse("observable bias\nobservable static").unwrap();
        let bins = resolve_bins(&simulate_args(&["--bins", "30", "--bin-style", "linear"]), &deck)
            .unwrap();
        assert_eq!(bins, vec![BinSpec::linear(30); 2]);

        let deck = Deck::parse("bin 5 log 2\nobservable static").unwrap();
        let bins = resolve_bins(&simulate_args(&[]), &deck).unwrap();
        assert_eq!(bins, vec![BinSpec::new(5, BinStyle::Log { base: 2.0 })]);
    }
}
