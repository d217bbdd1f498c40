//! Command-line parsing for the junction statistics simulator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! simulation and fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{BinScale, FitModelSpec, NoObservablePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "jstat",
    version,
    about = "Monte Carlo conductance statistics for single-molecule junctions"
)]
pub struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate observables from an input deck and optionally bin them.
    Simulate(SimulateArgs),
    /// Fit a 1D conductance histogram.
    Fit(FitArgs),
    /// List the registered models and observables.
    Models,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Input deck describing the model, distributions and observables.
    #[arg(long, value_name = "FILE")]
    pub deck: PathBuf,

    /// Number of trials (overrides the deck).
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Master random seed (overrides the deck and `JUNCTION_STATS_SEED`).
    #[arg(long)]
    pub seed: Option<u64>,

    /// What to do when an observable has no value for a draw.
    #[arg(long, value_enum, default_value_t = NoObservablePolicy::Skip)]
    pub policy: NoObservablePolicy,

    /// Extra draws per trial under `--policy redraw`.
    #[arg(long, default_value_t = 100)]
    pub max_redraws: usize,

    /// Trials per parallel chunk (each chunk has its own RNG stream).
    #[arg(long, default_value_t = 1024)]
    pub chunk_size: usize,

    /// Worker threads (default: one per core).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Write simulated rows here (overrides the deck).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Bin the rows and write the histogram here.
    #[arg(long, value_name = "FILE")]
    pub histogram: Option<PathBuf>,

    /// Bins per axis when the deck has no `bin` lines.
    #[arg(long, default_value_t = 100)]
    pub bins: usize,

    /// Bin style when the deck has no `bin` lines.
    #[arg(long, value_enum, default_value_t = BinScale::Log)]
    pub bin_style: BinScale,

    /// Logarithm base for `--bin-style log`.
    #[arg(long, default_value_t = 10.0)]
    pub log_base: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Histogram file (`x density` per line).
    #[arg(long, value_name = "FILE")]
    pub histogram: PathBuf,

    /// Fit form.
    #[arg(long, value_enum, default_value_t = FitModelSpec::SymmetricNonresonant)]
    pub model: FitModelSpec,

    /// Maximum Levenberg–Marquardt iterations per initial guess.
    #[arg(long, default_value_t = 500)]
    pub max_iters: usize,

    /// Relative convergence tolerance.
    #[arg(long, default_value_t = 1e-10)]
    pub tolerance: f64,

    /// Export the fit report to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}
