//! Shared simulate / fit workflows.
//!
//! Keeping these in one place keeps `app` focused on argument resolution and
//! presentation:
//!
//! - simulate: deck -> model tree -> simulator -> parallel batch -> optional histogram
//! - fit: histogram file -> multi-start least squares -> report

use crate::domain::{FitReport, FitRunConfig, NamedValue, SimulateConfig};
use crate::error::AppError;
use crate::fit::{FitOptions, FitSelection, fit_form, fit_multistart};
use crate::histogram::{BinSpec, BinnedHistogram, Histogram, HistogramError};
use crate::io::Deck;
use crate::model::{ModelRegistry, ObservableRegistry};
use crate::sim::{BatchOptions, BatchOutput, run_batch};

/// All computed outputs of a single `simulate` run.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub model: &'static str,
    pub columns: Vec<&'static str>,
    pub output: BatchOutput,
    pub histogram: Option<BinnedHistogram>,
}

/// Build the deck's simulator, run the batch and bin if requested.
///
/// `bins` is used only when a histogram output is configured; it must hold
/// one entry per observable column, checked before any trial runs.
pub fn run_simulation(
    config: &SimulateConfig,
    deck: &Deck,
    bins: &[BinSpec],
    models: &ModelRegistry,
    observables: &ObservableRegistry,
) -> Result<SimulationRun, AppError> {
    let sim = deck.simulator(models, observables)?;
    if config.histogram_output.is_some() && bins.len() != sim.num_observables() {
        let err = HistogramError::StyleCount {
            expected: sim.num_observables(),
            found: bins.len(),
        };
        return Err(AppError::new(2, format!("Error: {err}")));
    }

    let options = BatchOptions {
        trials: config.trials,
        seed: config.seed,
        policy: config.policy,
        max_redraws: config.max_redraws,
        chunk_size: config.chunk_size,
    };
    let output = run_batch(&sim, &options)?;

    let histogram = match &config.histogram_output {
        Some(_) => Some(bin_rows(&output.rows, sim.num_observables(), bins)?),
        None => None,
    };

    Ok(SimulationRun {
        model: sim.model().kind_name(),
        columns: sim.observable_names(),
        output,
        histogram,
    })
}

pub fn bin_rows(rows: &[Vec<f64>], ndim: usize, bins: &[BinSpec]) -> Result<BinnedHistogram, AppError> {
    let histogram_err = |e: HistogramError| AppError::new(3, format!("Error: {e}"));
    let mut hist = Histogram::new(ndim);
    for row in rows {
        hist.add(row).map_err(histogram_err)?;
    }
    hist.bin(bins).map_err(histogram_err)
}

/// All computed outputs of a single `fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub selection: FitSelection,
    pub report: FitReport,
}

pub fn run_fit(config: &FitRunConfig) -> Result<FitRun, AppError> {
    let data = crate::io::read_histogram(&config.input)?;
    run_fit_on(config, &data)
}

/// Fit already-loaded `(x, density)` points.
pub fn run_fit_on(config: &FitRunConfig, data: &[(f64, f64)]) -> Result<FitRun, AppError> {
    let form = fit_form(config.model);
    let opts = FitOptions {
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
    };
    let selection = fit_multistart(form.as_ref(), data, &opts)?;

    let report = FitReport {
        model: config.model.display_name().to_string(),
        parameters: form
            .names()
            .iter()
            .zip(&selection.best.params)
            .map(|(name, value)| NamedValue {
                name: name.to_string(),
                value: *value,
            })
            .collect(),
        sse: selection.best.sse,
        iterations: selection.best.iterations,
        converged: selection.best.converged,
        guesses_tried: selection.guesses_tried,
        guesses_converged: selection.guesses_converged,
        points: data.iter().filter(|(x, _)| form.in_domain(*x)).count(),
    };

    Ok(FitRun { selection, report })
}
