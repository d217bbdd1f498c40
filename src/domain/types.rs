//! Shared configuration and report types.
//!
//! These are kept plain and serializable so they can be:
//!
//! - filled in from CLI flags and input decks
//! - exported to JSON next to the simulated data
//! - reloaded later for comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What a batch run does when an observable has no value for a drawn
/// parameter vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoObservablePolicy {
    /// Drop the draw and move on; the trial counts as skipped.
    #[default]
    Skip,
    /// Draw fresh parameters for the same trial, up to `max_redraws` times.
    Redraw,
    /// Stop the whole batch with the error.
    Abort,
}

/// Axis scaling for histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BinScale {
    Linear,
    /// Logarithmic bins (base set separately, default 10).
    Log,
}

/// Which fit form to apply to a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FitModelSpec {
    /// Nonresonant tunneling through a symmetric junction, on `g ∈ (0, 1)`.
    SymmetricNonresonant,
    /// Resonant tunneling through a symmetric junction, on `g ∈ (0, 1)`.
    SymmetricResonant,
    /// Resonant tunneling with unequal couplings to the two leads.
    AsymmetricResonant,
    /// Destructive interference, on `g > 0`.
    Interference,
}

impl FitModelSpec {
    pub fn display_name(&self) -> &'static str {
        match self {
            FitModelSpec::SymmetricNonresonant => "Symmetric Nonresonant",
            FitModelSpec::SymmetricResonant => "Symmetric Resonant",
            FitModelSpec::AsymmetricResonant => "Asymmetric Resonant",
            FitModelSpec::Interference => "Interference",
        }
    }
}

/// Resolved settings for one `simulate` run.
///
/// Deck values fill these in; explicit CLI flags win over the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateConfig {
    pub deck: PathBuf,
    pub trials: usize,
    pub seed: u64,
    pub output: Option<PathBuf>,
    pub histogram_output: Option<PathBuf>,
    pub policy: NoObservablePolicy,
    pub max_redraws: usize,
    /// Trials per parallel chunk; each chunk gets its own RNG stream.
    pub chunk_size: usize,
}

/// Resolved settings for one `fit` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRunConfig {
    pub input: PathBuf,
    pub model: FitModelSpec,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub export: Option<PathBuf>,
}

/// One named fitted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// Exported outcome of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub model: String,
    pub parameters: Vec<NamedValue>,
    /// Sum of squared residuals at the reported parameters.
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
    pub guesses_tried: usize,
    pub guesses_converged: usize,
    pub points: usize,
}
