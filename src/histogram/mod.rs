//! Histogram binning of simulated data.
//!
//! - `bin_style`: the per-axis mask (linear or logarithmic)
//! - `histogram`: sample accumulation and binning into densities

pub mod bin_style;
pub mod histogram;

pub use bin_style::*;
pub use histogram::*;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistogramError {
    #[error("Data has incorrect dimensionality: expected {expected}, found {found}.")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Incorrect number of binning styles: expected {expected}, found {found}.")]
    StyleCount { expected: usize, found: usize },

    #[error("There must be at least 1 bin in every dimension (dimension {dim}).")]
    ZeroBins { dim: usize },

    #[error("Unable to bin data with more than 1 bin in dimension {dim}: all values are equal.")]
    DegenerateRange { dim: usize },

    #[error("No data can be binned.")]
    NoData,

    #[error("Invalid logarithm base {base}; it must be positive and not 1.")]
    InvalidBase { base: f64 },
}
