//! Probability distributions for model parameters.
//!
//! - [`Distribution`]: one immutable sampling rule (constant, uniform, normal, ...)
//! - [`DistributionTable`]: the named table a model factory draws from

pub mod distribution;
pub mod table;

pub use distribution::*;
pub use table::*;
