//! Axis masks.
//!
//! Bins are equally wide in *masked* space `u = mask(x)`; the mask is
//! monotone, so bin edges map back through `unmask`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::BinScale;
use crate::histogram::HistogramError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum BinStyle {
    Linear,
    Log { base: f64 },
}

impl BinStyle {
    pub fn log(base: f64) -> Result<Self, HistogramError> {
        if !(base > 0.0) || base == 1.0 || !base.is_finite() {
            return Err(HistogramError::InvalidBase { base });
        }
        Ok(BinStyle::Log { base })
    }

    pub fn from_scale(scale: BinScale, base: f64) -> Result<Self, HistogramError> {
        match scale {
            BinScale::Linear => Ok(BinStyle::Linear),
            BinScale::Log => BinStyle::log(base),
        }
    }

    pub fn mask(&self, x: f64) -> f64 {
        match self {
            BinStyle::Linear => x,
            BinStyle::Log { base } => x.ln() / base.ln(),
        }
    }

    pub fn unmask(&self, u: f64) -> f64 {
        match self {
            BinStyle::Linear => u,
            BinStyle::Log { base } => base.powf(u),
        }
    }

    /// `d mask / dx`, converting a masked-space density back to `x`.
    pub fn dmask_dx(&self, x: f64) -> f64 {
        match self {
            BinStyle::Linear => 1.0,
            BinStyle::Log { base } => 1.0 / (x * base.ln()),
        }
    }
}

impl fmt::Display for BinStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinStyle::Linear => f.write_str("linear"),
            BinStyle::Log { base } => write!(f, "log (base {base})"),
        }
    }
}

/// Bin count and mask for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub nbins: usize,
    pub style: BinStyle,
}

impl BinSpec {
    pub fn new(nbins: usize, style: BinStyle) -> Self {
        Self { nbins, style }
    }

    pub fn linear(nbins: usize) -> Self {
        Self::new(nbins, BinStyle::Linear)
    }
}
