//! Sampling rules for a single scalar parameter.
//!
//! Each variant wraps a `rand_distr` distribution together with the arguments
//! it was built from, so the rule can describe itself in diagnostics.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution as _, Gamma, LogNormal, Normal, Uniform};

use crate::error::ModelError;

/// An immutable rule producing one `f64` per draw.
#[derive(Debug, Clone)]
pub enum Distribution {
    /// Always returns `value`; used when a parameter should be fixed.
    Constant { value: f64 },
    /// Uniform on `[low, high)`.
    Uniform {
        low: f64,
        high: f64,
        dist: Uniform<f64>,
    },
    Normal {
        mean: f64,
        stdev: f64,
        dist: Normal<f64>,
    },
    /// Lognormal with `zeta` and `sigma` given in log space.
    Lognormal {
        zeta: f64,
        sigma: f64,
        dist: LogNormal<f64>,
    },
    Gamma {
        shape: f64,
        scale: f64,
        dist: Gamma<f64>,
    },
}

impl Distribution {
    pub fn constant(value: f64) -> Self {
        Distribution::Constant { value }
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self, ModelError> {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(invalid(
                "Uniform Distribution: The lower bound must be lower than the upper bound.",
            ));
        }
        if !(high - low).is_finite() {
            return Err(invalid(
                "Uniform Distribution: The range between the bounds is too large.",
            ));
        }
        Ok(Distribution::Uniform {
            low,
            high,
            dist: Uniform::new(low, high),
        })
    }

    pub fn normal(mean: f64, stdev: f64) -> Result<Self, ModelError> {
        if !(stdev > 0.0) {
            return Err(invalid(
                "Normal Distribution: The standard deviation must be positive.",
            ));
        }
        let dist = Normal::new(mean, stdev)
            .map_err(|e| invalid(format!("Normal Distribution: {e}")))?;
        Ok(Distribution::Normal { mean, stdev, dist })
    }

    pub fn lognormal(zeta: f64, sigma: f64) -> Result<Self, ModelError> {
        if !(sigma > 0.0) {
            return Err(invalid(
                "Lognormal Distribution: The standard deviation (sigma) must be positive.",
            ));
        }
        let dist = LogNormal::new(zeta, sigma)
            .map_err(|e| invalid(format!("Lognormal Distribution: {e}")))?;
        Ok(Distribution::Lognormal { zeta, sigma, dist })
    }

    pub fn gamma(shape: f64, scale: f64) -> Result<Self, ModelError> {
        if !(shape > 0.0 && scale > 0.0) {
            return Err(invalid(
                "Gamma Distribution: The shape and scale factors must be positive.",
            ));
        }
        let dist = Gamma::new(shape, scale)
            .map_err(|e| invalid(format!("Gamma Distribution: {e}")))?;
        Ok(Distribution::Gamma { shape, scale, dist })
    }

    /// Build a distribution from input-deck tokens.
    ///
    /// The first token names the kind (case-insensitive); the rest are its
    /// numeric arguments, e.g. `["uniform", "0.5", "1.5"]`.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self, ModelError> {
        let Some((kind, args)) = tokens.split_first() else {
            return Err(invalid("Empty distribution: expected a kind and its arguments."));
        };

        match kind.to_lowercase().as_str() {
            "constant" => {
                let [value] = parse_args::<1>(args, "constant value")?;
                Ok(Distribution::constant(value))
            }
            "uniform" => {
                let [low, high] = parse_args::<2>(args, "uniform lower upper")?;
                Distribution::uniform(low, high)
            }
            "normal" | "gaussian" => {
                let [mean, stdev] = parse_args::<2>(args, "normal mean standard-deviation")?;
                Distribution::normal(mean, stdev)
            }
            "lognormal" => {
                let [zeta, sigma] = parse_args::<2>(args, "lognormal zeta sigma")?;
                Distribution::lognormal(zeta, sigma)
            }
            "gamma" => {
                let [shape, scale] = parse_args::<2>(args, "gamma shape scale")?;
                Distribution::gamma(shape, scale)
            }
            other => Err(invalid(format!(
                "Unrecognized probability distribution \"{other}\". Options are: constant, uniform, normal, lognormal, gamma."
            ))),
        }
    }

    /// Draw one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Distribution::Constant { value } => *value,
            Distribution::Uniform { dist, .. } => dist.sample(rng),
            Distribution::Normal { dist, .. } => dist.sample(rng),
            Distribution::Lognormal { dist, .. } => dist.sample(rng),
            Distribution::Gamma { dist, .. } => dist.sample(rng),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Constant { value } => write!(f, "Constant: value = {value}"),
            Distribution::Uniform { low, high, .. } => {
                write!(f, "Uniform: lower = {low}, upper = {high}")
            }
            Distribution::Normal { mean, stdev, .. } => {
                write!(f, "Normal: mean = {mean}, stdev = {stdev}")
            }
            Distribution::Lognormal { zeta, sigma, .. } => {
                write!(f, "Lognormal: zeta = {zeta}, sigma = {sigma} (log space)")
            }
            Distribution::Gamma { shape, scale, .. } => {
                write!(f, "Gamma: shape = {shape}, scale = {scale}")
            }
        }
    }
}

fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::InvalidDistribution {
        message: message.into(),
    }
}

fn parse_args<const N: usize>(args: &[&str], usage: &str) -> Result<[f64; N], ModelError> {
    if args.len() != N {
        return Err(invalid(format!("Expected \"{usage}\".")));
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = token
            .parse::<f64>()
            .map_err(|_| invalid(format!("Unable to parse \"{token}\" as a number (use \"{usage}\").")))?;
    }
    Ok(out)
}
