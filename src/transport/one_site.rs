//! Single-site (Breit–Wigner) transport.
//!
//! One resonant level at `epsilon` couples to the two electrodes. The bias
//! drops asymmetrically across the junction: `a` shifts the level by `a * v`
//! (`a = 0` is a symmetric drop).
//!
//! Standalone vectors: `[ef, v, epsilon, gamma, a]` (symmetric coupling) and
//! `[ef, v, epsilon, gammal, gammar, a]` (asymmetric coupling). The channel
//! kinds own only the tail and see the same layout once routed.

use std::sync::OnceLock;

use crate::model::{ModelKind, ModelType, ObservableTable};
use crate::transport::observables::{
    AppliedBias, Channel, DifferentialConductance, ElectricCurrent, INDEX_EF, INDEX_V,
    StaticConductance, ZeroBiasConductance, applied_bias,
};

/// Transmission through a level with equal coupling `gamma` to both leads.
pub fn symmetric_transmission(e: f64, v: f64, epsilon: f64, gamma: f64, a: f64) -> f64 {
    let detuning = e - epsilon - a * v;
    gamma * gamma / (detuning * detuning + gamma * gamma)
}

/// Transmission with lead couplings `gammal` and `gammar`.
pub fn asymmetric_transmission(
    e: f64,
    v: f64,
    epsilon: f64,
    gammal: f64,
    gammar: f64,
    a: f64,
) -> f64 {
    let detuning = e - epsilon - a * v;
    let width = gammal + gammar;
    4.0 * gammal * gammar / (4.0 * detuning * detuning + width * width)
}

struct Symmetric {
    ef: f64,
    v: f64,
    epsilon: f64,
    gamma: f64,
    a: f64,
}

impl Symmetric {
    fn new(params: &[f64]) -> Self {
        Self {
            ef: params[INDEX_EF],
            v: params[INDEX_V],
            epsilon: params[2],
            gamma: params[3],
            a: params[4],
        }
    }

    fn transmission(&self, e: f64) -> f64 {
        symmetric_transmission(e, self.v, self.epsilon, self.gamma, self.a)
    }

    /// `∫ T(e) de` over the bias window, in closed form.
    fn current(&self) -> f64 {
        let upper = (self.ef - self.epsilon + (0.5 - self.a) * self.v) / self.gamma;
        let lower = (self.ef - self.epsilon - (0.5 + self.a) * self.v) / self.gamma;
        self.gamma * (upper.atan() - lower.atan())
    }

    fn zero_bias(&self) -> f64 {
        symmetric_transmission(self.ef, 0.0, self.epsilon, self.gamma, self.a)
    }
}

struct Asymmetric {
    ef: f64,
    v: f64,
    epsilon: f64,
    gammal: f64,
    gammar: f64,
    a: f64,
}

impl Asymmetric {
    fn new(params: &[f64]) -> Self {
        Self {
            ef: params[INDEX_EF],
            v: params[INDEX_V],
            epsilon: params[2],
            gammal: params[3],
            gammar: params[4],
            a: params[5],
        }
    }

    fn transmission(&self, e: f64) -> f64 {
        asymmetric_transmission(e, self.v, self.epsilon, self.gammal, self.gammar, self.a)
    }

    fn current(&self) -> f64 {
        let width = self.gammal + self.gammar;
        let upper = 2.0 * (self.ef - self.epsilon + (0.5 - self.a) * self.v) / width;
        let lower = 2.0 * (self.ef - self.epsilon - (0.5 + self.a) * self.v) / width;
        2.0 * self.gammal * self.gammar / width * (upper.atan() - lower.atan())
    }

    fn zero_bias(&self) -> f64 {
        asymmetric_transmission(self.ef, 0.0, self.epsilon, self.gammal, self.gammar, self.a)
    }
}

fn symmetric_static(params: &[f64]) -> f64 {
    let p = Symmetric::new(params);
    if p.v == 0.0 { p.zero_bias() } else { p.current() / p.v }
}

fn symmetric_differential(params: &[f64]) -> f64 {
    let p = Symmetric::new(params);
    (0.5 - p.a) * p.transmission(p.ef + 0.5 * p.v) + (0.5 + p.a) * p.transmission(p.ef - 0.5 * p.v)
}

fn symmetric_zero_bias(params: &[f64]) -> f64 {
    Symmetric::new(params).zero_bias()
}

fn symmetric_current(params: &[f64]) -> f64 {
    Symmetric::new(params).current()
}

fn asymmetric_static(params: &[f64]) -> f64 {
    let p = Asymmetric::new(params);
    if p.v == 0.0 { p.zero_bias() } else { p.current() / p.v }
}

fn asymmetric_differential(params: &[f64]) -> f64 {
    let p = Asymmetric::new(params);
    (0.5 - p.a) * p.transmission(p.ef + 0.5 * p.v) + (0.5 + p.a) * p.transmission(p.ef - 0.5 * p.v)
}

fn asymmetric_zero_bias(params: &[f64]) -> f64 {
    Asymmetric::new(params).zero_bias()
}

fn asymmetric_current(params: &[f64]) -> f64 {
    Asymmetric::new(params).current()
}

fn symmetric_channel_table() -> ObservableTable {
    ObservableTable::new()
        .with_fn::<StaticConductance>(symmetric_static)
        .with_fn::<DifferentialConductance>(symmetric_differential)
        .with_fn::<ZeroBiasConductance>(symmetric_zero_bias)
        .with_fn::<ElectricCurrent>(symmetric_current)
}

fn asymmetric_channel_table() -> ObservableTable {
    ObservableTable::new()
        .with_fn::<StaticConductance>(asymmetric_static)
        .with_fn::<DifferentialConductance>(asymmetric_differential)
        .with_fn::<ZeroBiasConductance>(asymmetric_zero_bias)
        .with_fn::<ElectricCurrent>(asymmetric_current)
}

pub struct SymmetricOneSite;

impl ModelKind for SymmetricOneSite {
    const NAME: &'static str = "symmetriconesite";

    fn parameter_names() -> &'static [&'static str] {
        &["ef", "v", "epsilon", "gamma", "a"]
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(|| symmetric_channel_table().with_fn::<AppliedBias>(applied_bias))
    }
}

pub struct AsymmetricOneSite;

impl ModelKind for AsymmetricOneSite {
    const NAME: &'static str = "asymmetriconesite";

    fn parameter_names() -> &'static [&'static str] {
        &["ef", "v", "epsilon", "gammal", "gammar", "a"]
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(|| asymmetric_channel_table().with_fn::<AppliedBias>(applied_bias))
    }
}

pub struct SymmetricOneSiteChannel;

impl ModelKind for SymmetricOneSiteChannel {
    const NAME: &'static str = "symmetriconesitechannel";

    fn parameter_names() -> &'static [&'static str] {
        &["epsilon", "gamma", "a"]
    }

    fn model_type() -> ModelType {
        ModelType::of::<Channel>()
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(symmetric_channel_table)
    }
}

pub struct AsymmetricOneSiteChannel;

impl ModelKind for AsymmetricOneSiteChannel {
    const NAME: &'static str = "asymmetriconesitechannel";

    fn parameter_names() -> &'static [&'static str] {
        &["epsilon", "gammal", "gammar", "a"]
    }

    fn model_type() -> ModelType {
        ModelType::of::<Channel>()
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(asymmetric_channel_table)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Midpoint rule over `[lo, hi]`.
    fn integrate(f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> f64 {
        let n = 20_000;
        let h = (hi - lo) / n as f64;
        (0..n).map(|i| f(lo + (i as f64 + 0.5) * h)).sum::<f64>() * h
    }

    #[test]
    fn symmetric_static_at_zero_bias_on_resonance_is_one() {
        assert_relative_eq!(symmetric_static(&[0.0, 0.0, 0.0, 1.0, 0.0]), 1.0);
        assert_relative_eq!(symmetric_zero_bias(&[0.0, 0.0, 0.0, 1.0, 0.0]), 1.0);
        assert_relative_eq!(symmetric_current(&[0.0, 0.0, 0.0, 1.0, 0.0]), 0.0);
    }

    #[test]
    fn symmetric_current_matches_numerical_integral() {
        let params = [0.1, 0.8, -0.3, 0.25, 0.2];
        let p = Symmetric::new(&params);
        let numeric = integrate(|e| p.transmission(e), p.ef - 0.5 * p.v, p.ef + 0.5 * p.v);
        assert_relative_eq!(symmetric_current(&params), numeric, max_relative = 1e-6);
        assert_relative_eq!(symmetric_static(&params), numeric / p.v, max_relative = 1e-6);
    }

    #[test]
    fn symmetric_differential_is_derivative_of_current() {
        let params = [0.1, 0.8, -0.3, 0.25, 0.2];
        let h = 1e-6;
        let mut up = params;
        let mut down = params;
        up[INDEX_V] += h;
        down[INDEX_V] -= h;
        let numeric = (symmetric_current(&up) - symmetric_current(&down)) / (2.0 * h);
        assert_relative_eq!(symmetric_differential(&params), numeric, max_relative = 1e-6);
    }

    #[test]
    fn asymmetric_reduces_to_symmetric_for_equal_couplings() {
        let sym = [0.05, 0.4, 0.2, 0.3, -0.1];
        let asym = [0.05, 0.4, 0.2, 0.3, 0.3, -0.1];
        assert_relative_eq!(asymmetric_static(&asym), symmetric_static(&sym), max_relative = 1e-12);
        assert_relative_eq!(
            asymmetric_differential(&asym),
            symmetric_differential(&sym),
            max_relative = 1e-12
        );
        assert_relative_eq!(asymmetric_current(&asym), symmetric_current(&sym), max_relative = 1e-12);
        assert_relative_eq!(
            asymmetric_zero_bias(&asym),
            symmetric_zero_bias(&sym),
            max_relative = 1e-12
        );
    }

    #[test]
    fn asymmetric_current_matches_numerical_integral() {
        let params = [0.0, -0.6, 0.15, 0.05, 0.4, 0.1];
        let p = Asymmetric::new(&params);
        let numeric = integrate(|e| p.transmission(e), p.ef + 0.5 * p.v, p.ef - 0.5 * p.v);
        assert_relative_eq!(asymmetric_current(&params), -numeric, max_relative = 1e-6);
    }

    #[test]
    fn transmission_peaks_at_one_for_equal_couplings() {
        assert_relative_eq!(asymmetric_transmission(0.3, 0.0, 0.3, 0.2, 0.2, 0.0), 1.0);
        assert!(asymmetric_transmission(0.3, 0.0, 0.3, 0.1, 0.4, 0.0) < 1.0);
    }
}
