//! Two-site transport.
//!
//! Two levels at `epsilon` coupled to each other by `beta`, one to each
//! electrode. The bias does not shift the levels, so the first two
//! observables only depend on the Fermi-window edges `ef ± v/2`.
//!
//! Standalone vectors: `[ef, v, epsilon, gamma, beta]` and
//! `[ef, v, epsilon, gammal, gammar, beta]`. The symmetric forms are the
//! asymmetric ones with `gammal = gammar = gamma`.

use std::sync::OnceLock;

use nalgebra::Complex;

use crate::model::{ModelKind, ModelType, ObservableTable};
use crate::transport::observables::{
    AppliedBias, Channel, DifferentialConductance, ElectricCurrent, INDEX_EF, INDEX_V,
    StaticConductance, ZeroBiasConductance, applied_bias,
};

pub fn transmission(e: f64, epsilon: f64, gammal: f64, gammar: f64, beta: f64) -> f64 {
    let detuning = e - epsilon;
    let width = gammal + gammar;
    let temp = 4.0 * detuning * detuning - 4.0 * beta * beta - gammal * gammar;
    16.0 * gammal * gammar * beta * beta
        / (temp * temp + 4.0 * width * width * detuning * detuning)
}

/// Antiderivative of [`transmission`] with respect to the energy.
///
/// The roots of the denominator are complex in general, so the partial
/// fraction form is evaluated in complex arithmetic and its real part kept.
/// When the two root pairs merge (`(gammal - gammar)^2 == 16 beta^2`) the
/// partial fractions are replaced by their limit.
pub fn transmission_integral(z: f64, epsilon: f64, gammal: f64, gammar: f64, beta: f64) -> f64 {
    let width = gammal + gammar;
    let prefactor = 128f64.sqrt() * gammal * gammar * beta * beta / width;
    if prefactor == 0.0 {
        return 0.0;
    }

    let bgg = Complex::new((gammal - gammar).powi(2) - 16.0 * beta * beta, 0.0).sqrt();
    let base = Complex::new(gammal * gammal + gammar * gammar - 8.0 * beta * beta, 0.0);
    let x = Complex::new(8f64.sqrt() * (z - epsilon), 0.0);

    let terms = if bgg.norm() * width <= MERGED_ROOTS * base.norm() {
        let d = base.sqrt();
        let d2 = d * d;
        (x / (d2 * (d2 + x * x)) + (x / d).atan() / (d2 * d)) * width
    } else {
        let d1 = (base - bgg * width).sqrt();
        let d2 = (base + bgg * width).sqrt();
        ((x / d1).atan() / d1 - (x / d2).atan() / d2) / bgg
    };
    prefactor * terms.re
}

/// Relative root separation below which the merged-root limit is used.
const MERGED_ROOTS: f64 = 1e-5;

/// Unpacked `[ef, v, epsilon, gammal, gammar, beta]`.
struct Levels {
    ef: f64,
    v: f64,
    epsilon: f64,
    gammal: f64,
    gammar: f64,
    beta: f64,
}

impl Levels {
    fn symmetric(params: &[f64]) -> Self {
        Self {
            ef: params[INDEX_EF],
            v: params[INDEX_V],
            epsilon: params[2],
            gammal: params[3],
            gammar: params[3],
            beta: params[4],
        }
    }

    fn asymmetric(params: &[f64]) -> Self {
        Self {
            ef: params[INDEX_EF],
            v: params[INDEX_V],
            epsilon: params[2],
            gammal: params[3],
            gammar: params[4],
            beta: params[5],
        }
    }

    fn transmission(&self, e: f64) -> f64 {
        transmission(e, self.epsilon, self.gammal, self.gammar, self.beta)
    }

    fn integral(&self, z: f64) -> f64 {
        transmission_integral(z, self.epsilon, self.gammal, self.gammar, self.beta)
    }

    fn current(&self) -> f64 {
        self.integral(self.ef + 0.5 * self.v) - self.integral(self.ef - 0.5 * self.v)
    }

    fn static_conductance(&self) -> f64 {
        if self.v == 0.0 {
            self.zero_bias()
        } else {
            self.current() / self.v
        }
    }

    fn differential(&self) -> f64 {
        0.5 * self.transmission(self.ef + 0.5 * self.v)
            + 0.5 * self.transmission(self.ef - 0.5 * self.v)
    }

    fn zero_bias(&self) -> f64 {
        self.transmission(self.ef)
    }
}

fn symmetric_table() -> ObservableTable {
    ObservableTable::new()
        .with_fn::<StaticConductance>(|p| Levels::symmetric(p).static_conductance())
        .with_fn::<DifferentialConductance>(|p| Levels::symmetric(p).differential())
        .with_fn::<ZeroBiasConductance>(|p| Levels::symmetric(p).zero_bias())
        .with_fn::<ElectricCurrent>(|p| Levels::symmetric(p).current())
}

fn asymmetric_table() -> ObservableTable {
    ObservableTable::new()
        .with_fn::<StaticConductance>(|p| Levels::asymmetric(p).static_conductance())
        .with_fn::<DifferentialConductance>(|p| Levels::asymmetric(p).differential())
        .with_fn::<ZeroBiasConductance>(|p| Levels::asymmetric(p).zero_bias())
        .with_fn::<ElectricCurrent>(|p| Levels::asymmetric(p).current())
}

pub struct SymmetricTwoSite;

impl ModelKind for SymmetricTwoSite {
    const NAME: &'static str = "symmetrictwosite";

    fn parameter_names() -> &'static [&'static str] {
        &["ef", "v", "epsilon", "gamma", "beta"]
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(|| symmetric_table().with_fn::<AppliedBias>(applied_bias))
    }
}

pub struct AsymmetricTwoSite;

impl ModelKind for AsymmetricTwoSite {
    const NAME: &'static str = "asymmetrictwosite";

    fn parameter_names() -> &'static [&'static str] {
        &["ef", "v", "epsilon", "gammal", "gammar", "beta"]
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(|| asymmetric_table().with_fn::<AppliedBias>(applied_bias))
    }
}

pub struct SymmetricTwoSiteChannel;

impl ModelKind for SymmetricTwoSiteChannel {
    const NAME: &'static str = "symmetrictwositechannel";

    fn parameter_names() -> &'static [&'static str] {
        &["epsilon", "gamma", "beta"]
    }

    fn model_type() -> ModelType {
        ModelType::of::<Channel>()
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(symmetric_table)
    }
}

pub struct AsymmetricTwoSiteChannel;

impl ModelKind for AsymmetricTwoSiteChannel {
    const NAME: &'static str = "asymmetrictwositechannel";

    fn parameter_names() -> &'static [&'static str] {
        &["epsilon", "gammal", "gammar", "beta"]
    }

    fn model_type() -> ModelType {
        ModelType::of::<Channel>()
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(asymmetric_table)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn integrate(f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> f64 {
        let n = 50_000;
        let h = (hi - lo) / n as f64;
        (0..n).map(|i| f(lo + (i as f64 + 0.5) * h)).sum::<f64>() * h
    }

    #[test]
    fn integral_matches_quadrature() {
        // Complex roots, equal couplings, and real roots respectively.
        for params in [
            [0.0, 0.5, 0.1, 0.2, 0.35, 0.3],
            [0.0, 0.5, 0.1, 0.25, 0.25, 0.3],
            [0.05, 1.2, -0.2, 1.0, 0.1, 0.05],
            // Merged roots: (gammal - gammar)^2 == 16 beta^2.
            [0.0, 0.5, 0.1, 0.5, 0.1, 0.1],
            [0.1, 0.6, -0.1, 0.9, 0.1, 0.2],
        ] {
            let levels = Levels::asymmetric(&params);
            let numeric = integrate(
                |e| levels.transmission(e),
                levels.ef - 0.5 * levels.v,
                levels.ef + 0.5 * levels.v,
            );
            assert_relative_eq!(levels.current(), numeric, max_relative = 1e-7);
        }
    }

    #[test]
    fn merged_roots_are_continuous() {
        let at = Levels::asymmetric(&[0.0, 0.5, 0.1, 0.5, 0.1, 0.1]);
        let near = Levels::asymmetric(&[0.0, 0.5, 0.1, 0.5, 0.1, 0.1 + 1e-6]);
        assert!(at.current().is_finite());
        assert_relative_eq!(at.current(), near.current(), max_relative = 1e-4);
        assert_relative_eq!(at.current(), 0.2083979014, max_relative = 1e-8);
    }

    #[test]
    fn uncoupled_levels_conduct_nothing() {
        let levels = Levels::symmetric(&[0.05, 1.0, 0.0, 0.3, 0.0]);
        assert_eq!(levels.current(), 0.0);
        assert_eq!(levels.static_conductance(), 0.0);
        assert_eq!(levels.differential(), 0.0);
    }

    #[test]
    fn symmetric_matches_asymmetric_with_equal_couplings() {
        let sym = Levels::symmetric(&[0.02, 0.3, 0.0, 0.4, 0.2]);
        let asym = Levels::asymmetric(&[0.02, 0.3, 0.0, 0.4, 0.4, 0.2]);
        assert_relative_eq!(sym.static_conductance(), asym.static_conductance());
        assert_relative_eq!(sym.differential(), asym.differential());
        assert_relative_eq!(sym.zero_bias(), asym.zero_bias());
    }

    #[test]
    fn symmetric_transmission_matches_closed_form() {
        let (e, eps, g, b): (f64, f64, f64, f64) = (0.3, 0.1, 0.2, 0.15);
        let d = e - eps;
        let expected = 16.0 * g * g * b * b
            / ((4.0 * d * d - 4.0 * b * b - g * g).powi(2) + 16.0 * g * g * d * d);
        assert_relative_eq!(transmission(e, eps, g, g, b), expected, max_relative = 1e-12);
    }

    #[test]
    fn static_conductance_at_zero_bias_is_transmission() {
        let levels = Levels::symmetric(&[0.1, 0.0, 0.0, 0.3, 0.2]);
        assert_relative_eq!(levels.static_conductance(), levels.transmission(0.1));
        assert_relative_eq!(levels.current(), 0.0);
    }
}
