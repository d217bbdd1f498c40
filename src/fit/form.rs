//! Fit forms: closed-form density models fitted to binned histograms.
//!
//! A form supplies residuals and their Jacobian for one data point; the
//! fitter stays generic over the form.

use crate::domain::FitModelSpec;

/// A nonlinear least-squares model `f(params; x)` compared against `y`.
pub trait FitModel: Send + Sync {
    fn names(&self) -> &'static [&'static str];

    /// `f(params; x) - y`.
    fn residual(&self, params: &[f64], x: f64, y: f64) -> f64;

    /// `d residual / d params`, one entry per parameter.
    fn jacobian(&self, params: &[f64], x: f64, y: f64, out: &mut [f64]);

    /// Starting points for the multi-start search.
    fn initial_guesses(&self) -> Vec<Vec<f64>>;

    /// Canonicalize an accepted fit (e.g. resolve sign symmetries).
    fn post_process(&self, _params: &mut [f64]) {}

    /// Points outside the form's domain are left out of the fit.
    fn in_domain(&self, _x: f64) -> bool {
        true
    }

    fn num_parameters(&self) -> usize {
        self.names().len()
    }
}

/// Resolve a CLI choice to its form.
pub fn fit_form(spec: FitModelSpec) -> Box<dyn FitModel> {
    match spec {
        FitModelSpec::SymmetricNonresonant => Box::new(SymmetricNonresonant),
        FitModelSpec::SymmetricResonant => Box::new(SymmetricResonant),
        FitModelSpec::AsymmetricResonant => Box::new(AsymmetricResonant),
        FitModelSpec::Interference => Box::new(Interference),
    }
}

/// Conductance density for nonresonant tunneling through a symmetric
/// junction, on `g ∈ (0, 1)`:
///
/// ```text
/// P(g) = norm / sqrt(g (1-g)^3) * exp(-(c sqrt(g) - d sqrt(1-g))^2 / (2 (1-g)))
/// ```
///
/// Parameters are `[c, d, norm]`. The density is invariant under
/// `(c, d) → (-c, -d)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricNonresonant;

const C: usize = 0;
const D: usize = 1;
const NORM: usize = 2;

impl SymmetricNonresonant {
    pub fn density(params: &[f64], g: f64) -> f64 {
        let (_, expcd) = Self::exponent(params, g);
        params[NORM] / (g * (1.0 - g).powi(3)).sqrt() * expcd
    }

    fn exponent(params: &[f64], g: f64) -> (f64, f64) {
        let cd = params[C] * g.sqrt() - params[D] * (1.0 - g).sqrt();
        (cd, (-0.5 * cd * cd / (1.0 - g)).exp())
    }
}

impl FitModel for SymmetricNonresonant {
    fn names(&self) -> &'static [&'static str] {
        &["c", "d", "norm"]
    }

    fn residual(&self, params: &[f64], x: f64, y: f64) -> f64 {
        Self::density(params, x) - y
    }

    fn jacobian(&self, params: &[f64], g: f64, _y: f64, out: &mut [f64]) {
        let (cd, expcd) = Self::exponent(params, g);
        let norm = params[NORM];
        let one_minus = 1.0 - g;
        out[C] = -norm * cd * expcd / (one_minus * one_minus * one_minus.sqrt());
        out[D] = norm * cd * expcd / (one_minus * one_minus * g.sqrt());
        out[NORM] = expcd / (one_minus * (g * one_minus).sqrt());
    }

    fn initial_guesses(&self) -> Vec<Vec<f64>> {
        const LIST_C: [f64; 6] = [50.0, 100.0, 200.0, 300.0, 400.0, 500.0];
        const LIST_D: [f64; 6] = [5.0, 10.0, 20.0, 30.0, 40.0, 50.0];
        LIST_C
            .iter()
            .flat_map(|c| LIST_D.iter().map(move |d| vec![*c, *d, 1.0]))
            .collect()
    }

    fn post_process(&self, params: &mut [f64]) {
        if params[C] < 0.0 && params[D] < 0.0 {
            params[C] = -params[C];
            params[D] = -params[D];
        }
    }

    fn in_domain(&self, x: f64) -> bool {
        x > 0.0 && x < 1.0
    }
}

/// Conductance density for resonant tunneling through a symmetric junction
/// whose level is normally distributed about the Fermi energy:
///
/// ```text
/// P(g) = norm / sqrt(g^3 (1-g)) * exp(-gamma^2 (1-g) / (2 g))
/// ```
///
/// Parameters are `[gamma, norm]`, with `gamma` the coupling in units of the
/// level's standard deviation. Only `gamma^2` enters, so fits report `|gamma|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricResonant;

impl SymmetricResonant {
    const GAMMA: usize = 0;
    const NORM: usize = 1;

    pub fn density(params: &[f64], g: f64) -> f64 {
        params[Self::NORM] * Self::shape(params[Self::GAMMA], g)
    }

    fn shape(gamma: f64, g: f64) -> f64 {
        (-0.5 * gamma * gamma * (1.0 - g) / g).exp() / (g * g * g * (1.0 - g)).sqrt()
    }
}

impl FitModel for SymmetricResonant {
    fn names(&self) -> &'static [&'static str] {
        &["gamma", "norm"]
    }

    fn residual(&self, params: &[f64], x: f64, y: f64) -> f64 {
        Self::density(params, x) - y
    }

    fn jacobian(&self, params: &[f64], g: f64, _y: f64, out: &mut [f64]) {
        let gamma = params[Self::GAMMA];
        let shape = Self::shape(gamma, g);
        out[Self::GAMMA] = -params[Self::NORM] * gamma * (1.0 - g) / g * shape;
        out[Self::NORM] = shape;
    }

    fn initial_guesses(&self) -> Vec<Vec<f64>> {
        [0.5, 1.0, 2.0, 5.0, 10.0, 20.0]
            .iter()
            .map(|gamma| vec![*gamma, 1.0])
            .collect()
    }

    fn post_process(&self, params: &mut [f64]) {
        params[Self::GAMMA] = params[Self::GAMMA].abs();
    }

    fn in_domain(&self, x: f64) -> bool {
        x > 0.0 && x < 1.0
    }
}

/// Conductance density for resonant tunneling through one level with unequal
/// couplings, the level again normally distributed about the Fermi energy.
///
/// With `u(g) = gammal gammar / g - (gammal + gammar)^2 / 4`,
///
/// ```text
/// P(g) = norm * exp(-u / 2) / (g^2 sqrt(u))   for u > 0
/// P(g) = 0                                    otherwise
/// ```
///
/// so the support ends at `4 gammal gammar / (gammal + gammar)^2`. Parameters
/// are `[gammal, gammar, norm]` in units of the level's standard deviation.
/// The density is unchanged by swapping the couplings or flipping both signs;
/// fits report `gammal >= gammar >= 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsymmetricResonant;

impl AsymmetricResonant {
    const GAMMA_L: usize = 0;
    const GAMMA_R: usize = 1;
    const NORM: usize = 2;

    pub fn density(params: &[f64], g: f64) -> f64 {
        let (u, _) = Self::detuning(params, g);
        if u <= 0.0 {
            return 0.0;
        }
        params[Self::NORM] * (-0.5 * u).exp() / (g * g * u.sqrt())
    }

    /// Largest conductance the couplings allow (1 when they are equal).
    pub fn max_conductance(params: &[f64]) -> f64 {
        let sum = params[Self::GAMMA_L] + params[Self::GAMMA_R];
        4.0 * params[Self::GAMMA_L] * params[Self::GAMMA_R] / (sum * sum)
    }

    /// `(u, (gammal + gammar) / 2)`; `u` is the squared level offset.
    fn detuning(params: &[f64], g: f64) -> (f64, f64) {
        let mean = 0.5 * (params[Self::GAMMA_L] + params[Self::GAMMA_R]);
        (params[Self::GAMMA_L] * params[Self::GAMMA_R] / g - mean * mean, mean)
    }
}

impl FitModel for AsymmetricResonant {
    fn names(&self) -> &'static [&'static str] {
        &["gammal", "gammar", "norm"]
    }

    fn residual(&self, params: &[f64], x: f64, y: f64) -> f64 {
        Self::density(params, x) - y
    }

    fn jacobian(&self, params: &[f64], g: f64, _y: f64, out: &mut [f64]) {
        let (u, mean) = Self::detuning(params, g);
        if u <= 0.0 {
            out.fill(0.0);
            return;
        }
        let shape = (-0.5 * u).exp() / (g * g * u.sqrt());
        let d_du = -0.5 * params[Self::NORM] * shape * (1.0 + 1.0 / u);
        out[Self::GAMMA_L] = d_du * (params[Self::GAMMA_R] / g - mean);
        out[Self::GAMMA_R] = d_du * (params[Self::GAMMA_L] / g - mean);
        out[Self::NORM] = shape;
    }

    fn initial_guesses(&self) -> Vec<Vec<f64>> {
        const LIST_L: [f64; 5] = [0.5, 1.0, 2.0, 5.0, 10.0];
        const LIST_R: [f64; 4] = [0.1, 0.2, 0.5, 1.0];
        LIST_L
            .iter()
            .flat_map(|l| LIST_R.iter().map(move |r| vec![*l, *r, 1.0]))
            .collect()
    }

    fn post_process(&self, params: &mut [f64]) {
        let l = params[Self::GAMMA_L].abs();
        let r = params[Self::GAMMA_R].abs();
        params[Self::GAMMA_L] = l.max(r);
        params[Self::GAMMA_R] = l.min(r);
    }

    fn in_domain(&self, x: f64) -> bool {
        x > 0.0 && x < 1.0
    }
}

/// Conductance density for transport dominated by destructive interference,
/// on `g > 0`:
///
/// ```text
/// P(g) = norm / sqrt(g) * exp(-f^2 g / 2)
/// ```
///
/// Parameters are `[f, norm]`; fits report `|f|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interference;

impl Interference {
    const F: usize = 0;
    const NORM: usize = 1;

    pub fn density(params: &[f64], g: f64) -> f64 {
        let f = params[Self::F];
        params[Self::NORM] * (-0.5 * f * f * g).exp() / g.sqrt()
    }
}

impl FitModel for Interference {
    fn names(&self) -> &'static [&'static str] {
        &["f", "norm"]
    }

    fn residual(&self, params: &[f64], x: f64, y: f64) -> f64 {
        Self::density(params, x) - y
    }

    fn jacobian(&self, params: &[f64], g: f64, _y: f64, out: &mut [f64]) {
        let f = params[Self::F];
        let expf = (-0.5 * f * f * g).exp();
        out[Self::F] = -params[Self::NORM] * f * g.sqrt() * expf;
        out[Self::NORM] = expf / g.sqrt();
    }

    fn initial_guesses(&self) -> Vec<Vec<f64>> {
        vec![vec![1.0, 1.0], vec![10.0, 1.0], vec![100.0, 1.0]]
    }

    fn post_process(&self, params: &mut [f64]) {
        params[Self::F] = params[Self::F].abs();
    }

    fn in_domain(&self, x: f64) -> bool {
        x > 0.0
    }
}
