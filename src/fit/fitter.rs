//! Levenberg–Marquardt fitting of a [`FitModel`] to `(x, y)` points.
//!
//! Each damped step solves the augmented least-squares problem
//!
//! ```text
//! minimize | [ J D⁻¹ ; sqrt(λ) I ] δ' + [ r ; 0 ] |²,   δ = D⁻¹ δ'
//! ```
//!
//! with `D = diag(|J_j|)` (Marquardt scaling), using the SVD solve in
//! `math::ols`. A step is accepted when it lowers the sum of squared
//! residuals; λ then shrinks tenfold, otherwise it grows tenfold.
//!
//! The multi-start driver runs every initial guess of the form in parallel
//! and keeps the lowest SSE, breaking ties by guess index.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::AppError;
use crate::fit::FitModel;
use crate::math::solve_least_squares;

const LAMBDA_START: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// Relative SSE improvement (or relative step size) that counts as converged.
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-10,
        }
    }
}

/// Result of one local fit.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Best local fit over all initial guesses.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FitOutcome,
    pub guess_index: usize,
    pub guesses_tried: usize,
    pub guesses_converged: usize,
}

/// Sum of squared residuals; `None` when any residual is not finite.
pub fn sum_squares(form: &dyn FitModel, data: &[(f64, f64)], params: &[f64]) -> Option<f64> {
    let mut sse = 0.0;
    for (x, y) in data {
        let r = form.residual(params, *x, *y);
        if !r.is_finite() {
            return None;
        }
        sse += r * r;
    }
    Some(sse)
}

/// Fit from one starting point. Returns `None` if the start itself has no
/// finite residuals.
pub fn levenberg_marquardt(
    form: &dyn FitModel,
    data: &[(f64, f64)],
    guess: &[f64],
    opts: &FitOptions,
) -> Option<FitOutcome> {
    let n = data.len();
    let k = guess.len();
    let mut params = guess.to_vec();
    let mut sse = sum_squares(form, data, &params)?;
    let mut lambda = LAMBDA_START;
    let mut row = vec![0.0; k];

    for iteration in 1..=opts.max_iterations {
        let mut jac = DMatrix::<f64>::zeros(n, k);
        let mut rhs = DVector::<f64>::zeros(n + k);
        for (i, (x, y)) in data.iter().enumerate() {
            form.jacobian(&params, *x, *y, &mut row);
            for (j, value) in row.iter().enumerate() {
                jac[(i, j)] = *value;
            }
            rhs[i] = -form.residual(&params, *x, *y);
        }

        let scale: Vec<f64> = (0..k)
            .map(|j| {
                let norm = jac.column(j).norm();
                if norm > 0.0 && norm.is_finite() { norm } else { 1.0 }
            })
            .collect();

        let mut augmented = DMatrix::<f64>::zeros(n + k, k);
        for j in 0..k {
            for i in 0..n {
                augmented[(i, j)] = jac[(i, j)] / scale[j];
            }
        }

        let mut accepted = None;
        while lambda <= LAMBDA_MAX {
            let damping = lambda.sqrt();
            for j in 0..k {
                augmented[(n + j, j)] = damping;
            }

            if let Some(scaled) = solve_least_squares(&augmented, &rhs) {
                let step: Vec<f64> = scaled.iter().zip(&scale).map(|(s, d)| s / d).collect();
                let trial: Vec<f64> = params.iter().zip(&step).map(|(p, s)| p + s).collect();
                if let Some(trial_sse) = sum_squares(form, data, &trial) {
                    if trial_sse < sse {
                        accepted = Some((trial, trial_sse, step));
                        break;
                    }
                }
            }
            lambda *= 10.0;
        }

        // No damping level improves the fit: a local minimum to working precision.
        let Some((trial, trial_sse, step)) = accepted else {
            form.post_process(&mut params);
            return Some(FitOutcome {
                params,
                sse,
                iterations: iteration,
                converged: true,
            });
        };

        let improvement = sse - trial_sse;
        let step_norm = step.iter().map(|s| s * s).sum::<f64>().sqrt();
        let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
        let converged = improvement <= opts.tolerance * sse.max(f64::MIN_POSITIVE)
            || step_norm <= opts.tolerance * (param_norm + opts.tolerance);

        params = trial;
        sse = trial_sse;
        lambda = (lambda / 10.0).max(LAMBDA_MIN);

        if converged {
            form.post_process(&mut params);
            return Some(FitOutcome {
                params,
                sse,
                iterations: iteration,
                converged: true,
            });
        }
    }

    form.post_process(&mut params);
    Some(FitOutcome {
        params,
        sse,
        iterations: opts.max_iterations,
        converged: false,
    })
}

/// Fit from every initial guess of `form` and keep the best.
///
/// Converged fits are preferred; if none converged, the best unconverged
/// fit is reported (flagged as such).
pub fn fit_multistart(
    form: &dyn FitModel,
    data: &[(f64, f64)],
    opts: &FitOptions,
) -> Result<FitSelection, AppError> {
    let guesses = form.initial_guesses();
    fit_from_guesses(form, data, &guesses, opts)
}

pub fn fit_from_guesses(
    form: &dyn FitModel,
    data: &[(f64, f64)],
    guesses: &[Vec<f64>],
    opts: &FitOptions,
) -> Result<FitSelection, AppError> {
    let points: Vec<(f64, f64)> = data
        .iter()
        .copied()
        .filter(|(x, y)| form.in_domain(*x) && y.is_finite())
        .collect();

    if points.len() < form.num_parameters() {
        return Err(AppError::new(
            4,
            format!(
                "Not enough data points to fit: {} usable, {} parameters.",
                points.len(),
                form.num_parameters()
            ),
        ));
    }
    if guesses.is_empty() {
        return Err(AppError::new(4, "No initial guesses to fit from."));
    }

    let outcomes: Vec<(usize, FitOutcome)> = guesses
        .par_iter()
        .enumerate()
        .filter_map(|(idx, guess)| {
            let outcome = levenberg_marquardt(form, &points, guess, opts)?;
            debug!(
                guess = idx,
                sse = outcome.sse,
                iterations = outcome.iterations,
                converged = outcome.converged,
                "local fit"
            );
            Some((idx, outcome))
        })
        .collect();

    let converged = outcomes.iter().filter(|(_, o)| o.converged).count();
    let pool: Vec<&(usize, FitOutcome)> = if converged > 0 {
        outcomes.iter().filter(|(_, o)| o.converged).collect()
    } else {
        outcomes.iter().collect()
    };

    // Deterministic selection: minimum SSE, ties broken by guess index.
    let Some(best) = pool.into_iter().min_by(|a, b| {
        a.1.sse
            .partial_cmp(&b.1.sse)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    }) else {
        return Err(AppError::new(
            4,
            "No initial guess produced finite residuals.",
        ));
    };

    info!(
        guess = best.0,
        sse = best.1.sse,
        converged = best.1.converged,
        tried = guesses.len(),
        "fit selected"
    );

    Ok(FitSelection {
        best: best.1.clone(),
        guess_index: best.0,
        guesses_tried: guesses.len(),
        guesses_converged: converged,
    })
}
