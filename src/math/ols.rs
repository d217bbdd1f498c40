//! Dense least squares solver.
//!
//! Every damped step of the histogram fitter solves a small, tall system
//!
//! ```text
//! minimize || A δ - r ||^2
//! ```
//!
//! where `A` stacks the scaled Jacobian over the damping rows.
//!
//! - SVD handles tall matrices directly (nalgebra's `QR::solve` is for square
//!   systems and panics otherwise).
//! - The parameter dimension is tiny (at most 3 columns for the shipped fit forms), so
//!   SVD cost is negligible next to the residual evaluations.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    // Progressively looser singular value cutoffs.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn solves_an_overdetermined_line() {
        // y = 2 + 3x on x = [0, 1, 2]
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let x = solve_least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn damping_rows_shrink_the_step() {
        // [1; sqrt(3)] δ = [4; 0] has the ridge solution 4 / (1 + 3).
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 3.0_f64.sqrt()]);
        let b = DVector::from_row_slice(&[4.0, 0.0]);

        let x = solve_least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
    }
}
