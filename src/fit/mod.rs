//! Histogram fitting.
//!
//! Responsibilities:
//!
//! - define fit forms (`FitModel`) and ship the tunneling forms
//! - run damped least squares from each initial guess (parallel)
//! - select the best converged fit deterministically

pub mod fitter;
pub mod form;

pub use fitter::*;
pub use form::*;
