//! `junction-stats` library crate.
//!
//! Monte Carlo statistics of single-molecule junction conductance: models
//! are assembled from named parameter distributions (optionally as a
//! composite of submodels), observables are bound to them by capability,
//! and a simulator draws rows of observable values for binning and fitting.
//!
//! The binary (`jstat`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - new models and observables plug in without touching the front-end

pub mod app;
pub mod cli;
pub mod dist;
pub mod domain;
pub mod error;
pub mod fit;
pub mod histogram;
pub mod io;
pub mod logging;
pub mod math;
pub mod model;
pub mod report;
pub mod sim;
pub mod transport;
