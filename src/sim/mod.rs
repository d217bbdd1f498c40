//! Sampling: one [`Simulator`] row per draw, and parallel batches of draws.

pub mod batch;
pub mod simulator;

pub use batch::*;
pub use simulator::*;
