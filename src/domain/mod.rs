//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`SimulateConfig`, `FitRunConfig`)
//! - policy and scale enums shared by the CLI and decks
//! - exported reports (`FitReport`)

pub mod types;

pub use types::*;
