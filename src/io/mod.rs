//! Input/output helpers.
//!
//! - input deck parsing and model construction (`deck`)
//! - rows, histogram and fit-report files (`export`)

pub mod deck;
pub mod export;

pub use deck::*;
pub use export::*;
