//! Model composition and observable dispatch.
//!
//! - `identity`: capability and model-type identity tokens
//! - `observable`: per-kind observable tables and bound observable functions
//! - `model`: the frozen [`Model`] (leaf or composite) and the [`ModelKind`] trait
//! - `factory`: validated, incremental construction of models
//! - `registry`: name → factory and name → observable lookups for front-ends

pub mod factory;
pub mod identity;
pub mod model;
pub mod observable;
pub mod registry;

pub use factory::*;
pub use identity::*;
pub use model::*;
pub use observable::*;
pub use registry::*;
