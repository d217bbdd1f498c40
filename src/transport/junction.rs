//! Multi-channel junction.
//!
//! The junction owns the shared `[ef, v]` and holds one or more `Channel`
//! submodels conducting in parallel: conductances and currents add.

use std::sync::OnceLock;

use crate::model::{ModelKind, ModelType, ObservableTable};
use crate::transport::observables::{
    AppliedBias, Channel, DifferentialConductance, ElectricCurrent, StaticConductance,
    ZeroBiasConductance, applied_bias,
};

fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub struct TransportJunction;

impl ModelKind for TransportJunction {
    const NAME: &'static str = "transportjunction";

    fn parameter_names() -> &'static [&'static str] {
        &["ef", "v"]
    }

    fn submodel_type() -> Option<ModelType> {
        Some(ModelType::of::<Channel>())
    }

    fn observables() -> &'static ObservableTable {
        static TABLE: OnceLock<ObservableTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            ObservableTable::new()
                .with_fn::<AppliedBias>(applied_bias)
                .with_combined::<StaticConductance>(add)
                .with_combined::<DifferentialConductance>(add)
                .with_combined::<ZeroBiasConductance>(add)
                .with_combined::<ElectricCurrent>(add)
        })
    }
}
