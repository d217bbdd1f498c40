//! Transport observables and the channel model type.
//!
//! Every transport parameter vector starts with the Fermi energy and the
//! applied bias, whether the vector belongs to a standalone model or is the
//! routed vector of a junction channel.

use crate::model::{ModelTypeTag, Observable};

pub const INDEX_EF: usize = 0;
pub const INDEX_V: usize = 1;

/// The bias applied across the junction.
pub struct AppliedBias;

/// Current divided by bias, `I / V`.
pub struct StaticConductance;

/// `dI/dV` at the applied bias.
pub struct DifferentialConductance;

/// The `V → 0` conductance.
pub struct ZeroBiasConductance;

pub struct ElectricCurrent;

impl Observable for AppliedBias {
    const NAME: &'static str = "AppliedBias";
}

impl Observable for StaticConductance {
    const NAME: &'static str = "StaticConductance";
}

impl Observable for DifferentialConductance {
    const NAME: &'static str = "DifferentialConductance";
}

impl Observable for ZeroBiasConductance {
    const NAME: &'static str = "ZeroBiasConductance";
}

impl Observable for ElectricCurrent {
    const NAME: &'static str = "ElectricCurrent";
}

/// Model type of a single conduction channel inside a junction.
pub struct Channel;

impl ModelTypeTag for Channel {
    const NAME: &'static str = "Channel";
}

/// Every transport vector carries the bias at [`INDEX_V`].
pub fn applied_bias(params: &[f64]) -> f64 {
    params[INDEX_V]
}
