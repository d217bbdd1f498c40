//! Single-molecule transport models.
//!
//! - `observables`: transport capabilities and the `Channel` model type
//! - `one_site` / `two_site`: closed-form leaf models and their channel forms
//! - `junction`: composite of parallel channels

pub mod junction;
pub mod observables;
pub mod one_site;
pub mod two_site;

pub use junction::TransportJunction;
pub use observables::*;
pub use one_site::{
    AsymmetricOneSite, AsymmetricOneSiteChannel, SymmetricOneSite, SymmetricOneSiteChannel,
};
pub use two_site::{
    AsymmetricTwoSite, AsymmetricTwoSiteChannel, SymmetricTwoSite, SymmetricTwoSiteChannel,
};

use crate::model::{ModelRegistry, ObservableRegistry};

/// Register every transport model and channel.
pub fn load_models(registry: &mut ModelRegistry) {
    registry
        .register::<SymmetricOneSite>()
        .register::<AsymmetricOneSite>()
        .register::<SymmetricTwoSite>()
        .register::<AsymmetricTwoSite>()
        .register::<TransportJunction>()
        .register::<SymmetricOneSiteChannel>()
        .register::<AsymmetricOneSiteChannel>()
        .register::<SymmetricTwoSiteChannel>()
        .register::<AsymmetricTwoSiteChannel>();
}

/// Register every transport observable under its full and short names.
pub fn load_observables(registry: &mut ObservableRegistry) {
    registry
        .register::<AppliedBias>()
        .alias::<AppliedBias>("bias")
        .register::<StaticConductance>()
        .alias::<StaticConductance>("static")
        .register::<DifferentialConductance>()
        .alias::<DifferentialConductance>("differential")
        .register::<ZeroBiasConductance>()
        .alias::<ZeroBiasConductance>("zerobias")
        .register::<ElectricCurrent>()
        .alias::<ElectricCurrent>("current");
}

/// Registries preloaded with the transport models and observables.
pub fn registries() -> (ModelRegistry, ObservableRegistry) {
    let mut models = ModelRegistry::new();
    let mut observables = ObservableRegistry::new();
    load_models(&mut models);
    load_observables(&mut observables);
    (models, observables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObservableIndex;

    #[test]
    fn registries_cover_every_kind() {
        let (models, observables) = registries();
        assert_eq!(models.names().len(), 9);
        assert!(models.factory("TransportJunction").unwrap().is_composite());
        assert!(!models.factory("symmetriconesite").unwrap().is_composite());
        assert_eq!(
            observables.lookup("static").unwrap(),
            ObservableIndex::of::<StaticConductance>()
        );
        assert_eq!(
            observables.lookup("ElectricCurrent").unwrap(),
            ObservableIndex::of::<ElectricCurrent>()
        );
    }
}
