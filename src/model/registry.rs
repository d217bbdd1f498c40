//! Name-based lookups used by input front-ends.
//!
//! Both registries are plain values built at startup and passed to whoever
//! parses input; nothing here is global.

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::model::{ModelFactory, ModelKind, Observable, ObservableIndex};

pub type FactoryFn = fn() -> ModelFactory;

/// Case-insensitive model name → factory constructor.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, FactoryFn>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register kind `K` under its own name.
    pub fn register<K: ModelKind>(&mut self) -> &mut Self {
        self.entries
            .insert(K::NAME.to_lowercase(), ModelFactory::new::<K>);
        self
    }

    pub fn factory(&self, name: &str) -> Result<ModelFactory, ModelError> {
        self.entries
            .get(&name.to_lowercase())
            .map(|make| make())
            .ok_or_else(|| ModelError::UnknownModel {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

/// Case-insensitive observable name → capability identity.
#[derive(Debug, Clone, Default)]
pub struct ObservableRegistry {
    entries: BTreeMap<String, ObservableIndex>,
}

impl ObservableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its own name.
    pub fn register<T: Observable>(&mut self) -> &mut Self {
        self.alias::<T>(T::NAME)
    }

    /// Register `T` under an additional name.
    pub fn alias<T: Observable>(&mut self, name: &str) -> &mut Self {
        self.entries
            .insert(name.to_lowercase(), ObservableIndex::of::<T>());
        self
    }

    pub fn lookup(&self, name: &str) -> Result<ObservableIndex, ModelError> {
        self.entries
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| ModelError::UnknownObservable {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory::tests::{Pair, Stack, Sum};

    #[test]
    fn model_lookup_is_case_insensitive() {
        let mut registry = ModelRegistry::new();
        registry.register::<Pair>().register::<Stack>();

        assert_eq!(registry.names(), vec!["pair", "stack"]);
        let factory = registry.factory("PAIR").unwrap();
        assert_eq!(factory.kind_name(), "pair");
        assert!(registry.factory("stack").unwrap().is_composite());
    }

    #[test]
    fn unknown_model_lists_options() {
        let mut registry = ModelRegistry::new();
        registry.register::<Pair>();
        let err = registry.factory("triple").unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownModel {
                name: "triple".into(),
                available: "pair".into()
            }
        );
    }

    #[test]
    fn observable_aliases_share_identity() {
        let mut registry = ObservableRegistry::new();
        registry.register::<Sum>().alias::<Sum>("total");
        assert_eq!(registry.lookup("SUM").unwrap(), ObservableIndex::of::<Sum>());
        assert_eq!(registry.lookup("total").unwrap(), ObservableIndex::of::<Sum>());
        assert!(registry.lookup("product").is_err());
    }
}
