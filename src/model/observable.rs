//! Observable tables and bound observable functions.
//!
//! A model kind registers, once, a table mapping each capability it provides
//! to a factory. Binding an observable runs the factory against the finished
//! model and yields an [`ObservableFn`]: a pure function from a parameter
//! vector to a value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::model::{Model, Observable, ObservableIndex};

/// A bound observable: parameter vector → value, or *no observable produced*.
pub type ObservableFn = Arc<dyn Fn(&[f64]) -> Result<f64, ModelError> + Send + Sync>;

/// Binds a capability to a finished model.
pub type ObservableFactory =
    Arc<dyn Fn(&Arc<Model>) -> Result<ObservableFn, ModelError> + Send + Sync>;

/// Per-kind registration table of compatible observables.
#[derive(Clone, Default)]
pub struct ObservableTable {
    entries: HashMap<ObservableIndex, ObservableFactory>,
}

impl ObservableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register capability `T` as a closed-form function of the parameters.
    ///
    /// Non-finite results are reported as *no observable produced*.
    pub fn with_fn<T: Observable>(self, f: fn(&[f64]) -> f64) -> Self {
        let func: ObservableFn = Arc::new(move |params: &[f64]| produced::<T>(f(params)));
        self.with_factory::<T, _>(move |_model: &Arc<Model>| Ok(func.clone()))
    }

    /// Register capability `T` with a factory that sees the finished model.
    pub fn with_factory<T, F>(mut self, factory: F) -> Self
    where
        T: Observable,
        F: Fn(&Arc<Model>) -> Result<ObservableFn, ModelError> + Send + Sync + 'static,
    {
        self.entries.insert(ObservableIndex::of::<T>(), Arc::new(factory));
        self
    }

    /// Register capability `T` for a composite model by combining the same
    /// capability of every submodel with `op`, folded left to right in
    /// submodel order.
    ///
    /// Each submodel is evaluated on its routed parameters (the composite's
    /// own parameters followed by the submodel's block).
    pub fn with_combined<T: Observable>(self, op: fn(f64, f64) -> f64) -> Self {
        self.with_factory::<T, _>(move |model: &Arc<Model>| {
            let composite = model.composite().ok_or(ModelError::NotCompositeModel)?;
            if composite.submodels().is_empty() {
                return Err(ModelError::NoSubmodels);
            }

            let own = composite.num_composite_parameters();
            let parts = composite
                .submodels()
                .iter()
                .map(|sub| {
                    let func = sub.model().observable_function(ObservableIndex::of::<T>())?;
                    Ok((sub.indices(), func))
                })
                .collect::<Result<Vec<_>, ModelError>>()?;

            let func: ObservableFn = Arc::new(move |params: &[f64]| {
                let mut routed = Vec::new();
                let mut total: Option<f64> = None;
                for (block, func) in &parts {
                    routed.clear();
                    routed.extend_from_slice(&params[..own]);
                    routed.extend_from_slice(&params[block.clone()]);
                    let value = func(&routed)?;
                    total = Some(match total {
                        None => value,
                        Some(acc) => op(acc, value),
                    });
                }
                produced::<T>(total.unwrap_or(f64::NAN))
            });
            Ok(func)
        })
    }

    pub fn get(&self, obs: &ObservableIndex) -> Option<&ObservableFactory> {
        self.entries.get(obs)
    }

    pub fn contains(&self, obs: &ObservableIndex) -> bool {
        self.entries.contains_key(obs)
    }

    /// Names of the registered capabilities, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().map(|k| k.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ObservableTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Wrap a computed value, mapping non-finite values to *no observable produced*.
pub fn produced<T: Observable>(value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NoObservableProduced { observable: T::NAME })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist::Distribution;
    use crate::model::factory::tests::{Pair, Sum};
    use crate::model::{ModelFactory, ModelKind};

    #[test]
    fn closed_form_entry_binds_to_any_model() {
        let table = ObservableTable::new().with_fn::<Sum>(|p| p[0] / p[1]);
        assert_eq!(table.names(), vec!["Sum"]);

        let mut f = ModelFactory::new::<Pair>();
        f.set_distribution("x", Distribution::constant(1.0));
        f.set_distribution("y", Distribution::constant(2.0));
        let model = f.build().unwrap();

        let bind = table.get(&ObservableIndex::of::<Sum>()).unwrap();
        let func = bind(&model).unwrap();
        assert_eq!(func(&[3.0, 2.0][..]).unwrap(), 1.5);
        assert_eq!(
            func(&[1.0, 0.0][..]).unwrap_err(),
            ModelError::NoObservableProduced { observable: "Sum" }
        );
        assert!(Pair::observables().contains(&ObservableIndex::of::<Sum>()));
    }
}
