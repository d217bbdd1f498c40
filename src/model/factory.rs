//! Incremental, validated model construction.

use std::sync::Arc;

use tracing::debug;

use crate::dist::{Distribution, DistributionTable};
use crate::error::ModelError;
use crate::model::{Composite, Model, ModelKind, ModelType, ObservableTable, Submodel};

/// Collects distributions (and, for composite kinds, submodels) until every
/// named parameter has a rule, then freezes into a [`Model`].
#[derive(Debug)]
pub struct ModelFactory {
    kind: &'static str,
    names: &'static [&'static str],
    model_type: ModelType,
    observables: &'static ObservableTable,
    distributions: Vec<Option<Arc<Distribution>>>,
    composite: Option<PendingComposite>,
}

#[derive(Debug)]
struct PendingComposite {
    submodel_type: ModelType,
    submodels: Vec<Submodel>,
}

impl ModelFactory {
    pub fn new<K: ModelKind>() -> Self {
        let names = K::parameter_names();
        Self {
            kind: K::NAME,
            names,
            model_type: K::model_type(),
            observables: K::observables(),
            distributions: vec![None; names.len()],
            composite: K::submodel_type().map(|submodel_type| PendingComposite {
                submodel_type,
                submodels: Vec::new(),
            }),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }

    /// The type submodels must present, if this factory builds a composite.
    pub fn submodel_type(&self) -> Option<ModelType> {
        self.composite.as_ref().map(|c| c.submodel_type)
    }

    /// Names still lacking a distribution, canonical order.
    pub fn remaining_names(&self) -> Vec<&'static str> {
        self.names
            .iter()
            .zip(&self.distributions)
            .filter(|(_, dist)| dist.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Assign the distribution for `name` (case-insensitive). Returns true if
    /// the name belongs to this model; a later assignment replaces an
    /// earlier one.
    pub fn set_distribution(&mut self, name: &str, dist: impl Into<Arc<Distribution>>) -> bool {
        let Some(slot) = self
            .names
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
        else {
            return false;
        };
        self.distributions[slot] = Some(dist.into());
        true
    }

    /// Apply every entry of `table` that names one of this model's
    /// parameters, returning the table names that were not used.
    pub fn set_distributions(&mut self, table: &DistributionTable) -> Vec<String> {
        let mut unused = Vec::new();
        for (name, dist) in table.iter() {
            if !self.set_distribution(name, dist.clone()) {
                unused.push(name.to_string());
            }
        }
        unused
    }

    /// Register a finished submodel. Its parameter block is appended after
    /// the blocks of previously added submodels.
    pub fn add_submodel(&mut self, submodel: Arc<Model>) -> Result<&mut Self, ModelError> {
        let own = self.names.len();
        let pending = self
            .composite
            .as_mut()
            .ok_or(ModelError::NotCompositeModel)?;

        if submodel.model_type() != pending.submodel_type {
            return Err(ModelError::IncompatibleSubmodel {
                expected: pending.submodel_type.name(),
                found: submodel.model_type().name(),
            });
        }

        let start = pending.submodels.last().map_or(own, |sub| sub.indices.end);
        let indices = start..start + submodel.num_parameters();
        debug!(
            composite = self.kind,
            submodel = submodel.kind_name(),
            ?indices,
            "registered submodel"
        );
        pending.submodels.push(Submodel {
            model: submodel,
            indices,
        });
        Ok(self)
    }

    /// Full parameter count of the model as configured so far.
    pub fn num_parameters(&self) -> usize {
        let own = self.names.len();
        self.composite
            .as_ref()
            .and_then(|c| c.submodels.last())
            .map_or(own, |sub| sub.indices.end)
    }

    /// Freeze the model.
    ///
    /// Fails on the first parameter (canonical order) without a
    /// distribution, or on a composite with no submodels.
    pub fn build(self) -> Result<Arc<Model>, ModelError> {
        let mut distributions = Vec::with_capacity(self.names.len());
        for (name, dist) in self.names.iter().zip(self.distributions) {
            match dist {
                Some(dist) => distributions.push(dist),
                None => {
                    return Err(ModelError::MissingDistribution {
                        name: name.to_string(),
                    });
                }
            }
        }

        let composite = match self.composite {
            Some(pending) if pending.submodels.is_empty() => return Err(ModelError::NoSubmodels),
            Some(pending) => Some(Composite {
                own: self.names.len(),
                submodel_type: pending.submodel_type,
                submodels: pending.submodels,
            }),
            None => None,
        };

        Ok(Arc::new(Model {
            kind: self.kind,
            names: self.names,
            model_type: self.model_type,
            observables: self.observables,
            distributions,
            composite,
        }))
    }
}
