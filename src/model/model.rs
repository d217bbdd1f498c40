//! The frozen model: leaf or composite.
//!
//! A [`Model`] owns one distribution per parameter it names, in canonical
//! order. A composite model additionally owns an ordered list of submodels;
//! its full parameter vector is
//!
//! ```text
//! [ own parameters | submodel 0 block | submodel 1 block | ... ]
//! ```
//!
//! with every block contiguous and the blocks partitioning the tail.

use std::ops::Range;
use std::sync::Arc;

use rand::Rng;

use crate::dist::Distribution;
use crate::error::ModelError;
use crate::model::{ModelType, ObservableFn, ObservableIndex, ObservableTable};

/// Static description of a model kind.
///
/// Kinds opt into the two optional behaviours by overriding defaults:
/// `model_type` makes the kind a *submodel kind* (usable under a composite
/// expecting that type), and `submodel_type` makes it a *composite kind*.
pub trait ModelKind: 'static {
    /// Registry name, lowercase.
    const NAME: &'static str;

    /// Parameter names in canonical order.
    fn parameter_names() -> &'static [&'static str];

    fn model_type() -> ModelType {
        ModelType::generic()
    }

    /// The type every submodel must present, if this kind is composite.
    fn submodel_type() -> Option<ModelType> {
        None
    }

    /// The kind's table of compatible observables, built once.
    fn observables() -> &'static ObservableTable;
}

/// Immutable, shareable model.
#[derive(Debug)]
pub struct Model {
    pub(super) kind: &'static str,
    pub(super) names: &'static [&'static str],
    pub(super) model_type: ModelType,
    pub(super) observables: &'static ObservableTable,
    pub(super) distributions: Vec<Arc<Distribution>>,
    pub(super) composite: Option<Composite>,
}

/// Composite-only state of a model.
#[derive(Debug)]
pub struct Composite {
    pub(super) own: usize,
    pub(super) submodel_type: ModelType,
    pub(super) submodels: Vec<Submodel>,
}

/// A registered submodel and the block of the composite's parameter vector
/// it owns.
#[derive(Debug, Clone)]
pub struct Submodel {
    pub(super) model: Arc<Model>,
    pub(super) indices: Range<usize>,
}

impl Submodel {
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn indices(&self) -> Range<usize> {
        self.indices.clone()
    }
}

impl Model {
    pub fn kind_name(&self) -> &'static str {
        self.kind
    }

    /// This model's own parameter names, canonical order.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn distributions(&self) -> &[Arc<Distribution>] {
        &self.distributions
    }

    /// Length of the full parameter vector, including every submodel block.
    pub fn num_parameters(&self) -> usize {
        match &self.composite {
            Some(c) => c.num_parameters(),
            None => self.names.len(),
        }
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn is_submodel(&self) -> bool {
        !self.model_type.is_generic()
    }

    pub fn composite(&self) -> Option<&Composite> {
        self.composite.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }

    /// Whether the kind registers `obs`.
    pub fn provides(&self, obs: ObservableIndex) -> bool {
        self.observables.contains(&obs)
    }

    pub fn observable_names(&self) -> Vec<&'static str> {
        self.observables.names()
    }

    /// Draw a full parameter vector: own parameters first, then each
    /// submodel's block in registration order.
    pub fn generate_parameters<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.num_parameters());
        for dist in &self.distributions {
            params.push(dist.sample(rng));
        }
        if let Some(composite) = &self.composite {
            for sub in &composite.submodels {
                debug_assert_eq!(params.len(), sub.indices.start);
                params.extend(sub.model.generate_parameters(rng));
            }
        }
        params
    }

    /// Bind `obs` to this model.
    pub fn observable_function(
        self: &Arc<Self>,
        obs: ObservableIndex,
    ) -> Result<ObservableFn, ModelError> {
        let factory = self
            .observables
            .get(&obs)
            .ok_or(ModelError::IncompatibleObservable {
                observable: obs.name(),
            })?;
        factory(self)
    }

    /// Split a full parameter vector into per-submodel routed vectors.
    pub fn route_submodel_parameters(
        &self,
        params: &[f64],
    ) -> Result<Vec<(Arc<Model>, Vec<f64>)>, ModelError> {
        let composite = self.composite().ok_or(ModelError::NotCompositeModel)?;
        Ok(composite.route_submodel_parameters(params))
    }
}

impl Composite {
    /// Number of parameters the composite itself owns.
    pub fn num_composite_parameters(&self) -> usize {
        self.own
    }

    pub fn num_parameters(&self) -> usize {
        self.submodels
            .last()
            .map_or(self.own, |sub| sub.indices.end)
    }

    pub fn submodel_type(&self) -> ModelType {
        self.submodel_type
    }

    pub fn submodels(&self) -> &[Submodel] {
        &self.submodels
    }

    /// Full-vector index blocks, one per submodel in registration order.
    pub fn submodel_indices(&self) -> Vec<Range<usize>> {
        self.submodels.iter().map(Submodel::indices).collect()
    }

    /// Each submodel paired with the vector it evaluates on: the
    /// composite's own parameters followed by the submodel's block.
    pub fn route_submodel_parameters(&self, params: &[f64]) -> Vec<(Arc<Model>, Vec<f64>)> {
        self.submodels
            .iter()
            .map(|sub| {
                let mut routed = Vec::with_capacity(self.own + sub.indices.len());
                routed.extend_from_slice(&params[..self.own]);
                routed.extend_from_slice(&params[sub.indices.clone()]);
                (sub.model.clone(), routed)
            })
            .collect()
    }
}
