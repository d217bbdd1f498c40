//! Ordered observable columns over one model.

use std::sync::Arc;

use rand::Rng;

use crate::error::ModelError;
use crate::model::{Model, ObservableFn, ObservableIndex};

/// Binds a full model to an ordered list of observables and produces one
/// row of values per draw.
pub struct Simulator {
    model: Arc<Model>,
    columns: Vec<(ObservableIndex, ObservableFn)>,
}

impl Simulator {
    /// Fails if `model` is a submodel kind.
    pub fn new(model: Arc<Model>) -> Result<Self, ModelError> {
        if model.is_submodel() {
            return Err(ModelError::FullModelRequired);
        }
        Ok(Self {
            model,
            columns: Vec::new(),
        })
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Bind `obs` to `column`: appends when `column` equals the current
    /// count, replaces when it is smaller.
    pub fn set_observable(&mut self, column: usize, obs: ObservableIndex) -> Result<(), ModelError> {
        let len = self.columns.len();
        if column > len {
            return Err(ModelError::ColumnOutOfRange { column, len });
        }
        let func = self.model.observable_function(obs)?;
        if column == len {
            self.columns.push((obs, func));
        } else {
            self.columns[column] = (obs, func);
        }
        Ok(())
    }

    /// Append `obs` as the next column.
    pub fn push_observable(&mut self, obs: ObservableIndex) -> Result<(), ModelError> {
        self.set_observable(self.columns.len(), obs)
    }

    pub fn num_observables(&self) -> usize {
        self.columns.len()
    }

    pub fn observable_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(obs, _)| obs.name()).collect()
    }

    /// Draw one parameter vector and evaluate every column on it.
    ///
    /// The first column with no value aborts the row.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>, ModelError> {
        if self.columns.is_empty() {
            return Err(ModelError::NoObservables);
        }
        let params = self.model.generate_parameters(rng);
        self.evaluate(&params)
    }

    /// Evaluate every column on a given parameter vector.
    pub fn evaluate(&self, params: &[f64]) -> Result<Vec<f64>, ModelError> {
        if self.columns.is_empty() {
            return Err(ModelError::NoObservables);
        }
        self.columns.iter().map(|(_, func)| func(params)).collect()
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("model", &self.model.kind_name())
            .field("columns", &self.observable_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::dist::Distribution;
    use crate::model::ModelFactory;
    use crate::model::factory::tests::{Pair, Stack, Sum, Unregistered, weight};

    fn pair(x: f64, y: f64) -> Arc<Model> {
        let mut f = ModelFactory::new::<Pair>();
        f.set_distribution("x", Distribution::constant(x));
        f.set_distribution("y", Distribution::constant(y));
        f.build().unwrap()
    }

    #[test]
    fn submodels_cannot_be_simulated() {
        assert_eq!(
            Simulator::new(weight(1.0)).unwrap_err(),
            ModelError::FullModelRequired
        );
    }

    #[test]
    fn simulate_without_observables_fails() {
        let sim = Simulator::new(pair(1.0, 2.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(sim.simulate(&mut rng).unwrap_err(), ModelError::NoObservables);
    }

    #[test]
    fn set_observable_appends_and_replaces() {
        let mut sim = Simulator::new(pair(1.0, 2.0)).unwrap();
        sim.set_observable(0, ObservableIndex::of::<Sum>()).unwrap();
        sim.set_observable(1, ObservableIndex::of::<Sum>()).unwrap();
        sim.set_observable(0, ObservableIndex::of::<Sum>()).unwrap();
        assert_eq!(sim.num_observables(), 2);

        assert_eq!(
            sim.set_observable(5, ObservableIndex::of::<Sum>()).unwrap_err(),
            ModelError::ColumnOutOfRange { column: 5, len: 2 }
        );

        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(sim.simulate(&mut rng).unwrap(), vec![3.0, 3.0]);
    }

    #[test]
    fn incompatible_observable_leaves_columns_untouched() {
        let mut sim = Simulator::new(pair(1.0, 2.0)).unwrap();
        let err = sim
            .set_observable(0, ObservableIndex::of::<Unregistered>())
            .unwrap_err();
        assert!(matches!(err, ModelError::IncompatibleObservable { .. }));
        assert_eq!(sim.num_observables(), 0);
    }

    #[test]
    fn composite_model_simulates() {
        let mut f = ModelFactory::new::<Stack>();
        f.set_distribution("offset", Distribution::uniform(1.0, 2.0).unwrap());
        f.add_submodel(weight(1.0)).unwrap();
        let mut sim = Simulator::new(f.build().unwrap()).unwrap();
        sim.push_observable(ObservableIndex::of::<Sum>()).unwrap();

        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let row = sim.simulate(&mut rng).unwrap();
            assert!((1.0..2.0).contains(&row[0]));
        }
    }
}
