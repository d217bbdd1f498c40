//! Many-trial runs over a [`Simulator`].
//!
//! Trials are split into fixed-size chunks. Each chunk draws from its own
//! `StdRng` keyed by the master seed and the chunk index, so a run is
//! reproducible for a given `(seed, chunk_size)` whatever the thread count.
//! Chunks run in parallel with `rayon` and their rows are concatenated in
//! chunk order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::NoObservablePolicy;
use crate::error::ModelError;
use crate::sim::Simulator;

/// RNG for one chunk: the seed and chunk index fill separate words of the
/// 256-bit key, so distinct `(seed, chunk)` pairs never share a stream.
fn chunk_rng(seed: u64, chunk: u64) -> StdRng {
    let mut key = <StdRng as SeedableRng>::Seed::default();
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..16].copy_from_slice(&chunk.to_le_bytes());
    StdRng::from_seed(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub trials: usize,
    pub seed: u64,
    pub policy: NoObservablePolicy,
    /// Extra draws allowed per trial under [`NoObservablePolicy::Redraw`].
    pub max_redraws: usize,
    pub chunk_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            trials: 1000,
            seed: 0,
            policy: NoObservablePolicy::Skip,
            max_redraws: 100,
            chunk_size: 1024,
        }
    }
}

/// Rows produced by a batch, plus counts of what the policy did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    pub rows: Vec<Vec<f64>>,
    pub skipped: usize,
    pub redraws: usize,
}

impl BatchOutput {
    fn append(&mut self, other: BatchOutput) {
        self.rows.extend(other.rows);
        self.skipped += other.skipped;
        self.redraws += other.redraws;
    }
}

/// Run `options.trials` trials in parallel chunks.
pub fn run_batch(sim: &Simulator, options: &BatchOptions) -> Result<BatchOutput, ModelError> {
    if sim.num_observables() == 0 {
        return Err(ModelError::NoObservables);
    }

    let chunk_size = options.chunk_size.max(1);
    let chunks = options.trials.div_ceil(chunk_size);
    info!(
        trials = options.trials,
        chunks,
        chunk_size,
        policy = ?options.policy,
        "starting batch"
    );

    let parts = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * chunk_size;
            let count = chunk_size.min(options.trials - start);
            let mut rng = chunk_rng(options.seed, chunk as u64);
            run_serial(sim, count, &mut rng, options.policy, options.max_redraws)
        })
        .collect::<Result<Vec<_>, ModelError>>()?;

    let mut output = BatchOutput::default();
    for part in parts {
        output.append(part);
    }

    if output.skipped > 0 {
        warn!(
            skipped = output.skipped,
            trials = options.trials,
            "trials produced no observable and were skipped"
        );
    }
    info!(rows = output.rows.len(), redraws = output.redraws, "batch finished");
    Ok(output)
}

/// Run `trials` trials on one RNG stream.
pub fn run_serial(
    sim: &Simulator,
    trials: usize,
    rng: &mut StdRng,
    policy: NoObservablePolicy,
    max_redraws: usize,
) -> Result<BatchOutput, ModelError> {
    let mut output = BatchOutput {
        rows: Vec::with_capacity(trials),
        ..BatchOutput::default()
    };

    for _ in 0..trials {
        let mut attempts = 0;
        loop {
            match sim.simulate(rng) {
                Ok(row) => {
                    output.rows.push(row);
                    break;
                }
                Err(err) if err.is_no_observable_produced() => match policy {
                    NoObservablePolicy::Skip => {
                        output.skipped += 1;
                        break;
                    }
                    NoObservablePolicy::Redraw if attempts < max_redraws => {
                        attempts += 1;
                        output.redraws += 1;
                    }
                    NoObservablePolicy::Redraw => {
                        debug!(attempts, "redraw limit reached");
                        return Err(err);
                    }
                    NoObservablePolicy::Abort => return Err(err),
                },
                Err(err) => return Err(err),
            }
        }
    }
    Ok(output)
}
