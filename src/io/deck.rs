//! Simulation input decks.
//!
//! A deck is a line-oriented text file; commands are case-insensitive and
//! `#` starts a comment:
//!
//! ```text
//! trials 10000
//! seed 7
//! output conductance.dat
//! bin 100 log 10
//!
//! model transportjunction
//!     distribution ef constant 0
//!     distribution v uniform 0.5 1.5
//!     model symmetriconesitechannel
//!         distribution epsilon normal -3 0.5
//!         distribution gamma lognormal -2 0.3
//!         distribution a constant 0
//!     endmodel
//! endmodel
//!
//! observable appliedbias
//! observable staticconductance
//! ```
//!
//! Nested `model` blocks are submodels of the enclosing block.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::dist::{Distribution, DistributionTable};
use crate::domain::BinScale;
use crate::error::AppError;
use crate::histogram::{BinSpec, BinStyle};
use crate::model::{Model, ModelRegistry, ObservableRegistry};
use crate::sim::Simulator;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct DeckError {
    pub line: usize,
    pub message: String,
}

impl DeckError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl From<DeckError> for AppError {
    fn from(err: DeckError) -> Self {
        AppError::new(2, format!("Error in input deck, {err}"))
    }
}

/// One `model ... endmodel` block.
#[derive(Debug, Clone, Default)]
pub struct ModelBlock {
    pub name: String,
    pub line: usize,
    pub distributions: DistributionTable,
    pub submodels: Vec<ModelBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableEntry {
    pub name: String,
    pub line: usize,
}

/// A parsed deck.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub model: Option<ModelBlock>,
    pub observables: Vec<ObservableEntry>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    /// One entry per histogram axis, in `bin` order.
    pub bins: Vec<BinSpec>,
}

impl Deck {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new(2, format!("Failed to read input deck '{}': {e}", path.display()))
        })?;
        Ok(Self::parse(&text)?)
    }

    pub fn parse(text: &str) -> Result<Self, DeckError> {
        let mut deck = Deck::default();
        let mut open: Vec<ModelBlock> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.split('#').next().unwrap_or("");
            let tokens: Vec<&str> = content.split_whitespace().collect();
            let Some((command, args)) = tokens.split_first() else {
                continue;
            };

            match command.to_lowercase().as_str() {
                "model" => {
                    let [name] = args else {
                        return Err(DeckError::new(line, "Expected \"model <name>\"."));
                    };
                    if open.is_empty() && deck.model.is_some() {
                        return Err(DeckError::new(line, "Only one top-level model may be specified."));
                    }
                    open.push(ModelBlock {
                        name: name.to_lowercase(),
                        line,
                        ..ModelBlock::default()
                    });
                }
                "endmodel" => {
                    let Some(block) = open.pop() else {
                        return Err(DeckError::new(line, "\"endmodel\" without a matching \"model\"."));
                    };
                    match open.last_mut() {
                        Some(parent) => parent.submodels.push(block),
                        None => deck.model = Some(block),
                    }
                }
                "distribution" => {
                    let Some(block) = open.last_mut() else {
                        return Err(DeckError::new(line, "\"distribution\" must appear inside a model block."));
                    };
                    let Some((param, spec)) = args.split_first() else {
                        return Err(DeckError::new(
                            line,
                            "Expected \"distribution <parameter> <kind> <arguments>\".",
                        ));
                    };
                    let dist = Distribution::from_tokens(spec)
                        .map_err(|e| DeckError::new(line, e.to_string()))?;
                    if block.distributions.insert(param, dist).is_some() {
                        debug!(line, parameter = *param, "distribution replaced");
                    }
                }
                "observable" => {
                    let [name] = args else {
                        return Err(DeckError::new(line, "Expected \"observable <name>\"."));
                    };
                    deck.observables.push(ObservableEntry {
                        name: name.to_string(),
                        line,
                    });
                }
                "trials" => deck.trials = Some(parse_number(line, args, "trials <count>")?),
                "seed" => deck.seed = Some(parse_number(line, args, "seed <integer>")?),
                "output" => {
                    let [path] = args else {
                        return Err(DeckError::new(line, "Expected \"output <path>\"."));
                    };
                    deck.output = Some(PathBuf::from(path));
                }
                "bin" => deck.bins.push(parse_bin(line, args)?),
                other => {
                    return Err(DeckError::new(line, format!("Unrecognized command \"{other}\".")));
                }
            }
        }

        if let Some(block) = open.last() {
            return Err(DeckError::new(
                block.line,
                format!("Model \"{}\" is missing its \"endmodel\".", block.name),
            ));
        }
        Ok(deck)
    }

    /// Build the model tree and bind the observable columns.
    pub fn simulator(
        &self,
        models: &ModelRegistry,
        observables: &ObservableRegistry,
    ) -> Result<Simulator, DeckError> {
        let block = self
            .model
            .as_ref()
            .ok_or_else(|| DeckError::new(0, "No model was specified."))?;
        let model = block.build(models)?;
        let mut sim = Simulator::new(model).map_err(|e| DeckError::new(block.line, e.to_string()))?;

        for entry in &self.observables {
            let obs = observables
                .lookup(&entry.name)
                .map_err(|e| DeckError::new(entry.line, e.to_string()))?;
            sim.push_observable(obs)
                .map_err(|e| DeckError::new(entry.line, e.to_string()))?;
        }
        Ok(sim)
    }
}

impl ModelBlock {
    /// Build this block (and its submodels, depth first) into a model.
    pub fn build(&self, registry: &ModelRegistry) -> Result<Arc<Model>, DeckError> {
        let at_block = |e: crate::error::ModelError| DeckError::new(self.line, e.to_string());

        let mut factory = registry.factory(&self.name).map_err(at_block)?;
        for name in factory.set_distributions(&self.distributions) {
            warn!(
                line = self.line,
                model = self.name.as_str(),
                parameter = name.as_str(),
                "distribution is not used by this model"
            );
        }
        for sub in &self.submodels {
            let submodel = sub.build(registry)?;
            factory
                .add_submodel(submodel)
                .map_err(|e| DeckError::new(sub.line, e.to_string()))?;
        }
        let model = factory.build().map_err(at_block)?;
        debug!(
            model = model.kind_name(),
            parameters = model.num_parameters(),
            "model built"
        );
        Ok(model)
    }
}

fn parse_number<T: std::str::FromStr>(line: usize, args: &[&str], usage: &str) -> Result<T, DeckError> {
    let [value] = args else {
        return Err(DeckError::new(line, format!("Expected \"{usage}\".")));
    };
    value
        .parse::<T>()
        .map_err(|_| DeckError::new(line, format!("Unable to parse \"{value}\" (use \"{usage}\").")))
}

fn parse_bin(line: usize, args: &[&str]) -> Result<BinSpec, DeckError> {
    const USAGE: &str = "bin <count> <linear|log> [base]";
    let (count, scale, base) = match args {
        [count, scale] => (count, scale, None),
        [count, scale, base] => (count, scale, Some(base)),
        _ => return Err(DeckError::new(line, format!("Expected \"{USAGE}\"."))),
    };
    let nbins: usize = parse_number(line, &[*count], USAGE)?;
    let scale = match scale.to_lowercase().as_str() {
        "linear" => BinScale::Linear,
        "log" => BinScale::Log,
        other => {
            return Err(DeckError::new(
                line,
                format!("Unrecognized bin style \"{other}\". Options are: linear, log."),
            ));
        }
    };
    let base = match base {
        Some(base) => parse_number(line, &[*base], USAGE)?,
        None => 10.0,
    };
    let style = BinStyle::from_scale(scale, base).map_err(|e| DeckError::new(line, e.to_string()))?;
    Ok(BinSpec::new(nbins, style))
}
