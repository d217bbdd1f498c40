//! Error types.
//!
//! - [`ModelError`]: conditions raised by the model / observable / simulator core
//! - [`AppError`]: what the binary reports (message + process exit code)

use thiserror::Error;

/// Errors raised while building models, binding observables, or simulating.
///
/// Every variant is either a construction-time defect (the build is aborted)
/// or a call-time condition surfaced to the immediate caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The factory was finalized while a parameter had no distribution.
    #[error("Missing the distribution \"{name}\".")]
    MissingDistribution { name: String },

    /// A submodel's declared type does not match the composite's requirement.
    #[error("Incompatible submodel: expected a {expected} submodel, found {found}.")]
    IncompatibleSubmodel {
        expected: &'static str,
        found: &'static str,
    },

    /// A submodel was added to (or composite behavior requested of) a leaf model.
    #[error("Not a composite model.")]
    NotCompositeModel,

    /// A composite model was finalized without any submodels.
    #[error("The composite model has no submodels.")]
    NoSubmodels,

    /// The model does not register the requested observable.
    #[error("Incompatible observable: the model does not provide \"{observable}\".")]
    IncompatibleObservable { observable: &'static str },

    /// The observable has no defined value for these parameter values.
    #[error("No value of \"{observable}\" is produced for these model parameters.")]
    NoObservableProduced { observable: &'static str },

    /// `simulate` was called before any observable was bound.
    #[error("No observables specified.")]
    NoObservables,

    /// `set_observable` was called with a column past the end.
    #[error("Observable column {column} is out of range (only {len} bound).")]
    ColumnOutOfRange { column: usize, len: usize },

    /// A submodel-kind model was handed to the simulator directly.
    #[error("A full model is required; submodels cannot be simulated on their own.")]
    FullModelRequired,

    /// A distribution could not be formed from the given arguments.
    #[error("Invalid distribution: {message}")]
    InvalidDistribution { message: String },

    #[error("Unrecognized model \"{name}\". Options are: {available}.")]
    UnknownModel { name: String, available: String },

    #[error("Unrecognized observable \"{name}\". Options are: {available}.")]
    UnknownObservable { name: String, available: String },
}

impl ModelError {
    /// True for the per-sample condition that batch policies may skip or redraw.
    pub fn is_no_observable_produced(&self) -> bool {
        matches!(self, ModelError::NoObservableProduced { .. })
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let exit_code = match err {
            ModelError::NoObservableProduced { .. } | ModelError::NoObservables => 3,
            _ => 2,
        };
        AppError::new(exit_code, format!("Error: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_exit_codes() {
        let build: AppError = ModelError::NoSubmodels.into();
        assert_eq!(build.exit_code(), 2);

        let sample: AppError = ModelError::NoObservableProduced {
            observable: "StaticConductance",
        }
        .into();
        assert_eq!(sample.exit_code(), 3);
        assert!(sample.to_string().contains("StaticConductance"));
    }

    #[test]
    fn missing_distribution_names_the_parameter() {
        let err = ModelError::MissingDistribution {
            name: "gamma".to_string(),
        };
        assert_eq!(err.to_string(), "Missing the distribution \"gamma\".");
    }
}
