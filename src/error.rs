//! Error taxonomy shared by the training pipeline and the inference service.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by training, artifact handling and inference.
#[derive(Debug, Error)]
pub enum PredictorError {
    /// A record or dataset is missing required fields, or a field has the wrong kind.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The training data cannot be stratified into usable fit/test splits.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A serialized model, feature list or version file is missing or corrupt.
    #[error("failed to load artifact {path}: {reason}")]
    ArtifactLoadFailure { path: PathBuf, reason: String },

    /// The compute step of a prediction failed.
    #[error("prediction failed: {0}")]
    PredictionFailure(String),

    /// A record value or training parameter is outside its accepted domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The dataset file could not be opened or read.
    #[error("dataset unavailable at {path}: {reason}")]
    DatasetUnavailable { path: PathBuf, reason: String },

    /// The dataset was readable but a cell could not be interpreted.
    #[error("malformed dataset: {0}")]
    MalformedDataset(String),

    /// The optimizer failed to fit the classifier.
    #[error("training failed: {0}")]
    Training(String),

    /// Writing artifacts failed.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type PredictorResult<T> = Result<T, PredictorError>;

impl PredictorError {
    pub fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the caller sent something unusable, as opposed to a server-side fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::SchemaMismatch(_) | Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(PredictorError::InvalidInput("age".into()).is_client_error());
        assert!(PredictorError::SchemaMismatch("Sex".into()).is_client_error());
        assert!(!PredictorError::PredictionFailure("nan".into()).is_client_error());
        assert!(!PredictorError::artifact("model.json", "missing").is_client_error());
    }

    #[test]
    fn test_artifact_error_message_names_path() {
        let err = PredictorError::artifact("artifacts/model.json", "not found");
        let msg = err.to_string();
        assert!(msg.contains("artifacts/model.json"));
        assert!(msg.contains("not found"));
    }
}
