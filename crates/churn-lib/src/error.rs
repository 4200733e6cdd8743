//! Error taxonomy for the prediction pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChurnError {
    /// The model artifact is missing, unreadable or corrupt. Fatal for the session.
    #[error("Model unavailable at {path}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },

    /// The artifact's declared input layout does not match the feature schema.
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A profile violates the documented input ranges.
    #[error("Malformed profile: {0}")]
    MalformedProfile(String),

    /// The predictor failed for a single request.
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ChurnError {
    pub fn model_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ChurnError::ModelUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error means no inference can run this session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ChurnError::ModelUnavailable { .. } | ChurnError::SchemaMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_message_names_path() {
        let err = ChurnError::model_unavailable("/tmp/model.onnx", "No such file");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/model.onnx"));
        assert!(msg.contains("No such file"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_request_errors_are_not_fatal() {
        assert!(!ChurnError::Inference("boom".to_string()).is_fatal());
        assert!(!ChurnError::MalformedProfile("age".to_string()).is_fatal());
        assert!(ChurnError::SchemaMismatch("width".to_string()).is_fatal());
    }
}
