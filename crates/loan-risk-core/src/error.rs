use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanRiskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {field} — {reason}")]
    DateError { field: String, reason: String },

    #[error("Shape mismatch in {stage}: expected {expected} features, got {actual}")]
    ShapeMismatch {
        stage: String,
        expected: usize,
        actual: usize,
    },

    #[error("Inference failure: {0}")]
    Inference(String),

    #[error("Artifact error: {path} — {reason}")]
    Artifact { path: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanRiskError {
    /// True when the caller supplied bad data; false for faults on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LoanRiskError::InvalidInput { .. } | LoanRiskError::DateError { .. }
        )
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanRiskError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanRiskError {
    fn from(e: serde_json::Error) -> Self {
        LoanRiskError::SerializationError(e.to_string())
    }
}
