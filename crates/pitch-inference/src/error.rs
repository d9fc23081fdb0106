//! Inference error taxonomy.
//!
//! Upstream failures are categorized so the orchestrator can decide
//! retry-worthiness: credential and quota problems need external
//! intervention, while network blips and malformed replies are worth
//! another attempt.

use thiserror::Error;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors from the model endpoint or response handling.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Authentication rejected by model endpoint (status {status}); check the API credential")]
    Auth { status: u16 },

    #[error("Model quota exhausted")]
    Quota,

    #[error("Model endpoint rejected the request: {0}")]
    BadRequest(String),

    #[error("Content blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("Model request timed out")]
    Timeout,

    #[error("Network failure talking to model endpoint: {0}")]
    Network(String),

    #[error("Model endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Model response carried no valid candidate text")]
    NoCandidate,

    #[error("No JSON object could be extracted from model reply: {text}")]
    Extraction { text: String },

    #[error("Model reply did not match the detection schema: {0}")]
    Schema(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl InferenceError {
    /// Short category label used in logs and user-visible failure messages.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Quota => "quota",
            Self::BadRequest(_) => "bad-request",
            Self::SafetyBlocked(_) => "safety",
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Upstream { .. } => "upstream",
            Self::NoCandidate => "no-candidate",
            Self::Extraction { .. } => "extraction",
            Self::Schema(_) => "schema",
        }
    }

    /// Whether re-invoking the model with the same prompt could succeed.
    ///
    /// Malformed replies are often non-deterministic, so extraction and
    /// schema failures count as retryable. Auth, quota, safety blocks and
    /// malformed requests will not improve on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Network(_)
                | Self::Upstream { .. }
                | Self::NoCandidate
                | Self::Extraction { .. }
                | Self::Schema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(!InferenceError::Auth { status: 401 }.is_retryable());
        assert!(!InferenceError::Quota.is_retryable());
        assert!(!InferenceError::SafetyBlocked("x".into()).is_retryable());
        assert!(InferenceError::Timeout.is_retryable());
        assert!(InferenceError::Extraction { text: "x".into() }.is_retryable());
        assert!(InferenceError::Schema("x".into()).is_retryable());
    }

    #[test]
    fn test_categories_name_probable_cause() {
        assert_eq!(InferenceError::Quota.category(), "quota");
        assert_eq!(InferenceError::Timeout.category(), "timeout");
        assert_eq!(InferenceError::NoCandidate.category(), "no-candidate");
    }
}
