//! Model gateway error types.

use thiserror::Error;

/// Errors that can occur during a model gateway call.
///
/// An unparseable completion body is deliberately *not* represented
/// here: JSON-extraction misses surface as `Completion::json == None`,
/// a retryable soft failure for the orchestrator.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was available for the requesting user. Checked before
    /// any I/O.
    #[error("no model API key available for this request")]
    MissingCredential,

    /// The upstream endpoint answered with a non-success status.
    #[error("upstream model error (HTTP {status}): {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Upstream error body, truncated.
        message: String,
    },

    /// The request timed out.
    #[error("model request timed out after {0}ms")]
    Timeout(u64),

    /// The endpoint could not be reached.
    #[error("model endpoint unavailable: {0}")]
    Unavailable(String),

    /// The HTTP request failed for another transport reason.
    #[error("model request failed: {0}")]
    RequestFailed(String),

    /// The success response body did not match the provider envelope.
    #[error("malformed provider response: {0}")]
    InvalidEnvelope(String),

    /// Gateway configuration error (empty model pool, bad base URL).
    #[error("model gateway configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Upstream { .. } => "upstream_error",
            Self::Timeout(_) => "upstream_timeout",
            Self::Unavailable(_) => "upstream_unavailable",
            Self::RequestFailed(_) => "upstream_request_failed",
            Self::InvalidEnvelope(_) => "malformed_response",
            Self::Config(_) => "gateway_config_error",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(0)
        } else if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}
