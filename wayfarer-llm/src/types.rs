//! Request and response shapes for the model gateway.

use serde::{Deserialize, Serialize};

/// A single completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier, as chosen by the pool policy.
    pub model: String,
    /// Optional system instruction.
    pub system: Option<String>,
    /// User content.
    pub user: String,
    /// Whether the caller wants a JSON payload extracted from the
    /// completion text. Also sets the provider's response-format hint.
    pub want_json: bool,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl CompletionRequest {
    /// A request with the default generation parameters.
    #[must_use]
    pub fn new(model: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            user: user.into(),
            want_json: false,
            max_tokens: 2048,
            temperature: 0.9,
            timeout_ms: 30_000,
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Request JSON payload extraction.
    #[must_use]
    pub fn expecting_json(mut self) -> Self {
        self.want_json = true;
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A completed model call.
#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
    /// The raw generated text.
    pub text: String,
    /// JSON payload extracted from the text, if one was requested and
    /// could be located and parsed. `None` is a retryable soft failure,
    /// not an error.
    pub json: Option<serde_json::Value>,
    /// Which model answered.
    pub model: String,
    /// Wall-clock latency in milliseconds.
    pub latency_ms: u64,
}
