//! Model client — single-shot completion calls against an
//! OpenAI-compatible endpoint, with JSON payload extraction.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{Completion, CompletionRequest};

/// How much upstream error body to keep in an error message.
const ERROR_BODY_LIMIT: usize = 300;

/// Client for an OpenAI-compatible chat-completion endpoint.
///
/// The client is deliberately single-shot: a call either completes or
/// fails once. Bounded retry belongs to the orchestrator, which owns
/// the budget and knows which failures are worth another model call.
pub struct ModelClient {
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ModelClient {
    /// Create a client for the given endpoint base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Send one completion request.
    ///
    /// When `request.want_json` is set, a JSON payload is extracted
    /// from the completion text; extraction or parse failure yields
    /// `json = None` rather than an error — the caller treats that as
    /// a retryable soft failure.
    ///
    /// # Errors
    ///
    /// [`LlmError::MissingCredential`] when `api_key` is empty (checked
    /// before any I/O); [`LlmError::Upstream`] on a non-success HTTP
    /// status; transport failures per [`LlmError`]'s `From<reqwest::Error>`.
    pub async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<Completion, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }

        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.user }));

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        if request.want_json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .timeout(Duration::from_millis(request.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(request.timeout_ms)
                } else {
                    LlmError::from(e)
                }
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status();
        if !status.is_success() {
            let message = truncate(&response.text().await.unwrap_or_default());
            warn!(status = status.as_u16(), %message, "upstream model error");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidEnvelope(e.to_string()))?;
        let text = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::InvalidEnvelope("missing choices[0].message.content".into()))?
            .to_string();

        let json = if request.want_json {
            let extracted = extract_json(&text);
            if extracted.is_none() {
                debug!(model = %request.model, "no JSON payload extractable from completion");
            }
            extracted
        } else {
            None
        };

        debug!(model = %request.model, latency_ms, chars = text.len(), "completion received");
        Ok(Completion {
            text,
            json,
            model: request.model.clone(),
            latency_ms,
        })
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= ERROR_BODY_LIMIT {
        return s.to_string();
    }
    let head: String = s.chars().take(ERROR_BODY_LIMIT).collect();
    format!("{head}...")
}

/// Extract a JSON object from possibly fenced, possibly noisy model
/// output.
///
/// Tries, in order: a fenced code block tagged `json`, then the
/// outermost `{...}` span. Returns `None` when neither locates a
/// parseable object.
#[must_use]
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    if let Some(fenced) = fenced_json_block(text) {
        if let Ok(value) = serde_json::from_str(fenced) {
            return Some(value);
        }
    }
    let candidate = outermost_object(text)?;
    serde_json::from_str(candidate).ok()
}

/// The contents of the first ```json fenced block, if any.
fn fenced_json_block(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// The outermost `{...}` span, if any.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
