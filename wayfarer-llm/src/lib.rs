//! # wayfarer-llm — Model Gateway for Wayfarer
//!
//! A thin, unreliable-output-aware interface to an OpenAI-compatible
//! chat-completion endpoint:
//!
//! - **Single-shot calls** — the gateway never retries; the adventure
//!   orchestrator owns the bounded retry loop.
//! - **JSON extraction** — model output may be fenced, noisy, or plain
//!   garbage. Extraction failure is a soft result (`json = None`), never
//!   an error; only transport and credential failures are errors.
//! - **Model-pool policy** — model selection is an injected policy so
//!   tests can substitute a deterministic picker.
//!
//! The per-user API key is resolved by the caller per request and passed
//! in; this crate never stores credentials.

pub mod client;
pub mod error;
pub mod pool;
pub mod prompt;
pub mod types;

pub use client::{ModelClient, extract_json};
pub use error::LlmError;
pub use pool::{FixedPicker, ModelPick, ModelPicker, RandomPicker};
pub use types::{Completion, CompletionRequest};
