//! Engine configuration.
//!
//! Loaded from a single TOML file; every field has a sensible default
//! so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wayfarer_core::GameConfig;

use crate::error::{EngineError, Result};

/// Top-level configuration for the orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Gameplay tuning knobs, shared with the core crate.
    #[serde(default)]
    pub game: GameConfig,
    /// Model gateway settings.
    #[serde(default)]
    pub llm: LlmSettings,
    /// Durable storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Settings for talking to the upstream model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Pool of model identifiers to draw from per request.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Token ceiling for a single completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature for story and dialogue generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: default_models(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Where adventure documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path. `:memory:` is accepted for tests.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load a configuration from a TOML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EngineError::Config(e.to_string()))?;
        Self::from_toml(&text)
    }
}

// --- defaults ---

fn default_base_url() -> String {
    "https://openrouter.ai/api".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "deepseek/deepseek-chat-v3-0324".to_string(),
        "mistralai/mistral-small-3.2-24b-instruct".to_string(),
        "qwen/qwen3-235b-a22b".to_string(),
    ]
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.9
}

fn default_db_path() -> String {
    "wayfarer.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = EngineConfig::from_toml("").unwrap();
        assert_eq!(cfg.llm.timeout_ms, 30_000);
        assert_eq!(cfg.game.generation.max_attempts, 3);
        assert!(!cfg.llm.models.is_empty());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = EngineConfig::from_toml(
            r#"
            [llm]
            timeout_ms = 5000

            [game.combat]
            flee_chance = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(cfg.llm.timeout_ms, 5000);
        assert_eq!(cfg.llm.max_tokens, 2048);
        assert!((cfg.game.combat.flee_chance - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = EngineConfig::from_toml("llm = 3").unwrap_err();
        assert_eq!(err.code(), "config_error");
    }
}
