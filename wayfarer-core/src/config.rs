//! Game tuning configuration.
//!
//! Maps directly to `wayfarer.toml`. Everything here has a sensible
//! default so an empty file (or no file) yields the reference behavior.

use serde::{Deserialize, Serialize};

/// Top-level game configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Story-graph generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Combat engine tuning.
    #[serde(default)]
    pub combat: CombatConfig,
}

impl GameConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`crate::CoreError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CoreError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Story-graph generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Total generation attempts per request before giving up. Retries
    /// are sequential and immediate — no backoff.
    #[serde(default = "default_3")]
    pub max_attempts: u32,
    /// Pre-rolled events (and story beats) per graph.
    #[serde(default = "default_3_usize")]
    pub events_per_graph: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            events_per_graph: 3,
        }
    }
}

/// Combat engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Probability that a flee attempt succeeds.
    #[serde(default = "default_0_5")]
    pub flee_chance: f64,
    /// Severity roll below this is a low hit.
    #[serde(default = "default_0_2")]
    pub severity_low: f64,
    /// Severity roll above this is a high hit.
    #[serde(default = "default_0_8")]
    pub severity_high: f64,
    /// Damage dealt by a low-severity hit.
    #[serde(default = "default_6")]
    pub damage_low: u32,
    /// Damage dealt by a mid-severity hit.
    #[serde(default = "default_12")]
    pub damage_mid: u32,
    /// Damage dealt by a high-severity hit.
    #[serde(default = "default_22")]
    pub damage_high: u32,
    /// Dialogue lines requested per skill and per item in the one-shot
    /// combat script.
    #[serde(default = "default_5")]
    pub lines_per_source: u32,
    /// Finisher lines requested in the one-shot combat script.
    #[serde(default = "default_5")]
    pub finisher_lines: u32,
    /// Starting health for both combatants.
    #[serde(default = "default_100")]
    pub starting_health: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            flee_chance: 0.5,
            severity_low: 0.2,
            severity_high: 0.8,
            damage_low: 6,
            damage_mid: 12,
            damage_high: 22,
            lines_per_source: 5,
            finisher_lines: 5,
            starting_health: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_0_2() -> f64 {
    0.2
}
fn default_0_5() -> f64 {
    0.5
}
fn default_0_8() -> f64 {
    0.8
}
fn default_3() -> u32 {
    3
}
fn default_3_usize() -> usize {
    3
}
fn default_5() -> u32 {
    5
}
fn default_6() -> u32 {
    6
}
fn default_12() -> u32 {
    12
}
fn default_22() -> u32 {
    22
}
fn default_100() -> u32 {
    100
}
