//! Engine-level error types.
//!
//! Every failure the request surface can report maps onto one variant
//! here, each with a stable machine-readable code. Codes are part of
//! the API contract: clients branch on them, so they never change even
//! when the human-readable message does.

use thiserror::Error;
use wayfarer_core::error::CoreError;
use wayfarer_llm::LlmError;

/// Errors surfaced by the orchestration layer.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The bearer token was missing, malformed, or rejected.
    #[error("authentication required")]
    Unauthenticated,

    /// A referenced record (character, world, adventure) does not exist
    /// or is not owned by the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// The named site does not exist in the requested world.
    #[error("site not found in world: {0}")]
    SiteNotFound(String),

    /// The requested node key is absent from the current story graph.
    #[error("node not found in story graph: {0}")]
    NodeNotFound(String),

    /// Story generation exhausted its retry budget without producing a
    /// graph that passed validation.
    #[error("story generation failed after {attempts} attempts")]
    GenerationFailed {
        /// Number of model calls made before giving up.
        attempts: u32,
    },

    /// The character's stamina reached zero; the adventure has been
    /// closed out and no further beats can be generated.
    #[error("character stamina depleted, adventure is over")]
    StaminaDepleted,

    /// Combat was requested from a node that carries no enemy data.
    #[error("combat requires an enemy on the current node")]
    EnemyDataRequired,

    /// The combat dialogue script came back unusable.
    #[error("combat script generation failed: {0}")]
    CombatScriptGenerationFailed(String),

    /// A combat turn was submitted but no battle is in progress.
    #[error("no active combat on this adventure")]
    NoActiveCombat,

    /// The request was structurally invalid.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A storage operation failed for a reason other than SQL errors.
    #[error("storage error: {0}")]
    Storage(String),

    /// SQLite-level failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Model gateway failure.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Domain-logic failure bubbled up from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration could not be loaded or was invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound(_) => "not_found",
            Self::SiteNotFound(_) => "site_not_found",
            Self::NodeNotFound(_) => "node_not_found",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::StaminaDepleted => "stamina_depleted",
            Self::EnemyDataRequired => "enemy_data_required",
            Self::CombatScriptGenerationFailed(_) => "combat_script_generation_failed",
            Self::NoActiveCombat => "no_active_combat",
            Self::BadRequest(_) => "bad_request",
            Self::Storage(_) => "storage_error",
            Self::Database(_) => "database_error",
            Self::Llm(err) => err.code(),
            Self::Core(err) => err.code(),
            Self::Config(_) => "config_error",
        }
    }
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
