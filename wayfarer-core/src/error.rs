//! Error types for the Wayfarer core library.

use thiserror::Error;

use crate::combat::{CombatStatus, TurnOwner};

/// Top-level error type for core game-logic operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A combat action arrived while the battle was over or it was not
    /// the player's turn. The combat log is left untouched.
    #[error("invalid turn: combat is {status:?}, turn belongs to {turn:?}")]
    InvalidTurn {
        /// Combat status at the time of the rejected action.
        status: CombatStatus,
        /// Whose turn it actually was.
        turn: TurnOwner,
    },

    /// A skill or item action named a source the combat snapshot does
    /// not carry.
    #[error("action source not found in combat snapshot: {0}")]
    ActionSourceNotFound(String),

    /// A generated story graph violated a structural invariant.
    #[error("story graph rejected: {0}")]
    Graph(#[from] crate::graph::GraphError),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic I/O error (config file loading).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Stable machine-readable code for this error, used at the request
    /// boundary.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTurn { .. } => "invalid_turn",
            Self::ActionSourceNotFound(_) => "action_source_not_found",
            Self::Graph(_) => "invalid_graph",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
