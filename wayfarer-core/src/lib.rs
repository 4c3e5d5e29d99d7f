//! # Wayfarer Core Library
//!
//! Game-agnostic logic for an LLM-driven narrative adventure backend.
//!
//! The crate owns everything that must stay deterministic and testable
//! while the language model stays neither:
//!
//! - **Event pre-rolling** — narrative beats are sampled from difficulty
//!   weighted tables *before* any model call, so the generator is
//!   constrained to a known outcome rather than asked to invent one.
//! - **Story graphs** — a small, near-linear graph of beats generated
//!   wholesale per request, with a strict structural validator that
//!   rejects anything the client state machine could not walk.
//! - **Combat** — a turn-based state machine over a pre-generated bank
//!   of flavor lines. One model call per combat, zero per turn.
//!
//! No I/O lives here: persistence, identity, and the model gateway are
//! collaborators consumed by `wayfarer-engine`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod combat;
pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod types;

pub use combat::{CombatAction, CombatScript, CombatState, CombatStatus};
pub use config::GameConfig;
pub use error::CoreError;
pub use graph::{StoryGraph, StoryNode};
pub use types::*;
