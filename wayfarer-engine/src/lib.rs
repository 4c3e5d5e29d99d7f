//! # wayfarer-engine — Orchestration Layer for Wayfarer
//!
//! This crate wires the deterministic game logic of `wayfarer-core` to
//! its unreliable collaborators: the model gateway (`wayfarer-llm`), a
//! document store, an identity verifier, and a per-user secret store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Backend                      │
//! │   auth-first request surface, error codes     │
//! │  ┌────────────────────────────────────────┐  │
//! │  │              GameEngine                 │  │
//! │  │  adventure lifecycle · combat service   │  │
//! │  │  ┌──────────────┐  ┌────────────────┐  │  │
//! │  │  │ wayfarer-core │  │  wayfarer-llm  │  │  │
//! │  │  └──────────────┘  └────────────────┘  │  │
//! │  └────────────────────────────────────────┘  │
//! │   ports: IdentityVerifier · SecretStore ·     │
//! │          GameStore · StoryModel               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Execution is single-threaded per request; all durable state lives in
//! the store and is read-modify-written per call. Adventure and combat
//! updates are last-writer-wins whole-document merges — callers must not
//! assume stronger cross-call isolation.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adventure;
pub mod combat;
pub mod compose;
pub mod config;
pub mod error;
pub mod ports;
pub mod service;
pub mod store;

pub use adventure::{GameEngine, ProceedOutcome};
pub use config::EngineConfig;
pub use error::EngineError;
pub use service::Backend;
pub use store::{MemoryStore, SqliteStore};
