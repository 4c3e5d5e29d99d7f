//! Engine ports: the seams the orchestrator depends on.
//!
//! Everything the engine needs from the outside world is a trait here.
//! Production wires these to SQLite, the model gateway, and the external
//! identity provider; tests wire them to in-memory fakes.

use wayfarer_core::types::{
    Adventure, AdventureId, CharacterId, CharacterSheet, UserId, WorldId, WorldRecord,
};
use wayfarer_llm::{Completion, CompletionRequest, LlmError, ModelClient};

use crate::error::Result;

/// An authenticated caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user identifier.
    pub uid: UserId,
    /// Contact address, for logging only.
    pub email: String,
}

/// Verifies bearer tokens against the external identity provider.
pub trait IdentityVerifier {
    /// Verify a bearer token. `None` means the token is invalid or
    /// expired; the request surface maps that to an auth failure.
    fn verify(&self, bearer: &str) -> Option<Identity>;
}

/// Resolves per-user model credentials. Keys are looked up fresh on
/// every request, never cached by the engine.
pub trait SecretStore {
    /// The caller's model API key, if one is on file.
    ///
    /// # Errors
    /// Returns a storage error if the secret backend is unreachable.
    fn api_key_for(&self, uid: &UserId) -> Result<Option<String>>;
}

/// Durable storage for characters, worlds, and adventures.
///
/// Documents are whole-record reads and writes; the engine performs
/// read-modify-write per request with last-writer-wins semantics.
pub trait GameStore {
    /// Fetch a character by id.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn character(&self, id: CharacterId) -> Result<Option<CharacterSheet>>;

    /// Insert or replace a character.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn put_character(&self, sheet: &CharacterSheet) -> Result<()>;

    /// Fetch a world by id.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn world(&self, id: WorldId) -> Result<Option<WorldRecord>>;

    /// Insert or replace a world.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn put_world(&self, world: &WorldRecord) -> Result<()>;

    /// Fetch an adventure by id.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn adventure(&self, id: AdventureId) -> Result<Option<Adventure>>;

    /// Insert or replace an adventure.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn put_adventure(&self, adventure: &Adventure) -> Result<()>;

    /// Delete an adventure. Deleting a missing adventure is a no-op.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn delete_adventure(&self, id: AdventureId) -> Result<()>;

    /// All ongoing adventures for a character. Used to enforce the
    /// one-ongoing-adventure rule at start time.
    ///
    /// # Errors
    /// Returns a storage error on backend failure.
    fn ongoing_adventures_for(&self, character: CharacterId) -> Result<Vec<Adventure>>;
}

/// One-shot completion source. Production is [`ModelClient`]; tests
/// script it.
#[allow(async_fn_in_trait)]
pub trait StoryModel {
    /// Run a single completion. No retries at this level — the caller
    /// owns the retry policy.
    ///
    /// # Errors
    /// Returns an [`LlmError`] on transport or envelope failure.
    async fn generate(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, LlmError>;
}

impl StoryModel for ModelClient {
    async fn generate(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, LlmError> {
        self.complete(api_key, request).await
    }
}
