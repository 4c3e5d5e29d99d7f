//! Authenticated request surface over the engine.
//!
//! Every operation verifies the bearer token first and resolves the
//! caller's model credential fresh from the secret store — keys are
//! never cached between requests. Errors leave as a stable
//! `{code, message}` pair.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wayfarer_core::combat::{CombatAction, CombatState};
use wayfarer_core::types::{Adventure, AdventureId, CharacterId, EnemyTemplate, UserId, WorldId};
use wayfarer_llm::{LlmError, ModelPicker};

use crate::adventure::{GameEngine, ProceedOutcome};
use crate::error::EngineError;
use crate::ports::{GameStore, IdentityVerifier, SecretStore, StoryModel};

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Stable error shape handed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, stable across releases.
    pub code: String,
    /// Human-readable message; free to change.
    pub message: String,
}

impl From<EngineError> for ErrorResponse {
    fn from(err: EngineError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Start an adventure at a named site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAdventureRequest {
    /// The character playing.
    pub character_id: CharacterId,
    /// The world holding the site.
    pub world_id: WorldId,
    /// Site name within the world.
    pub site_name: String,
}

/// Generate the next batch of beats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueAdventureRequest {
    /// The adventure to continue.
    pub adventure_id: AdventureId,
}

/// Step to a chosen node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceedRequest {
    /// The adventure being played.
    pub adventure_id: AdventureId,
    /// Key of the node the chosen choice leads to.
    pub next_node: String,
    /// The choice text as shown, recorded in the history.
    pub choice_text: String,
}

/// Start a combat against the enemy on the current combat node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCombatRequest {
    /// The adventure being played.
    pub adventure_id: AdventureId,
    /// The enemy to fight, from the combat node's payload.
    pub enemy: Option<EnemyTemplate>,
}

/// Submit one combat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatTurnRequest {
    /// The adventure being played.
    pub adventure_id: AdventureId,
    /// The player's action.
    pub action: CombatAction,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// The authenticated facade: token verification, credential lookup,
/// then delegation to [`GameEngine`].
#[derive(Debug)]
pub struct Backend<V, K, S, M, P> {
    verifier: V,
    secrets: K,
    engine: GameEngine<S, M, P>,
}

type ApiResult<T> = Result<T, ErrorResponse>;

impl<V, K, S, M, P> Backend<V, K, S, M, P>
where
    V: IdentityVerifier,
    K: SecretStore,
    S: GameStore,
    M: StoryModel,
    P: ModelPicker,
{
    /// Build the facade over its collaborators.
    pub fn new(verifier: V, secrets: K, engine: GameEngine<S, M, P>) -> Self {
        Self {
            verifier,
            secrets,
            engine,
        }
    }

    /// The wrapped engine, for wiring and tests.
    pub fn engine(&self) -> &GameEngine<S, M, P> {
        &self.engine
    }

    fn authenticate(&self, bearer: &str) -> Result<UserId, EngineError> {
        match self.verifier.verify(bearer) {
            Some(identity) => {
                debug!(uid = %identity.uid, "request authenticated");
                Ok(identity.uid)
            }
            None => Err(EngineError::Unauthenticated),
        }
    }

    fn api_key(&self, uid: &UserId) -> Result<String, EngineError> {
        self.secrets
            .api_key_for(uid)?
            .ok_or(EngineError::Llm(LlmError::MissingCredential))
    }

    /// Start a new adventure.
    ///
    /// # Errors
    /// Returns the engine error as a stable `{code, message}` pair.
    pub async fn start_adventure<R: Rng>(
        &self,
        bearer: &str,
        request: &StartAdventureRequest,
        rng: &mut R,
    ) -> ApiResult<Adventure> {
        let uid = self.authenticate(bearer)?;
        let api_key = self.api_key(&uid)?;
        Ok(self
            .engine
            .start_adventure(
                &uid,
                request.character_id,
                request.world_id,
                &request.site_name,
                &api_key,
                rng,
            )
            .await?)
    }

    /// Continue an adventure with a fresh batch of beats.
    ///
    /// # Errors
    /// Returns the engine error as a stable `{code, message}` pair.
    pub async fn continue_adventure<R: Rng>(
        &self,
        bearer: &str,
        request: &ContinueAdventureRequest,
        rng: &mut R,
    ) -> ApiResult<Adventure> {
        let uid = self.authenticate(bearer)?;
        let api_key = self.api_key(&uid)?;
        Ok(self
            .engine
            .continue_adventure(&uid, request.adventure_id, &api_key, rng)
            .await?)
    }

    /// Step to a chosen node. Purely local — no credential needed.
    ///
    /// # Errors
    /// Returns the engine error as a stable `{code, message}` pair.
    pub fn proceed(&self, bearer: &str, request: &ProceedRequest) -> ApiResult<ProceedOutcome> {
        let uid = self.authenticate(bearer)?;
        Ok(self.engine.proceed(
            &uid,
            request.adventure_id,
            &request.next_node,
            &request.choice_text,
        )?)
    }

    /// Start the combat staged on the current node.
    ///
    /// # Errors
    /// Returns the engine error as a stable `{code, message}` pair.
    pub async fn start_combat(
        &self,
        bearer: &str,
        request: &StartCombatRequest,
    ) -> ApiResult<CombatState> {
        let uid = self.authenticate(bearer)?;
        let api_key = self.api_key(&uid)?;
        Ok(self
            .engine
            .start_combat(&uid, request.adventure_id, request.enemy.as_ref(), &api_key)
            .await?)
    }

    /// Submit one combat turn. Purely local — no credential needed.
    ///
    /// # Errors
    /// Returns the engine error as a stable `{code, message}` pair.
    pub fn combat_turn<R: Rng>(
        &self,
        bearer: &str,
        request: &CombatTurnRequest,
        rng: &mut R,
    ) -> ApiResult<CombatState> {
        let uid = self.authenticate(bearer)?;
        Ok(self
            .engine
            .combat_turn(&uid, request.adventure_id, &request.action, rng)?)
    }
}
