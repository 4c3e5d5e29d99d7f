//! Adventure lifecycle orchestration.
//!
//! `GameEngine` owns the generate-validate-retry loop: it pre-rolls the
//! event sequence, composes the prompts, calls the model, and accepts a
//! graph only if it parses, passes structural validation, and realizes
//! the pre-rolled events under their fixed node keys. Any rejection
//! burns one attempt; the budget is small and retries are immediate.

use rand::Rng;
use tracing::{info, warn};
use wayfarer_core::events::{PreRolledEvent, pre_roll_sequence};
use wayfarer_core::graph::{START_KEY, StoryGraph, StoryNode, matches_events, validate};
use wayfarer_core::types::{
    Adventure, AdventureId, AdventureStatus, CharacterId, CharacterSheet, CharacterState, Item,
    UserId, WorldId, WorldRecord,
};
use wayfarer_llm::{CompletionRequest, LlmError, ModelPicker};

use crate::compose::compose_story_prompt;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::ports::{GameStore, StoryModel};

/// What a single proceed step produced.
#[derive(Debug, Clone)]
pub struct ProceedOutcome {
    /// The node the adventure now sits on.
    pub node: StoryNode,
    /// Character state after node effects.
    pub character_state: CharacterState,
    /// The item minted by stepping onto an item node, if any.
    pub new_item: Option<Item>,
}

/// The orchestrator: one instance serves all users.
#[derive(Debug)]
pub struct GameEngine<S, M, P> {
    pub(crate) store: S,
    pub(crate) model: M,
    pub(crate) picker: P,
    pub(crate) config: EngineConfig,
}

impl<S, M, P> GameEngine<S, M, P>
where
    S: GameStore,
    M: StoryModel,
    P: ModelPicker,
{
    /// Build an engine over its collaborators.
    pub fn new(store: S, model: M, picker: P, config: EngineConfig) -> Self {
        Self {
            store,
            model,
            picker,
            config,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a new adventure at a named site.
    ///
    /// Any previous ongoing adventure for the character is deleted
    /// first — exactly one ongoing adventure exists per character.
    ///
    /// # Errors
    /// `NotFound` for missing or foreign records, `SiteNotFound` for a
    /// bad site name, `GenerationFailed` when the retry budget is
    /// exhausted, plus storage and gateway errors.
    pub async fn start_adventure<R: Rng>(
        &self,
        uid: &UserId,
        character_id: CharacterId,
        world_id: WorldId,
        site_name: &str,
        api_key: &str,
        rng: &mut R,
    ) -> Result<Adventure> {
        let character = self.owned_character(uid, character_id)?;
        let world = self.owned_world(uid, world_id)?;
        let site = world
            .site(site_name)
            .ok_or_else(|| EngineError::SiteNotFound(site_name.to_string()))?;

        for stale in self.store.ongoing_adventures_for(character_id)? {
            info!(adventure = %stale.id, "superseding ongoing adventure");
            self.store.delete_adventure(stale.id)?;
        }

        let events = pre_roll_sequence(
            site.difficulty,
            self.config.game.generation.events_per_graph,
            rng,
        );
        let (system, user) = compose_story_prompt(&world, &character, site, None, &events, &[]);
        let graph = self.generate_graph(api_key, system, user, &events).await?;

        let now = chrono::Utc::now();
        let adventure = Adventure {
            id: AdventureId::new(),
            owner_uid: uid.clone(),
            character_id,
            world_id,
            site_name: site.name.clone(),
            status: AdventureStatus::Ongoing,
            character_state: CharacterState::fresh(character.items.clone()),
            history: Vec::new(),
            story_graph: graph,
            current_node_key: START_KEY.to_string(),
            combat_state: None,
            created_at: now,
            updated_at: now,
        };
        self.store.put_adventure(&adventure)?;
        info!(adventure = %adventure.id, site = %adventure.site_name, "adventure started");
        Ok(adventure)
    }

    /// Generate the next batch of beats for an adventure that reached
    /// its ending node.
    ///
    /// The current graph is replaced wholesale; history and character
    /// state carry over. A character at zero stamina cannot continue:
    /// the adventure is closed out and the call fails.
    ///
    /// # Errors
    /// `StaminaDepleted` closes the adventure, `BadRequest` if it is
    /// not ongoing, plus the start-time generation errors.
    pub async fn continue_adventure<R: Rng>(
        &self,
        uid: &UserId,
        adventure_id: AdventureId,
        api_key: &str,
        rng: &mut R,
    ) -> Result<Adventure> {
        let mut adventure = self.owned_adventure(uid, adventure_id)?;
        if adventure.status != AdventureStatus::Ongoing {
            return Err(EngineError::BadRequest("adventure is over".to_string()));
        }

        // The stamina gate runs before any model call is made.
        if adventure.character_state.exhausted() {
            adventure.status = AdventureStatus::Finished;
            adventure.updated_at = chrono::Utc::now();
            self.store.put_adventure(&adventure)?;
            return Err(EngineError::StaminaDepleted);
        }

        let character = self.owned_character(uid, adventure.character_id)?;
        let world = self.owned_world(uid, adventure.world_id)?;
        let site = world
            .site(&adventure.site_name)
            .ok_or_else(|| EngineError::SiteNotFound(adventure.site_name.clone()))?;

        let previous_outcome = adventure
            .story_graph
            .node(&adventure.current_node_key)
            .map(|node| match node {
                StoryNode::Ending { outcome, .. } => outcome.clone(),
                other => other.situation().to_string(),
            });

        let events = pre_roll_sequence(
            site.difficulty,
            self.config.game.generation.events_per_graph,
            rng,
        );
        let (system, user) = compose_story_prompt(
            &world,
            &character,
            site,
            previous_outcome.as_deref(),
            &events,
            &adventure.history,
        );
        let graph = self.generate_graph(api_key, system, user, &events).await?;

        adventure.story_graph = graph;
        adventure.current_node_key = START_KEY.to_string();
        adventure.updated_at = chrono::Utc::now();
        self.store.put_adventure(&adventure)?;
        info!(adventure = %adventure.id, "adventure continued with a fresh batch");
        Ok(adventure)
    }

    /// Step the adventure to a chosen node and apply its effects: trap
    /// penalties hit the stamina pool, item nodes mint a fresh item into
    /// both the adventure state and the permanent character collection.
    /// The chosen choice text is appended to the history as given.
    ///
    /// # Errors
    /// `NodeNotFound` for a key absent from the graph, `BadRequest`
    /// when the adventure is already over.
    pub fn proceed(
        &self,
        uid: &UserId,
        adventure_id: AdventureId,
        next_node_key: &str,
        choice_text: &str,
    ) -> Result<ProceedOutcome> {
        let mut adventure = self.owned_adventure(uid, adventure_id)?;
        if adventure.status != AdventureStatus::Ongoing {
            return Err(EngineError::BadRequest("adventure is over".to_string()));
        }

        let target = adventure
            .story_graph
            .node(next_node_key)
            .ok_or_else(|| EngineError::NodeNotFound(next_node_key.to_string()))?
            .clone();

        let mut new_item = None;
        match &target {
            StoryNode::Trap { penalty, .. } => {
                adventure.character_state.apply_stamina(penalty.value);
                info!(
                    adventure = %adventure.id,
                    penalty = penalty.value,
                    stamina = adventure.character_state.stamina,
                    "trap sprung"
                );
            }
            StoryNode::Item { item, .. } => {
                let granted = item.grant();
                adventure.character_state.items.push(granted.clone());
                // The grant is permanent, not just per-adventure.
                let mut sheet = self.owned_character(uid, adventure.character_id)?;
                sheet.items.push(granted.clone());
                self.store.put_character(&sheet)?;
                info!(adventure = %adventure.id, item = %granted.name, "item granted");
                new_item = Some(granted);
            }
            _ => {}
        }

        adventure.history.push(choice_text.to_string());
        adventure.current_node_key = next_node_key.to_string();
        adventure.updated_at = chrono::Utc::now();
        self.store.put_adventure(&adventure)?;

        Ok(ProceedOutcome {
            node: target,
            character_state: adventure.character_state,
            new_item,
        })
    }

    // --- shared lookups ---

    pub(crate) fn owned_character(
        &self,
        uid: &UserId,
        id: CharacterId,
    ) -> Result<CharacterSheet> {
        match self.store.character(id)? {
            Some(sheet) if &sheet.owner_uid == uid => Ok(sheet),
            _ => Err(EngineError::NotFound(format!("character {id}"))),
        }
    }

    pub(crate) fn owned_world(&self, uid: &UserId, id: WorldId) -> Result<WorldRecord> {
        match self.store.world(id)? {
            Some(world) if &world.owner_uid == uid => Ok(world),
            _ => Err(EngineError::NotFound(format!("world {id}"))),
        }
    }

    pub(crate) fn owned_adventure(&self, uid: &UserId, id: AdventureId) -> Result<Adventure> {
        match self.store.adventure(id)? {
            Some(adventure) if &adventure.owner_uid == uid => Ok(adventure),
            _ => Err(EngineError::NotFound(format!("adventure {id}"))),
        }
    }

    // --- generation loop ---

    /// Run the generate-validate loop. Every rejection — transport
    /// failure, missing JSON, parse error, structural violation, event
    /// mismatch — burns one attempt. Missing credentials abort at once:
    /// no retry can fix them.
    async fn generate_graph(
        &self,
        api_key: &str,
        system: String,
        user: String,
        events: &[PreRolledEvent],
    ) -> Result<StoryGraph> {
        let pick = self.picker.pick(&self.config.llm.models)?;
        let mut request = CompletionRequest::new(pick.primary, user)
            .with_system(system)
            .expecting_json()
            .with_timeout(self.config.llm.timeout_ms);
        request.max_tokens = self.config.llm.max_tokens;
        request.temperature = self.config.llm.temperature;

        let max_attempts = self.config.game.generation.max_attempts;
        for attempt in 1..=max_attempts {
            match self.model.generate(api_key, &request).await {
                Err(LlmError::MissingCredential) => return Err(LlmError::MissingCredential.into()),
                Err(err) => {
                    warn!(attempt, error = %err, "model call failed");
                }
                Ok(completion) => {
                    let Some(json) = completion.json else {
                        warn!(attempt, "completion carried no JSON payload");
                        continue;
                    };
                    match serde_json::from_value::<StoryGraph>(json) {
                        Err(err) => {
                            warn!(attempt, error = %err, "payload did not parse as a graph");
                        }
                        Ok(graph) => {
                            if let Err(err) = validate(&graph) {
                                warn!(attempt, error = %err, "graph rejected by validator");
                                continue;
                            }
                            if let Err(err) = matches_events(&graph, events) {
                                warn!(attempt, error = %err, "graph does not realize events");
                                continue;
                            }
                            info!(attempt, model = %completion.model, "graph accepted");
                            return Ok(graph);
                        }
                    }
                }
            }
        }

        Err(EngineError::GenerationFailed {
            attempts: max_attempts,
        })
    }
}
