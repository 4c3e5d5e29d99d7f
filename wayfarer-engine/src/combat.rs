//! Combat orchestration: script generation at combat start, then pure
//! local turns.
//!
//! The script call is strictly one-shot — there is no retry loop here.
//! A transport failure or an unusable script surfaces immediately and
//! the combat simply does not start; the player can try again.

use rand::Rng;
use tracing::info;
use wayfarer_core::combat::{CombatAction, CombatScript, CombatState, CombatStatus};
use wayfarer_core::types::{AdventureId, AdventureStatus, EnemyTemplate, UserId};
use wayfarer_llm::{CompletionRequest, ModelPicker};

use crate::adventure::GameEngine;
use crate::compose::compose_combat_script_prompt;
use crate::error::{EngineError, Result};
use crate::ports::{GameStore, StoryModel};

impl<S, M, P> GameEngine<S, M, P>
where
    S: GameStore,
    M: StoryModel,
    P: ModelPicker,
{
    /// Start a combat against the enemy the client took from its combat
    /// node.
    ///
    /// Skills are snapshotted from the permanent character sheet, items
    /// from the adventure's character state, and the whole dialogue bank
    /// is generated in a single model call before the first turn.
    ///
    /// # Errors
    /// `EnemyDataRequired` when the request carries no usable enemy,
    /// `CombatScriptGenerationFailed` when the one-shot script comes
    /// back unusable, plus gateway and storage errors.
    pub async fn start_combat(
        &self,
        uid: &UserId,
        adventure_id: AdventureId,
        enemy: Option<&EnemyTemplate>,
        api_key: &str,
    ) -> Result<CombatState> {
        let mut adventure = self.owned_adventure(uid, adventure_id)?;
        if adventure.status != AdventureStatus::Ongoing {
            return Err(EngineError::BadRequest("adventure is over".to_string()));
        }

        let enemy = match enemy {
            Some(template) if !template.name.trim().is_empty() => template.clone(),
            _ => return Err(EngineError::EnemyDataRequired),
        };

        let character = self.owned_character(uid, adventure.character_id)?;
        let world = self.owned_world(uid, adventure.world_id)?;
        let skills = character.skills.clone();
        let items = adventure.character_state.items.clone();

        let skill_names: Vec<String> = skills.iter().map(|s| s.name.clone()).collect();
        let item_names: Vec<String> = items.iter().map(|i| i.name.clone()).collect();
        let combat = &self.config.game.combat;
        let (system, user) = compose_combat_script_prompt(
            &world.name,
            &character.name,
            &skill_names,
            &item_names,
            &enemy.name,
            &enemy.difficulty.to_string(),
            combat.lines_per_source,
            combat.finisher_lines,
        );

        let pick = self.picker.pick(&self.config.llm.models)?;
        let mut request = CompletionRequest::new(pick.primary, user)
            .with_system(system)
            .expecting_json()
            .with_timeout(self.config.llm.timeout_ms);
        request.max_tokens = self.config.llm.max_tokens;
        request.temperature = self.config.llm.temperature;

        let completion = self.model.generate(api_key, &request).await?;
        let json = completion.json.ok_or_else(|| {
            EngineError::CombatScriptGenerationFailed("completion carried no JSON".to_string())
        })?;
        let script: CombatScript = serde_json::from_value(json)
            .map_err(|e| EngineError::CombatScriptGenerationFailed(e.to_string()))?;
        if !script.has_finishers() {
            return Err(EngineError::CombatScriptGenerationFailed(
                "script carries no finisher lines".to_string(),
            ));
        }

        let state = CombatState::open(
            &character.name,
            skills,
            items,
            &enemy,
            script,
            &self.config.game.combat,
        );
        adventure.combat_state = Some(state.clone());
        adventure.updated_at = chrono::Utc::now();
        self.store.put_adventure(&adventure)?;
        info!(adventure = %adventure.id, enemy = %enemy.name, "combat started");
        Ok(state)
    }

    /// Resolve one combat turn and persist the adventure once.
    ///
    /// A lost battle finishes the adventure and a successful flee
    /// abandons it; a won battle leaves the adventure ongoing. The
    /// terminal combat state stays on the document so the final log
    /// remains readable.
    ///
    /// # Errors
    /// `NoActiveCombat` when no battle is in progress; turn-validity
    /// violations bubble up from the combat engine.
    pub fn combat_turn<R: Rng>(
        &self,
        uid: &UserId,
        adventure_id: AdventureId,
        action: &CombatAction,
        rng: &mut R,
    ) -> Result<CombatState> {
        let mut adventure = self.owned_adventure(uid, adventure_id)?;
        let state = adventure
            .combat_state
            .as_mut()
            .ok_or(EngineError::NoActiveCombat)?;

        state.take_turn(action, &self.config.game.combat, rng)?;
        let snapshot = state.clone();

        match snapshot.status {
            CombatStatus::Fled => adventure.status = AdventureStatus::Fled,
            CombatStatus::Lost => adventure.status = AdventureStatus::Finished,
            CombatStatus::Won | CombatStatus::Ongoing => {}
        }

        adventure.updated_at = chrono::Utc::now();
        self.store.put_adventure(&adventure)?;
        Ok(snapshot)
    }
}
