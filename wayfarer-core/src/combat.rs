//! Turn-based combat state machine.
//!
//! Combat runs on a pre-generated bank of flavor lines (the combat
//! script) produced by a single model call at combat start. Every turn
//! after that is pure local state: a flee roll or a skill/item action,
//! a severity bucket draw, fixed damage-flavor lines, then the enemy's
//! counter. All lines produced by one turn are appended to the log
//! atomically, and the caller persists once per turn.
//!
//! Health is numeric on both sides; a side reaching zero transitions
//! the status to `Won` or `Lost`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::CombatConfig;
use crate::error::{CoreError, Result};
use crate::types::{EnemyDifficulty, EnemyTemplate, Item, Skill};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle status of a combat. Anything but `Ongoing` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    /// Turns are accepted.
    Ongoing,
    /// The enemy fell.
    Won,
    /// The player fell.
    Lost,
    /// The player got away.
    Fled,
}

/// Whose action is legal next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOwner {
    /// The player acts.
    Player,
    /// The enemy acts.
    Enemy,
}

/// The player's combat snapshot, frozen at combat start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: u32,
    /// Skills available this combat.
    pub skills: Vec<Skill>,
    /// Items available this combat.
    pub items: Vec<Item>,
}

/// The enemy's combat state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyCombatant {
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: u32,
    /// Difficulty band; keys the attack flavor table.
    pub difficulty: EnemyDifficulty,
}

/// The one-shot pre-generated bank of flavor lines for a combat.
/// Generated once at combat start, immutable for the combat's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatScript {
    /// Dialogue lines per skill name.
    #[serde(default)]
    pub skill_dialogues: BTreeMap<String, Vec<String>>,
    /// Dialogue lines per item name.
    #[serde(default)]
    pub item_dialogues: BTreeMap<String, Vec<String>>,
    /// Closing lines for a won combat. Required — a script without
    /// finishers is a generation failure.
    #[serde(default)]
    pub finishers: Vec<String>,
}

impl CombatScript {
    /// Whether the script carries the required finisher bank.
    #[must_use]
    pub fn has_finishers(&self) -> bool {
        !self.finishers.is_empty()
    }
}

/// Full state of one combat encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Lifecycle status.
    pub status: CombatStatus,
    /// Player snapshot.
    pub player: Combatant,
    /// Enemy state.
    pub enemy: EnemyCombatant,
    /// Whose action is legal next.
    pub turn: TurnOwner,
    /// Ordered battle log. Appended atomically per turn.
    pub log: Vec<String>,
    /// Pre-generated flavor bank.
    pub script: CombatScript,
}

/// A player action submitted for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatAction {
    /// Attempt to run. Success ends the battle immediately.
    Flee,
    /// Use a skill from the combat snapshot.
    Skill {
        /// Skill name as carried in the snapshot.
        id: String,
    },
    /// Use an item from the combat snapshot.
    Item {
        /// Item name as carried in the snapshot.
        id: String,
    },
}

/// Damage-severity bucket selected by a uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Glancing.
    Low,
    /// Solid.
    Mid,
    /// Devastating.
    High,
}

// ---------------------------------------------------------------------------
// Flavor tables
// ---------------------------------------------------------------------------

fn skill_damage_line(source: &str, enemy: &str, severity: Severity) -> String {
    match severity {
        Severity::Low => format!("{source} grazes {enemy} — barely a scratch."),
        Severity::Mid => format!("{source} lands solidly; {enemy} staggers back."),
        Severity::High => format!("{source} strikes true. {enemy} reels, badly hurt."),
    }
}

fn item_damage_line(source: &str, enemy: &str, severity: Severity) -> String {
    match severity {
        Severity::Low => format!("The {source} sputters; {enemy} shrugs it off."),
        Severity::Mid => format!("The {source} does its work — {enemy} flinches hard."),
        Severity::High => format!("The {source} unleashes everything it has. {enemy} howls."),
    }
}

fn enemy_attack_line(enemy: &str, difficulty: EnemyDifficulty, severity: Severity) -> String {
    match (difficulty, severity) {
        (EnemyDifficulty::Easy, Severity::Low) => {
            format!("{enemy} swipes clumsily and barely connects.")
        }
        (EnemyDifficulty::Easy, Severity::Mid) => {
            format!("{enemy} lands an awkward but real hit.")
        }
        (EnemyDifficulty::Easy, Severity::High) => {
            format!("{enemy} gets lucky — that one hurt.")
        }
        (EnemyDifficulty::Normal, Severity::Low) => {
            format!("{enemy} probes your guard with a quick jab.")
        }
        (EnemyDifficulty::Normal, Severity::Mid) => {
            format!("{enemy} strikes with practiced force.")
        }
        (EnemyDifficulty::Normal, Severity::High) => {
            format!("{enemy} finds the gap in your defense.")
        }
        (EnemyDifficulty::Hard, Severity::Low) => {
            format!("{enemy} toys with you, drawing a thin line of blood.")
        }
        (EnemyDifficulty::Hard, Severity::Mid) => {
            format!("{enemy} hammers through your guard.")
        }
        (EnemyDifficulty::Hard, Severity::High) => {
            format!("{enemy} unleashes a brutal assault — the world tilts.")
        }
        (EnemyDifficulty::Miniboss, Severity::Low) => {
            format!("{enemy} swats at you almost dismissively. It still hurts.")
        }
        (EnemyDifficulty::Miniboss, Severity::Mid) => {
            format!("{enemy} crashes into you with terrible weight.")
        }
        (EnemyDifficulty::Miniboss, Severity::High) => {
            format!("{enemy} strikes like a falling tower. Everything goes white.")
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

impl CombatState {
    /// Open a new combat: player snapshot vs. enemy, player to act,
    /// intro line in the log.
    #[must_use]
    pub fn open(
        player_name: &str,
        skills: Vec<Skill>,
        items: Vec<Item>,
        enemy: &EnemyTemplate,
        script: CombatScript,
        config: &CombatConfig,
    ) -> Self {
        let intro = format!(
            "{} stands against {} ({}). The battle begins.",
            player_name, enemy.name, enemy.difficulty
        );
        Self {
            status: CombatStatus::Ongoing,
            player: Combatant {
                name: player_name.to_string(),
                health: config.starting_health,
                skills,
                items,
            },
            enemy: EnemyCombatant {
                name: enemy.name.clone(),
                health: config.starting_health,
                difficulty: enemy.difficulty,
            },
            turn: TurnOwner::Player,
            log: vec![intro],
            script,
        }
    }

    /// Advance the combat by one player action, then the enemy's counter
    /// unless the battle ended first.
    ///
    /// All lines produced by the turn are appended to the log together,
    /// in order: player action line(s), then the enemy line if the enemy
    /// acted. The caller persists the state once afterwards.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTurn`] if the combat is over or it is not the
    /// player's turn — the log is not mutated. [`CoreError::ActionSourceNotFound`]
    /// if a skill/item action names a source missing from the snapshot.
    pub fn take_turn<R: Rng>(
        &mut self,
        action: &CombatAction,
        config: &CombatConfig,
        rng: &mut R,
    ) -> Result<()> {
        if self.status != CombatStatus::Ongoing || self.turn != TurnOwner::Player {
            return Err(CoreError::InvalidTurn {
                status: self.status,
                turn: self.turn,
            });
        }

        let mut lines: Vec<String> = Vec::new();
        let mut battle_over = false;

        match action {
            CombatAction::Flee => {
                if rng.gen_bool(config.flee_chance) {
                    lines.push(format!(
                        "{} breaks away and escapes into the dark.",
                        self.player.name
                    ));
                    self.status = CombatStatus::Fled;
                    battle_over = true;
                } else {
                    lines.push(format!(
                        "{} tries to flee, but {} cuts off the escape.",
                        self.player.name, self.enemy.name
                    ));
                }
            }
            CombatAction::Skill { id } => {
                let source = self
                    .player
                    .skills
                    .iter()
                    .find(|s| s.name == *id)
                    .ok_or_else(|| CoreError::ActionSourceNotFound(id.clone()))?
                    .name
                    .clone();
                lines.push(pick_line(&self.script.skill_dialogues, &source, rng));

                let severity = roll_severity(config, rng);
                lines.push(skill_damage_line(&source, &self.enemy.name, severity));
                battle_over = self.apply_player_damage(severity, config, &mut lines, rng);
            }
            CombatAction::Item { id } => {
                let source = self
                    .player
                    .items
                    .iter()
                    .find(|i| i.name == *id)
                    .ok_or_else(|| CoreError::ActionSourceNotFound(id.clone()))?
                    .name
                    .clone();
                lines.push(pick_line(&self.script.item_dialogues, &source, rng));

                let severity = roll_severity(config, rng);
                lines.push(item_damage_line(&source, &self.enemy.name, severity));
                battle_over = self.apply_player_damage(severity, config, &mut lines, rng);
            }
        }

        if !battle_over {
            let severity = roll_severity(config, rng);
            lines.push(enemy_attack_line(
                &self.enemy.name,
                self.enemy.difficulty,
                severity,
            ));
            self.player.health = self.player.health.saturating_sub(damage_for(config, severity));
            if self.player.health == 0 {
                lines.push(format!("{} falls. The battle is lost.", self.player.name));
                self.status = CombatStatus::Lost;
            }
        }

        debug!(
            status = ?self.status,
            lines = lines.len(),
            player_health = self.player.health,
            enemy_health = self.enemy.health,
            "combat turn resolved"
        );
        self.log.append(&mut lines);
        Ok(())
    }

    /// Apply the player's hit to the enemy. Returns `true` if the battle
    /// ended (enemy down), appending the finisher line.
    fn apply_player_damage<R: Rng>(
        &mut self,
        severity: Severity,
        config: &CombatConfig,
        lines: &mut Vec<String>,
        rng: &mut R,
    ) -> bool {
        self.enemy.health = self.enemy.health.saturating_sub(damage_for(config, severity));
        if self.enemy.health == 0 {
            if let Some(finisher) = choose(&self.script.finishers, rng) {
                lines.push(finisher.clone());
            }
            lines.push(format!("{} is defeated.", self.enemy.name));
            self.status = CombatStatus::Won;
            return true;
        }
        false
    }

    /// Coarse health label for display.
    #[must_use]
    pub fn player_health_state(&self) -> &'static str {
        health_label(self.player.health)
    }

    /// Coarse enemy health label for display.
    #[must_use]
    pub fn enemy_health_state(&self) -> &'static str {
        health_label(self.enemy.health)
    }
}

fn health_label(health: u32) -> &'static str {
    match health {
        0 => "down",
        1..=25 => "critical",
        26..=60 => "wounded",
        61..=90 => "bruised",
        _ => "unscathed",
    }
}

/// Independent three-bucket severity roll against the configured
/// thresholds.
fn roll_severity<R: Rng>(config: &CombatConfig, rng: &mut R) -> Severity {
    let roll: f64 = rng.r#gen();
    if roll < config.severity_low {
        Severity::Low
    } else if roll > config.severity_high {
        Severity::High
    } else {
        Severity::Mid
    }
}

fn damage_for(config: &CombatConfig, severity: Severity) -> u32 {
    match severity {
        Severity::Low => config.damage_low,
        Severity::Mid => config.damage_mid,
        Severity::High => config.damage_high,
    }
}

fn choose<'a, R: Rng>(lines: &'a [String], rng: &mut R) -> Option<&'a String> {
    if lines.is_empty() {
        None
    } else {
        Some(&lines[rng.gen_range(0..lines.len())])
    }
}

/// One random line from the bank for `source`. The bank is generated
/// from the same snapshot the combat runs on, so a miss means the model
/// under-delivered — fall back to a neutral line rather than failing
/// the turn.
fn pick_line<R: Rng>(bank: &BTreeMap<String, Vec<String>>, source: &str, rng: &mut R) -> String {
    bank.get(source)
        .and_then(|lines| choose(lines, rng))
        .cloned()
        .unwrap_or_else(|| format!("{source} is brought to bear."))
}
