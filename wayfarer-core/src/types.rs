//! Core type definitions for the Wayfarer adventure system.
//!
//! All types are serializable; persisted documents are JSON blobs, so
//! every shape here is also a storage shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::combat::CombatState;
use crate::graph::StoryGraph;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Opaque user identifier handed to us by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a player character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new random character ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub Uuid);

impl WorldId {
    /// Create a new random world ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorldId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for an adventure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdventureId(pub Uuid);

impl AdventureId {
    /// Create a new random adventure ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AdventureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AdventureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Difficulty & Item Tiers
// ---------------------------------------------------------------------------

/// Site difficulty tier. Determines event-type weights and item-tier
/// weights during pre-rolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    /// Gentle introduction — frequent finds, weak enemies.
    Easy,
    /// Baseline distribution.
    Normal,
    /// Fewer finds, harder enemies.
    Hard,
    /// Miniboss territory.
    Extreme,
    /// Almost everything wants the hero dead.
    Impossible,
}

impl DifficultyTier {
    /// All difficulty tiers, in ascending order.
    #[must_use]
    pub fn all() -> &'static [DifficultyTier] {
        &[
            Self::Easy,
            Self::Normal,
            Self::Hard,
            Self::Extreme,
            Self::Impossible,
        ]
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
            Self::Impossible => "impossible",
        };
        write!(f, "{name}")
    }
}

/// Rarity tier of a found item. Seven tiers, weighted per difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTier {
    /// Barely worth picking up.
    Junk,
    /// Everyday gear.
    Common,
    /// A cut above.
    Uncommon,
    /// Genuinely hard to come by.
    Rare,
    /// The stuff of local legends.
    Epic,
    /// The stuff of regional legends.
    Legendary,
    /// One-of-a-kind.
    Mythic,
}

impl ItemTier {
    /// All item tiers, in ascending rarity order.
    #[must_use]
    pub fn all() -> &'static [ItemTier] {
        &[
            Self::Junk,
            Self::Common,
            Self::Uncommon,
            Self::Rare,
            Self::Epic,
            Self::Legendary,
            Self::Mythic,
        ]
    }
}

impl fmt::Display for ItemTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Junk => "junk",
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
            Self::Mythic => "mythic",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Items & Skills
// ---------------------------------------------------------------------------

/// An item as authored inside a story node. Templates carry no identity:
/// the same template may be reached in different playthroughs, and each
/// grant mints a fresh [`Item`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Display name.
    pub name: String,
    /// Rarity tier.
    pub tier: ItemTier,
    /// Short flavor description.
    #[serde(default)]
    pub description: String,
}

impl ItemTemplate {
    /// Mint an owned item from this template. Identity is assigned here,
    /// at grant time, never at authoring time.
    #[must_use]
    pub fn grant(&self) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            tier: self.tier,
            description: self.description.clone(),
        }
    }
}

/// An owned item in a character's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Grant-time identity, unique per grant.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Rarity tier.
    pub tier: ItemTier,
    /// Short flavor description.
    #[serde(default)]
    pub description: String,
}

/// A character skill usable in combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name; also the key into the combat dialogue bank.
    pub name: String,
    /// Short flavor description.
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Enemies
// ---------------------------------------------------------------------------

/// Difficulty band of an enemy encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyDifficulty {
    /// Pushover.
    Easy,
    /// Fair fight.
    Normal,
    /// Dangerous.
    Hard,
    /// Site miniboss.
    Miniboss,
}

impl fmt::Display for EnemyDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Miniboss => "miniboss",
        };
        write!(f, "{name}")
    }
}

/// An enemy as authored inside a combat story node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Display name.
    pub name: String,
    /// Difficulty band; keys the enemy-attack flavor tables.
    pub difficulty: EnemyDifficulty,
    /// Short flavor description.
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Characters & Worlds
// ---------------------------------------------------------------------------

/// A player character as persisted in the character collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSheet {
    /// Character identity.
    pub id: CharacterId,
    /// Owning user.
    pub owner_uid: UserId,
    /// Display name.
    pub name: String,
    /// One-paragraph summary fed to the prompt composer.
    pub summary: String,
    /// Equipped skills, snapshotted at combat start.
    pub skills: Vec<Skill>,
    /// Permanent item collection. Grants append here.
    pub items: Vec<Item>,
}

/// A named location within a world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Site name; the key used by `StartAdventure`.
    pub name: String,
    /// One-paragraph summary fed to the prompt composer.
    pub summary: String,
    /// Difficulty tier used for event pre-rolling.
    pub difficulty: DifficultyTier,
}

/// A world as persisted in the world collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldRecord {
    /// World identity.
    pub id: WorldId,
    /// Owning user.
    pub owner_uid: UserId,
    /// Display name.
    pub name: String,
    /// One-paragraph summary fed to the prompt composer.
    pub summary: String,
    /// Adventure sites available in this world.
    pub sites: Vec<Site>,
}

impl WorldRecord {
    /// Look up a site by name.
    #[must_use]
    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name == name)
    }
}

// ---------------------------------------------------------------------------
// Character State
// ---------------------------------------------------------------------------

/// Maximum stamina a character can hold.
pub const MAX_STAMINA: u32 = 100;

/// Mutable per-adventure snapshot of a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterState {
    /// Stamina, clamped to `0..=MAX_STAMINA`. Zero is a hard stop for
    /// further story generation.
    pub stamina: u32,
    /// Items held during this adventure, including grants made along
    /// the way.
    pub items: Vec<Item>,
}

impl CharacterState {
    /// Fresh state at full stamina with the character's current items.
    #[must_use]
    pub fn fresh(items: Vec<Item>) -> Self {
        Self {
            stamina: MAX_STAMINA,
            items,
        }
    }

    /// Apply a stamina delta, clamping to `0..=MAX_STAMINA`. Trap
    /// penalties are conventionally negative.
    pub fn apply_stamina(&mut self, delta: i32) {
        let next = i64::from(self.stamina) + i64::from(delta);
        self.stamina = next.clamp(0, i64::from(MAX_STAMINA)) as u32;
    }

    /// Whether the character can still push on.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.stamina == 0
    }
}

// ---------------------------------------------------------------------------
// Adventure
// ---------------------------------------------------------------------------

/// Lifecycle status of an adventure. `Finished` and `Fled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdventureStatus {
    /// The adventure accepts further operations.
    Ongoing,
    /// Completed (or stamina ran out).
    Finished,
    /// Abandoned by fleeing.
    Fled,
}

/// A persistent adventure: one character, one world site, one current
/// story graph. Exactly one ongoing adventure exists per character —
/// enforced by the orchestrator, not the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adventure {
    /// Adventure identity.
    pub id: AdventureId,
    /// Owning user.
    pub owner_uid: UserId,
    /// The character playing this adventure.
    pub character_id: CharacterId,
    /// The world the site belongs to.
    pub world_id: WorldId,
    /// The site being explored.
    pub site_name: String,
    /// Lifecycle status.
    pub status: AdventureStatus,
    /// Mutable character snapshot.
    pub character_state: CharacterState,
    /// Append-only chronological list of chosen choice texts.
    pub history: Vec<String>,
    /// Current story graph; replaced wholesale on continuation.
    pub story_graph: StoryGraph,
    /// Pointer into `story_graph.nodes`.
    pub current_node_key: String,
    /// Present only while a combat is active.
    #[serde(default)]
    pub combat_state: Option<CombatState>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, stamped on every mutation.
    pub updated_at: DateTime<Utc>,
}
