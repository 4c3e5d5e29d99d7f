//! Story graph model and structural validator.
//!
//! A story graph is one batch of narrative beats generated wholesale per
//! request: a start beat, two mid beats, and an ending, keyed under fixed
//! node names so the orchestrator can check the generated beats against
//! the pre-rolled event sequence.
//!
//! The validator is intentionally strict: a structurally broken graph is
//! unusable by the client state machine, so any violation rejects the
//! whole graph — no partial acceptance, no repair. The orchestrator
//! answers rejection with regeneration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::events::{EventKind, PreRolledEvent};
use crate::types::{EnemyTemplate, ItemTemplate};

/// Fixed key of the graph's entry node.
pub const START_KEY: &str = "start";
/// Fixed key of the graph's terminal node.
pub const ENDING_KEY: &str = "ending";

/// Fixed node key for the beat at `index` (0-based). Beat 0 is the
/// start node; later beats are numbered from 2 to match their position
/// in the four-node graph.
#[must_use]
pub fn beat_key(index: usize) -> String {
    if index == 0 {
        START_KEY.to_string()
    } else {
        format!("node_{}", index + 1)
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A choice offered by a story node, tagged by its action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Choice {
    /// Advance to another node in the graph.
    Goto {
        /// Choice text shown to the player.
        text: String,
        /// Key of the target node. Must exist in the graph.
        next_node: String,
    },
    /// Enter combat. A side-transition out of the graph, so it carries
    /// no target node.
    EnterBattle {
        /// Choice text shown to the player.
        text: String,
    },
}

impl Choice {
    /// The choice text shown to the player.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Goto { text, .. } | Self::EnterBattle { text } => text,
        }
    }
}

/// A story node, tagged by an explicit `kind` with its payload required
/// iff the kind demands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoryNode {
    /// A plain narrative beat.
    Scene {
        /// Narrative text. Must be non-empty.
        situation: String,
        /// Ordered, non-empty list of choices.
        choices: Vec<Choice>,
    },
    /// The hero finds an item here; proceeding into this node grants it.
    Item {
        /// Narrative text. Must be non-empty.
        situation: String,
        /// The item template granted on arrival. Identity is minted at
        /// grant time.
        item: ItemTemplate,
        /// Ordered, non-empty list of choices.
        choices: Vec<Choice>,
    },
    /// A trap; proceeding into this node applies the penalty.
    Trap {
        /// Narrative text. Must be non-empty.
        situation: String,
        /// Stamina penalty, conventionally negative.
        penalty: Penalty,
        /// Ordered, non-empty list of choices.
        choices: Vec<Choice>,
    },
    /// A combat trigger. Its sole valid choice is the combat entry.
    Combat {
        /// Narrative text. Must be non-empty.
        situation: String,
        /// The enemy waiting here.
        enemy: EnemyTemplate,
        /// Must be exactly one [`Choice::EnterBattle`].
        choices: Vec<Choice>,
    },
    /// Terminal node. Carries an outcome and no choices.
    Ending {
        /// Narrative text. Must be non-empty.
        situation: String,
        /// Closing text, fed back as `previous_outcome` on continuation.
        /// Must be non-empty.
        outcome: String,
    },
}

/// A stat penalty applied by a trap node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    /// The affected stat.
    pub stat: PenaltyStat,
    /// Signed delta; traps use negative values.
    pub value: i32,
}

/// Stats a trap penalty can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyStat {
    /// Character stamina.
    Stamina,
}

impl StoryNode {
    /// The node's narrative text.
    #[must_use]
    pub fn situation(&self) -> &str {
        match self {
            Self::Scene { situation, .. }
            | Self::Item { situation, .. }
            | Self::Trap { situation, .. }
            | Self::Combat { situation, .. }
            | Self::Ending { situation, .. } => situation,
        }
    }

    /// The node's choices; `None` for terminal nodes.
    #[must_use]
    pub fn choices(&self) -> Option<&[Choice]> {
        match self {
            Self::Scene { choices, .. }
            | Self::Item { choices, .. }
            | Self::Trap { choices, .. }
            | Self::Combat { choices, .. } => Some(choices),
            Self::Ending { .. } => None,
        }
    }

    /// The serde `kind` tag of this node.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scene { .. } => "scene",
            Self::Item { .. } => "item",
            Self::Trap { .. } => "trap",
            Self::Combat { .. } => "combat",
            Self::Ending { .. } => "ending",
        }
    }

    /// Whether this node is terminal.
    #[must_use]
    pub fn is_ending(&self) -> bool {
        matches!(self, Self::Ending { .. })
    }
}

/// One batch of narrative beats. Replaced wholesale on continuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryGraph {
    /// Key of the entry node. Must exist in `nodes`.
    pub start_node: String,
    /// All nodes, keyed by node name. BTreeMap keeps iteration and
    /// serialization deterministic.
    pub nodes: BTreeMap<String, StoryNode>,
}

impl StoryGraph {
    /// Look up a node by key.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&StoryNode> {
        self.nodes.get(key)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Structural violations that reject a generated graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `start_node` does not key an entry in `nodes`.
    #[error("start node '{0}' is not present in the graph")]
    StartNodeMissing(String),

    /// A node's situation text is empty.
    #[error("node '{0}' has an empty situation")]
    EmptySituation(String),

    /// A terminal node's outcome text is empty.
    #[error("ending node '{0}' has an empty outcome")]
    EmptyOutcome(String),

    /// A non-terminal node has no choices.
    #[error("node '{0}' has no choices")]
    NoChoices(String),

    /// A choice's text is empty.
    #[error("node '{0}' has a choice with empty text")]
    EmptyChoiceText(String),

    /// A choice references a node that does not exist.
    #[error("node '{node}' points at nonexistent node '{target}'")]
    DanglingChoice {
        /// Node carrying the bad choice.
        node: String,
        /// The missing target key.
        target: String,
    },

    /// A combat node's choice set is not exactly one combat entry.
    #[error("combat node '{0}' must have exactly one enter_battle choice")]
    CombatChoiceShape(String),

    /// The graph does not carry the expected number of nodes.
    #[error("graph has {found} nodes, expected {expected}")]
    WrongNodeCount {
        /// Expected node count (beats + ending).
        expected: usize,
        /// Actual node count.
        found: usize,
    },

    /// A beat node is missing or its kind does not realize the
    /// pre-rolled event at its position.
    #[error("beat '{key}' does not realize the pre-rolled event (expected {expected})")]
    BeatMismatch {
        /// The beat's fixed node key.
        key: String,
        /// The node kind the event demands.
        expected: &'static str,
    },
}

/// Validate a graph's structural invariants, in order:
/// the start node exists; every node has a non-empty situation; endings
/// carry a non-empty outcome; non-terminal nodes carry non-empty choices
/// whose texts are non-empty and whose targets exist; combat nodes carry
/// exactly one combat-entry choice.
///
/// # Errors
///
/// Returns the first violation found. Any violation rejects the whole
/// graph.
pub fn validate(graph: &StoryGraph) -> Result<(), GraphError> {
    if !graph.nodes.contains_key(&graph.start_node) {
        return Err(GraphError::StartNodeMissing(graph.start_node.clone()));
    }

    for (key, node) in &graph.nodes {
        if node.situation().trim().is_empty() {
            return Err(GraphError::EmptySituation(key.clone()));
        }

        match node {
            StoryNode::Ending { outcome, .. } => {
                if outcome.trim().is_empty() {
                    return Err(GraphError::EmptyOutcome(key.clone()));
                }
            }
            StoryNode::Combat { choices, .. } => {
                if !matches!(choices.as_slice(), [Choice::EnterBattle { .. }]) {
                    return Err(GraphError::CombatChoiceShape(key.clone()));
                }
                if choices[0].text().trim().is_empty() {
                    return Err(GraphError::EmptyChoiceText(key.clone()));
                }
            }
            StoryNode::Scene { choices, .. }
            | StoryNode::Item { choices, .. }
            | StoryNode::Trap { choices, .. } => {
                if choices.is_empty() {
                    return Err(GraphError::NoChoices(key.clone()));
                }
                for choice in choices {
                    if choice.text().trim().is_empty() {
                        return Err(GraphError::EmptyChoiceText(key.clone()));
                    }
                    if let Choice::Goto { next_node, .. } = choice {
                        if !graph.nodes.contains_key(next_node) {
                            return Err(GraphError::DanglingChoice {
                                node: key.clone(),
                                target: next_node.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Node kind a pre-rolled event demands of its beat.
#[must_use]
pub fn expected_kind(event: &PreRolledEvent) -> &'static str {
    match event.kind {
        EventKind::FindItem => "item",
        EventKind::Trap => "trap",
        EventKind::Nothing => "scene",
        _ => "combat",
    }
}

/// Check that the generated beats realize the pre-rolled event sequence:
/// the graph carries exactly the beats plus an ending under their fixed
/// keys, and each beat's kind matches its event (modulo the
/// `FindItem → Nothing` degrade, already folded into the events).
///
/// # Errors
///
/// Returns the first mismatch. Mismatches are retryable for the
/// orchestrator, like any other rejection.
pub fn matches_events(graph: &StoryGraph, events: &[PreRolledEvent]) -> Result<(), GraphError> {
    let expected_count = events.len() + 1;
    if graph.nodes.len() != expected_count {
        return Err(GraphError::WrongNodeCount {
            expected: expected_count,
            found: graph.nodes.len(),
        });
    }

    for (index, event) in events.iter().enumerate() {
        let key = beat_key(index);
        let expected = expected_kind(event);
        match graph.nodes.get(&key) {
            Some(node) if node.kind_name() == expected => {}
            _ => return Err(GraphError::BeatMismatch { key, expected }),
        }
    }

    match graph.nodes.get(ENDING_KEY) {
        Some(node) if node.is_ending() => Ok(()),
        _ => Err(GraphError::BeatMismatch {
            key: ENDING_KEY.to_string(),
            expected: "ending",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemTier;

    fn goto(text: &str, next: &str) -> Choice {
        Choice::Goto {
            text: text.into(),
            next_node: next.into(),
        }
    }

    fn two_node_graph() -> StoryGraph {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "start".to_string(),
            StoryNode::Scene {
                situation: "A fork in the road.".into(),
                choices: vec![goto("Take the left path", "ending")],
            },
        );
        nodes.insert(
            "ending".to_string(),
            StoryNode::Ending {
                situation: "The road ends at a quiet shrine.".into(),
                outcome: "You rest at the shrine.".into(),
            },
        );
        StoryGraph {
            start_node: "start".into(),
            nodes,
        }
    }

    #[test]
    fn minimal_well_formed_graph_is_accepted() {
        assert_eq!(validate(&two_node_graph()), Ok(()));
    }

    #[test]
    fn missing_start_node_is_rejected() {
        let mut graph = two_node_graph();
        graph.start_node = "elsewhere".into();
        assert!(matches!(
            validate(&graph),
            Err(GraphError::StartNodeMissing(_))
        ));
    }

    #[test]
    fn empty_situation_is_rejected() {
        let mut graph = two_node_graph();
        graph.nodes.insert(
            "ending".into(),
            StoryNode::Ending {
                situation: "  ".into(),
                outcome: "done".into(),
            },
        );
        assert!(matches!(validate(&graph), Err(GraphError::EmptySituation(_))));
    }

    #[test]
    fn empty_outcome_is_rejected() {
        let mut graph = two_node_graph();
        graph.nodes.insert(
            "ending".into(),
            StoryNode::Ending {
                situation: "The end.".into(),
                outcome: String::new(),
            },
        );
        assert!(matches!(validate(&graph), Err(GraphError::EmptyOutcome(_))));
    }

    #[test]
    fn choiceless_intermediate_node_is_rejected() {
        let mut graph = two_node_graph();
        graph.nodes.insert(
            "start".into(),
            StoryNode::Scene {
                situation: "Dead air.".into(),
                choices: vec![],
            },
        );
        assert!(matches!(validate(&graph), Err(GraphError::NoChoices(_))));
    }

    #[test]
    fn dangling_choice_is_rejected() {
        let mut graph = two_node_graph();
        graph.nodes.insert(
            "start".into(),
            StoryNode::Scene {
                situation: "A fork.".into(),
                choices: vec![goto("Walk on", "missing_node")],
            },
        );
        assert!(matches!(
            validate(&graph),
            Err(GraphError::DanglingChoice { .. })
        ));
    }

    #[test]
    fn combat_node_requires_single_battle_entry() {
        let mut graph = two_node_graph();
        graph.nodes.insert(
            "start".into(),
            StoryNode::Combat {
                situation: "A ghoul blocks the way.".into(),
                enemy: EnemyTemplate {
                    name: "Ghoul".into(),
                    difficulty: crate::types::EnemyDifficulty::Normal,
                    description: String::new(),
                },
                choices: vec![goto("Sneak past", "ending")],
            },
        );
        assert!(matches!(
            validate(&graph),
            Err(GraphError::CombatChoiceShape(_))
        ));
    }

    #[test]
    fn node_kind_round_trips_through_serde_tag() {
        let node = StoryNode::Item {
            situation: "A glint in the rubble.".into(),
            item: ItemTemplate {
                name: "Chipped Dagger".into(),
                tier: ItemTier::Common,
                description: String::new(),
            },
            choices: vec![goto("Pocket it", "ending")],
        };
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["kind"], "item");
        let back: StoryNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, node);
    }

    #[test]
    fn beat_keys_are_stable() {
        assert_eq!(beat_key(0), "start");
        assert_eq!(beat_key(1), "node_2");
        assert_eq!(beat_key(2), "node_3");
    }
}
