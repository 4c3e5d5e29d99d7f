//! Wayfarer benchmark suite.
//!
//! Everything between model calls must be effectively free next to
//! network latency. Working targets:
//!   event_preroll_sequence_of_3 ...... < 2μs
//!   graph_validation_4_nodes ......... < 5μs
//!   graph_event_correspondence ....... < 2μs
//!   combat_turn_skill ................ < 10μs

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

use wayfarer_core::combat::{CombatAction, CombatScript, CombatState};
use wayfarer_core::config::CombatConfig;
use wayfarer_core::events::{EventKind, PreRolledEvent, pre_roll_sequence};
use wayfarer_core::graph::{
    Choice, Penalty, PenaltyStat, StoryGraph, StoryNode, matches_events, validate,
};
use wayfarer_core::types::{
    DifficultyTier, EnemyDifficulty, EnemyTemplate, ItemTemplate, ItemTier, Skill,
};

fn goto(text: &str, next: &str) -> Choice {
    Choice::Goto {
        text: text.into(),
        next_node: next.into(),
    }
}

fn four_node_graph() -> StoryGraph {
    let mut nodes = BTreeMap::new();
    nodes.insert(
        "start".to_string(),
        StoryNode::Item {
            situation: "A glint in the rubble catches your eye.".into(),
            item: ItemTemplate {
                name: "Tide-worn Idol".into(),
                tier: ItemTier::Rare,
                description: "Cold to the touch.".into(),
            },
            choices: vec![goto("Pocket it and move on", "node_2")],
        },
    );
    nodes.insert(
        "node_2".to_string(),
        StoryNode::Trap {
            situation: "A tripwire sings under your boot.".into(),
            penalty: Penalty {
                stat: PenaltyStat::Stamina,
                value: -12,
            },
            choices: vec![goto("Limp onward", "node_3")],
        },
    );
    nodes.insert(
        "node_3".to_string(),
        StoryNode::Combat {
            situation: "A ghoul rises from the silt.".into(),
            enemy: EnemyTemplate {
                name: "Marsh Ghoul".into(),
                difficulty: EnemyDifficulty::Hard,
                description: "Dripping and patient.".into(),
            },
            choices: vec![Choice::EnterBattle {
                text: "Stand and fight".into(),
            }],
        },
    );
    nodes.insert(
        "ending".to_string(),
        StoryNode::Ending {
            situation: "The way opens into quiet air.".into(),
            outcome: "You slip back out with your prize.".into(),
        },
    );
    StoryGraph {
        start_node: "start".into(),
        nodes,
    }
}

fn staged_combat() -> CombatState {
    let mut skill_dialogues = BTreeMap::new();
    skill_dialogues.insert(
        "Tidecall".to_string(),
        (0..5)
            .map(|i| format!("You pull the water in, harder each time ({i})."))
            .collect(),
    );
    let script = CombatScript {
        skill_dialogues,
        item_dialogues: BTreeMap::new(),
        finishers: vec!["The ghoul collapses into the silt.".into()],
    };
    CombatState::open(
        "Maren",
        vec![Skill {
            name: "Tidecall".into(),
            description: String::new(),
        }],
        vec![],
        &EnemyTemplate {
            name: "Marsh Ghoul".into(),
            difficulty: EnemyDifficulty::Hard,
            description: String::new(),
        },
        script,
        &CombatConfig::default(),
    )
}

/// Benchmark: pre-rolling one graph's worth of events (target: < 2μs).
fn bench_event_preroll(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(99);
    c.bench_function("event_preroll_sequence_of_3", |b| {
        b.iter(|| {
            let events = pre_roll_sequence(black_box(DifficultyTier::Hard), 3, &mut rng);
            black_box(events);
        });
    });
}

/// Benchmark: structural validation of a full graph (target: < 5μs).
fn bench_graph_validation(c: &mut Criterion) {
    let graph = four_node_graph();
    c.bench_function("graph_validation_4_nodes", |b| {
        b.iter(|| {
            let result = validate(black_box(&graph));
            black_box(result)
        });
    });
}

/// Benchmark: checking beats against pre-rolled events (target: < 2μs).
fn bench_event_correspondence(c: &mut Criterion) {
    let graph = four_node_graph();
    // A fixed sequence matching the graph above: item, trap, combat.
    let events = vec![
        PreRolledEvent {
            kind: EventKind::FindItem,
            item_tier: Some(ItemTier::Rare),
            reason: None,
        },
        PreRolledEvent {
            kind: EventKind::Trap,
            item_tier: None,
            reason: None,
        },
        PreRolledEvent {
            kind: EventKind::EnemyHard,
            item_tier: None,
            reason: None,
        },
    ];
    c.bench_function("graph_event_correspondence", |b| {
        b.iter(|| {
            let result = matches_events(black_box(&graph), black_box(&events));
            black_box(result)
        });
    });
}

/// Benchmark: one full skill turn against a fresh combat (target: < 10μs).
fn bench_combat_turn(c: &mut Criterion) {
    let config = CombatConfig::default();
    let template = staged_combat();
    let action = CombatAction::Skill {
        id: "Tidecall".into(),
    };
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("combat_turn_skill", |b| {
        b.iter(|| {
            let mut combat = template.clone();
            combat
                .take_turn(black_box(&action), &config, &mut rng)
                .expect("player turn is legal");
            black_box(combat);
        });
    });
}

criterion_group!(
    benches,
    bench_event_preroll,
    bench_graph_validation,
    bench_event_correspondence,
    bench_combat_turn
);
criterion_main!(benches);
