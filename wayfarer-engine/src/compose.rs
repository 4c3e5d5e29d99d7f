//! Prompt composition: domain context in, (system, user) prompt pair out.
//!
//! Pure string assembly over the templates in `wayfarer_llm::prompt`.
//! Each pre-rolled event becomes a numbered instruction clause that binds
//! one fixed node key, so the generated graph can be checked against the
//! event sequence after parsing.

use wayfarer_core::events::{EventKind, PreRolledEvent};
use wayfarer_core::graph::beat_key;
use wayfarer_core::types::{CharacterSheet, Site, WorldRecord};
use wayfarer_llm::prompt::{
    COMBAT_SCRIPT_SYSTEM, COMBAT_SCRIPT_USER, EVENT_COMBAT_INSTRUCTION, EVENT_ITEM_INSTRUCTION,
    EVENT_NOTHING_INSTRUCTION, EVENT_TRAP_INSTRUCTION, STORY_SYSTEM, STORY_USER, render_template,
};

/// The instruction clause binding the beat at `index` to its event.
#[must_use]
pub fn event_instruction(index: usize, event: &PreRolledEvent) -> String {
    let n = (index + 1).to_string();
    let key = beat_key(index);
    match event.kind {
        EventKind::FindItem => {
            let tier = event
                .item_tier
                .map_or_else(|| "common".to_string(), |t| t.to_string());
            render_template(
                EVENT_ITEM_INSTRUCTION,
                &[("n", &n), ("key", &key), ("tier", &tier)],
            )
        }
        EventKind::Trap => render_template(EVENT_TRAP_INSTRUCTION, &[("n", &n), ("key", &key)]),
        EventKind::Nothing => {
            render_template(EVENT_NOTHING_INSTRUCTION, &[("n", &n), ("key", &key)])
        }
        kind => {
            let difficulty = kind
                .enemy_difficulty()
                .map_or_else(|| "normal".to_string(), |d| d.to_string());
            render_template(
                EVENT_COMBAT_INSTRUCTION,
                &[("n", &n), ("key", &key), ("difficulty", &difficulty)],
            )
        }
    }
}

/// Compose the (system, user) prompt pair for story-graph generation.
#[must_use]
pub fn compose_story_prompt(
    world: &WorldRecord,
    character: &CharacterSheet,
    site: &Site,
    previous_outcome: Option<&str>,
    events: &[PreRolledEvent],
    history: &[String],
) -> (String, String) {
    let system = render_template(
        STORY_SYSTEM,
        &[
            ("world_name", &world.name),
            ("world_summary", &world.summary),
        ],
    );

    let previous_outcome_block = match previous_outcome {
        Some(outcome) => format!("Previously: {outcome}"),
        None => "This is the start of the adventure.".to_string(),
    };

    let history_block = if history.is_empty() {
        "(none yet)".to_string()
    } else {
        history
            .iter()
            .map(|choice| format!("- {choice}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let event_instructions = events
        .iter()
        .enumerate()
        .map(|(index, event)| event_instruction(index, event))
        .collect::<Vec<_>>()
        .join("\n");

    let user = render_template(
        STORY_USER,
        &[
            ("character_summary", &character.summary),
            ("site_summary", &site.summary),
            ("previous_outcome_block", &previous_outcome_block),
            ("history_block", &history_block),
            ("event_instructions", &event_instructions),
        ],
    );

    (system, user)
}

/// Compose the (system, user) prompt pair for one-shot combat-script
/// generation.
#[must_use]
pub fn compose_combat_script_prompt(
    world_name: &str,
    character_name: &str,
    skills: &[String],
    items: &[String],
    enemy_name: &str,
    enemy_difficulty: &str,
    lines_per_source: u32,
    finisher_lines: u32,
) -> (String, String) {
    let system = render_template(COMBAT_SCRIPT_SYSTEM, &[("world_name", world_name)]);

    let bullet_list = |names: &[String]| {
        if names.is_empty() {
            "(none)".to_string()
        } else {
            names
                .iter()
                .map(|name| format!("- {name}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    let user = render_template(
        COMBAT_SCRIPT_USER,
        &[
            ("character_name", character_name),
            ("enemy_name", enemy_name),
            ("enemy_difficulty", enemy_difficulty),
            ("skills_block", &bullet_list(skills)),
            ("items_block", &bullet_list(items)),
            ("lines_per_source", &lines_per_source.to_string()),
            ("finisher_lines", &finisher_lines.to_string()),
        ],
    );

    (system, user)
}
