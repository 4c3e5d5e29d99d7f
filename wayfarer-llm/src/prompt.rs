//! Prompt templates for story-graph and combat-script generation.
//!
//! Every template is a constant with `{key}` placeholders; the engine's
//! composer fills them from domain context. The structural output rules
//! baked into the story templates mirror the graph validator — the model
//! is told exactly the shape the validator will demand.

/// System prompt for story-graph generation.
pub const STORY_SYSTEM: &str = r#"You are the narrator of {world_name}.
World: {world_summary}

You write one batch of adventure beats as a story graph in strict JSON.

OUTPUT RULES — follow these exactly:
- Respond with a single JSON object and nothing else.
- Top level: {"start_node": "start", "nodes": {...}}.
- "nodes" must contain exactly these four keys: "start", "node_2", "node_3", "ending".
- Every node has a "kind" field: one of "scene", "item", "trap", "combat", "ending".
- Every node has a non-empty "situation" string.
- "ending" nodes carry a non-empty "outcome" string and NO choices.
- All other nodes carry a non-empty "choices" array. Each choice has an
  "action" field: "goto" choices carry "text" and "next_node" (which must
  name an existing node); "enter_battle" choices carry only "text".
- "item" nodes carry an "item" object: {"name", "tier", "description"}.
- "trap" nodes carry a "penalty" object: {"stat": "stamina", "value": <negative integer>}.
- "combat" nodes carry an "enemy" object: {"name", "difficulty", "description"}
  and EXACTLY ONE choice, whose action is "enter_battle".
- Choices in "start", "node_2" and "node_3" chain forward so the ending is reachable."#;

/// User prompt for story-graph generation.
pub const STORY_USER: &str = r#"The hero: {character_summary}
The place: {site_summary}
{previous_outcome_block}
Choices made so far, in order:
{history_block}

Write the next four beats. Each numbered instruction below binds one node,
in order — realize each instruction as prose, but do not change what happens:
{event_instructions}
4. The "ending" node closes this batch of beats with a vivid outcome.

Return the JSON object now."#;

/// Instruction clause for an item beat.
pub const EVENT_ITEM_INSTRUCTION: &str = r#"{n}. The "{key}" node must have kind "item": the hero finds a {tier}-tier item. Invent a fitting item and describe the find."#;

/// Instruction clause for a combat beat.
pub const EVENT_COMBAT_INSTRUCTION: &str = r#"{n}. The "{key}" node must have kind "combat": a {difficulty} enemy blocks the way. Invent the enemy. The node's only choice must carry action "enter_battle"."#;

/// Instruction clause for a trap beat.
pub const EVENT_TRAP_INSTRUCTION: &str = r#"{n}. The "{key}" node must have kind "trap": the hero triggers a trap that drains stamina. Pick a penalty value between -5 and -25."#;

/// Instruction clause for an uneventful beat.
pub const EVENT_NOTHING_INSTRUCTION: &str = r#"{n}. The "{key}" node must have kind "scene": an atmospheric beat where nothing of consequence happens."#;

/// System prompt for one-shot combat-script generation.
pub const COMBAT_SCRIPT_SYSTEM: &str = r#"You are the battle narrator of {world_name}.
You pre-write every line a whole battle could need, in one pass, as strict JSON.
Respond with a single JSON object and nothing else."#;

/// User prompt for one-shot combat-script generation.
pub const COMBAT_SCRIPT_USER: &str = r#"{character_name} is about to fight {enemy_name} ({enemy_difficulty}).

Skills:
{skills_block}

Items:
{items_block}

Write a combat script as JSON:
{"skill_dialogues": {"<skill name>": [<exactly {lines_per_source} short action lines>, ...], ...},
 "item_dialogues": {"<item name>": [<exactly {lines_per_source} short action lines>, ...], ...},
 "finishers": [<exactly {finisher_lines} short victory lines>]}

Every listed skill and item must appear as a key. Lines are second-person,
present tense, one sentence each."#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value. Unknown placeholders
/// are left in place.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}
