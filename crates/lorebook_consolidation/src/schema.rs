//! Structured-output schemas sent with every request.
//!
//! Gemini accepts an OpenAPI subset: upper-case type names, `enum` on
//! strings, no `$ref`. Every property is optional; the reply models in
//! [`crate::payload`] default whatever is missing.

use lorebook_core::AgeBracket;
use once_cell::sync::Lazy;
use serde_json::{Value, json};

const ROLE_LABELS: &[&str] = &["primary", "secondary", "supporting", "extra"];
const STRUCTURE_LABELS: &[&str] = &["interior", "exterior"];
const SCENE_TYPE_LABELS: &[&str] = &["core-location", "plot-node", "transition"];

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn one_of(labels: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": labels })
}

/// Weapon shape.
pub fn weapon_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": string(),
            "description": string(),
        },
        "required": ["name"],
    })
}

/// Clothing style shape.
pub fn clothing_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": string(),
            "phase": string(),
            "description": string(),
        },
        "required": ["name"],
    })
}

/// Character shape, with the closed age and role vocabularies.
pub fn character_schema() -> Value {
    let ages: Vec<&str> = AgeBracket::ALL.iter().map(|a| a.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "id": string(),
            "groupName": string(),
            "name": string(),
            "aliases": string_list(),
            "role": one_of(ROLE_LABELS),
            "age": one_of(&ages),
            "description": string(),
            "visualMemoryPoints": string(),
            "clothingStyles": { "type": "ARRAY", "items": clothing_schema() },
            "weapons": { "type": "ARRAY", "items": weapon_schema() },
        },
        "required": ["groupName", "name"],
    })
}

/// Scene shape.
pub fn scene_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": string(),
            "groupName": string(),
            "name": string(),
            "aliases": string_list(),
            "description": string(),
            "structure": one_of(STRUCTURE_LABELS),
            "atmosphere": string(),
            "style": string(),
            "type": one_of(SCENE_TYPE_LABELS),
            "frequency": { "type": "INTEGER" },
        },
        "required": ["groupName", "name"],
    })
}

/// Reply shape of extraction and enrichment calls.
pub static EXTRACTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "characters": { "type": "ARRAY", "items": character_schema() },
            "scenes": { "type": "ARRAY", "items": scene_schema() },
        },
        "required": ["characters", "scenes"],
    })
});

/// Reply shape of an assisted character merge.
pub static CHARACTER_SCHEMA: Lazy<Value> = Lazy::new(character_schema);
