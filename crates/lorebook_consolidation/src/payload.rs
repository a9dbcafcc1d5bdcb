//! JSON models for extraction replies.
//!
//! These models describe what the service sends back, which is looser than
//! the canonical records in `lorebook_core`: every field may be missing,
//! null, or of the wrong scalar type. Conversion into canonical records
//! applies the defaulting rules in one place.

use crate::merge::{merge_aliases, merge_clothing, merge_weapons};
use crate::normalize::normalize_age;
use lorebook_core::{
    Character, CharacterRole, ClothingStyle, EntitySet, Scene, SceneStructure, SceneType, Weapon,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Accept a string, number or boolean as text; anything else becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => String::new(),
    })
}

/// Accept an array of strings, or a single comma-separated string.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(text) => text
            .split([',', '，', '、'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// Accept a list of objects; items that are not objects are dropped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Accept a non-negative integer given as a number or a numeric string.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Weapon as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWeapon {
    /// Weapon name
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Weapon description
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// Clothing style as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawClothingStyle {
    /// Outfit name
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Story phase the outfit belongs to
    #[serde(deserialize_with = "lenient_string")]
    pub phase: String,
    /// Outfit description
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// Character as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCharacter {
    /// Existing id, present on enrichment and merge replies
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Identity group
    #[serde(alias = "group", deserialize_with = "lenient_string")]
    pub group_name: String,
    /// Display name
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Alternate names
    #[serde(deserialize_with = "lenient_string_list")]
    pub aliases: Vec<String>,
    /// Free-form role label
    #[serde(deserialize_with = "lenient_string")]
    pub role: String,
    /// Free-form age text
    #[serde(deserialize_with = "lenient_string")]
    pub age: String,
    /// Narrative description
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// Distinctive visual traits
    #[serde(alias = "visualMemory", deserialize_with = "lenient_string")]
    pub visual_memory_points: String,
    /// Outfits by story phase
    #[serde(alias = "clothing", deserialize_with = "lenient_list")]
    pub clothing_styles: Vec<RawClothingStyle>,
    /// Carried weapons
    #[serde(deserialize_with = "lenient_list")]
    pub weapons: Vec<RawWeapon>,
}

/// Scene as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawScene {
    /// Existing id, present on enrichment replies
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Location group
    #[serde(alias = "group", deserialize_with = "lenient_string")]
    pub group_name: String,
    /// Sub-area name
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Alternate names
    #[serde(deserialize_with = "lenient_string_list")]
    pub aliases: Vec<String>,
    /// Visual description
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// Free-form structure label
    #[serde(deserialize_with = "lenient_string")]
    pub structure: String,
    /// Mood and lighting
    #[serde(deserialize_with = "lenient_string")]
    pub atmosphere: String,
    /// Architectural or art style
    #[serde(deserialize_with = "lenient_string")]
    pub style: String,
    /// Free-form scene type label
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub scene_type: String,
    /// Appearance count reported for this chunk
    #[serde(deserialize_with = "lenient_count")]
    pub frequency: u32,
}

/// Top-level reply shape for extraction and enrichment calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPayload {
    /// Characters found
    #[serde(deserialize_with = "lenient_list")]
    pub characters: Vec<RawCharacter>,
    /// Scenes found
    #[serde(deserialize_with = "lenient_list")]
    pub scenes: Vec<RawScene>,
}

impl ExtractionPayload {
    /// True when the reply named no entity at all.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.scenes.is_empty()
    }

    /// Convert every entity, numbering placeholders by `chunk_index`.
    pub fn into_entity_set(self, chunk_index: usize) -> EntitySet {
        let characters = self
            .characters
            .into_iter()
            .enumerate()
            .map(|(pos, raw)| raw.into_character(chunk_index, pos))
            .collect();
        let scenes = self
            .scenes
            .into_iter()
            .enumerate()
            .map(|(pos, raw)| raw.into_scene(chunk_index, pos))
            .collect();
        EntitySet::new(characters, scenes)
    }
}

/// Fill a missing group from the name and vice versa.
///
/// Only when both are blank does the record get the placeholder
/// `unnamed-{chunk}-{pos}` for both.
fn resolve_identity(group: String, name: String, chunk: usize, pos: usize) -> (String, String) {
    match (group.is_empty(), name.is_empty()) {
        (false, false) => (group, name),
        (true, false) => (name.clone(), name),
        (false, true) => (group.clone(), group),
        (true, true) => {
            let placeholder = format!("unnamed-{chunk}-{pos}");
            (placeholder.clone(), placeholder)
        }
    }
}

fn parse_or_default<T: FromStr + Default>(label: &str) -> T {
    T::from_str(label.trim()).unwrap_or_default()
}

impl RawCharacter {
    /// Convert into a canonical [`Character`].
    ///
    /// Unknown role labels become `extra`; the age text goes through
    /// [`normalize_age`]; weapons and clothing are deduplicated.
    pub fn into_character(self, chunk_index: usize, pos: usize) -> Character {
        let (group_name, name) = resolve_identity(self.group_name, self.name, chunk_index, pos);
        let aliases = merge_aliases(&name, &self.aliases);

        let weapons = merge_weapons(
            self.weapons
                .into_iter()
                .map(|w| Weapon::new(w.name, w.description))
                .collect(),
        );
        let clothing_styles = merge_clothing(
            self.clothing_styles
                .into_iter()
                .map(|c| ClothingStyle::new(c.name, c.phase, c.description))
                .collect(),
        );

        Character {
            id: self.id,
            group_name,
            name,
            aliases,
            role: parse_or_default::<CharacterRole>(&self.role),
            age: normalize_age(&self.age),
            description: self.description,
            visual_memory_points: self.visual_memory_points,
            clothing_styles,
            weapons,
        }
    }
}

impl RawScene {
    /// Convert into a canonical [`Scene`].
    ///
    /// Unknown structure and type labels fall back to `interior` and
    /// `plot-node`; the frequency is at least one.
    pub fn into_scene(self, chunk_index: usize, pos: usize) -> Scene {
        let (group_name, name) = resolve_identity(self.group_name, self.name, chunk_index, pos);
        let aliases = merge_aliases(&name, &self.aliases);

        Scene {
            id: self.id,
            group_name,
            name,
            aliases,
            description: self.description,
            structure: parse_or_default::<SceneStructure>(&self.structure),
            atmosphere: self.atmosphere,
            style: self.style,
            scene_type: parse_or_default::<SceneType>(&self.scene_type),
            frequency: self.frequency.max(1),
        }
    }
}

/// Wire form of a canonical character, used when sending entities back to
/// the service for enrichment or merging.
pub fn character_to_value(character: &Character) -> Value {
    serde_json::to_value(character).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::AgeBracket;

    #[test]
    fn test_missing_fields_default() {
        let payload: ExtractionPayload =
            serde_json::from_str(r#"{"characters": [{"name": "Lin"}]}"#).unwrap();
        let set = payload.into_entity_set(0);

        let lin = &set.characters[0];
        assert_eq!(lin.group_name, "Lin");
        assert_eq!(lin.role, CharacterRole::Extra);
        assert_eq!(lin.age, AgeBracket::Unknown);
        assert!(set.scenes.is_empty());
    }

    #[test]
    fn test_wrong_types_are_tolerated() {
        let json = r#"{
            "characters": [{
                "group": "Hero",
                "name": null,
                "aliases": "Little Hero, 小侠",
                "age": 17,
                "role": "主角",
                "weapons": [{"name": "Sword"}, "not an object"],
                "clothingStyles": null
            }],
            "scenes": [{"groupName": "Inn", "type": "core-location", "frequency": "3"}]
        }"#;
        let set = serde_json::from_str::<ExtractionPayload>(json)
            .unwrap()
            .into_entity_set(2);

        let hero = &set.characters[0];
        assert_eq!(hero.name, "Hero");
        assert_eq!(hero.aliases, vec!["Little Hero", "小侠"]);
        assert_eq!(hero.age, AgeBracket::Youth);
        assert_eq!(hero.role, CharacterRole::Primary);
        assert_eq!(hero.weapons.len(), 1);

        let inn = &set.scenes[0];
        assert_eq!(inn.name, "Inn");
        assert_eq!(inn.scene_type, SceneType::CoreLocation);
        assert_eq!(inn.frequency, 3);
    }

    #[test]
    fn test_placeholder_only_when_both_names_missing() {
        let payload: ExtractionPayload =
            serde_json::from_str(r#"{"scenes": [{"name": "Hall"}, {"description": "fog"}]}"#)
                .unwrap();
        let set = payload.into_entity_set(4);

        assert_eq!(set.scenes[0].group_name, "Hall");
        assert_eq!(set.scenes[1].group_name, "unnamed-4-1");
        assert_eq!(set.scenes[1].name, "unnamed-4-1");
        assert_eq!(set.scenes[1].frequency, 1);
        assert_eq!(set.scenes[1].structure, SceneStructure::Interior);
    }

    #[test]
    fn test_non_object_lists_are_empty() {
        let payload: ExtractionPayload =
            serde_json::from_str(r#"{"characters": "none", "scenes": 5}"#).unwrap();
        assert!(payload.is_empty());
    }
}
