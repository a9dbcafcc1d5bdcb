//! Keyed store of consolidated characters and scenes.

use crate::merge::{merge_character, merge_scene};
use indexmap::IndexMap;
use lorebook_core::{Character, EntitySet, Scene};
use std::fmt::Write;
use tracing::debug;

/// Characters stripped from key parts besides whitespace.
pub const KEY_SEPARATORS: &[char] = &[
    '-', '_', '.', '·', '・', '/', '\\', '|', ':', '：', '、', '，', ',', '(', ')', '（', '）',
    '—', '–',
];

/// Lower-case `part` and drop whitespace and separators.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::normalize_key_part;
///
/// assert_eq!(normalize_key_part(" Ah-A "), "aha");
/// assert_eq!(normalize_key_part("皇宫·正殿"), "皇宫正殿");
/// ```
pub fn normalize_key_part(part: &str) -> String {
    part.chars()
        .filter(|c| !c.is_whitespace() && !KEY_SEPARATORS.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Registry key: `normalize(group_name) + "_" + normalize(name)`.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::registry_key;
///
/// assert_eq!(registry_key("A", "A"), "a_a");
/// assert_eq!(registry_key("Palace", "Palace-Throne Room"), "palace_palacethroneroom");
/// ```
pub fn registry_key(group_name: &str, name: &str) -> String {
    format!("{}_{}", normalize_key_part(group_name), normalize_key_part(name))
}

/// Whether an upsert created a record or merged into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// A new record was stored under this key
    Inserted(String),
    /// The record was merged into the one already under this key
    Merged(String),
}

impl Upsert {
    /// The key the record ended up under.
    pub fn key(&self) -> &str {
        match self {
            Upsert::Inserted(key) | Upsert::Merged(key) => key,
        }
    }
}

/// Insertion-ordered store of the entities found so far in one run.
///
/// Keys are always recomputed from `group_name` and `name`; two records that
/// land on the same key are merged, never overwritten. Records receive a
/// UUID when inserted without an id.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    characters: IndexMap<String, Character>,
    scenes: IndexMap<String, Scene>,
}

impl EntityRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled from an earlier result, for re-analysis.
    pub fn seeded(entities: EntitySet) -> Self {
        let mut registry = Self::new();
        for character in entities.characters {
            registry.upsert_character(character);
        }
        for scene in entities.scenes {
            registry.upsert_scene(scene);
        }
        debug!(
            characters = registry.characters.len(),
            scenes = registry.scenes.len(),
            "Seeded registry"
        );
        registry
    }

    /// Insert a character, or merge it into the one under the same key.
    pub fn upsert_character(&mut self, mut character: Character) -> Upsert {
        let key = registry_key(&character.group_name, &character.name);
        match self.characters.shift_remove_full(&key) {
            Some((index, _, existing)) => {
                let merged = merge_character(existing, character);
                self.characters.shift_insert(index, key.clone(), merged);
                Upsert::Merged(key)
            }
            None => {
                ensure_id(&mut character.id);
                self.characters.insert(key.clone(), character);
                Upsert::Inserted(key)
            }
        }
    }

    /// Insert a scene, or fold it into the one under the same key.
    ///
    /// New scenes start with a frequency of at least one.
    pub fn upsert_scene(&mut self, mut scene: Scene) -> Upsert {
        let key = registry_key(&scene.group_name, &scene.name);
        match self.scenes.shift_remove_full(&key) {
            Some((index, _, existing)) => {
                let merged = merge_scene(existing, scene);
                self.scenes.shift_insert(index, key.clone(), merged);
                Upsert::Merged(key)
            }
            None => {
                ensure_id(&mut scene.id);
                scene.frequency = scene.frequency.max(1);
                self.scenes.insert(key.clone(), scene);
                Upsert::Inserted(key)
            }
        }
    }

    /// Replace the character under `key` with an already-merged record.
    ///
    /// The record keeps the key it is stored under; callers pass a record
    /// whose `group_name` and `name` produce that key.
    pub(crate) fn replace_character(&mut self, key: &str, mut character: Character) {
        if let Some(slot) = self.characters.get_mut(key) {
            if character.id.is_empty() {
                character.id = slot.id.clone();
            }
            *slot = character;
        } else {
            self.upsert_character(character);
        }
    }

    /// Character stored under `key`.
    pub fn get_character(&self, key: &str) -> Option<&Character> {
        self.characters.get(key)
    }

    /// Scene stored under `key`.
    pub fn get_scene(&self, key: &str) -> Option<&Scene> {
        self.scenes.get(key)
    }

    /// Characters in insertion order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Scenes in insertion order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    /// Number of characters.
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Number of scenes.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.characters.len() + self.scenes.len()
    }

    /// True when no entity has been stored.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.scenes.is_empty()
    }

    /// Text injected into each chunk prompt so the service extends known
    /// entities instead of inventing duplicates.
    ///
    /// Lists every character's group, name, age, weapons and clothing phases,
    /// and every scene group with its known sub-areas. Empty when the registry
    /// is empty.
    pub fn context_summary(&self) -> String {
        let mut summary = String::new();

        if !self.characters.is_empty() {
            summary.push_str("Known characters:\n");
            for character in self.characters.values() {
                let _ = write!(
                    summary,
                    "- group: {} | name: {} | age: {}",
                    character.group_name, character.name, character.age
                );
                if !character.weapons.is_empty() {
                    let weapons: Vec<&str> =
                        character.weapons.iter().map(|w| w.name.as_str()).collect();
                    let _ = write!(summary, " | weapons: {}", weapons.join(", "));
                }
                if !character.clothing_styles.is_empty() {
                    let phases: Vec<&str> = character
                        .clothing_styles
                        .iter()
                        .map(|c| c.phase.as_str())
                        .collect();
                    let _ = write!(summary, " | clothing phases: {}", phases.join(", "));
                }
                summary.push('\n');
            }
        }

        if !self.scenes.is_empty() {
            let mut groups: IndexMap<&str, Vec<&str>> = IndexMap::new();
            for scene in self.scenes.values() {
                let areas = groups.entry(scene.group_name.as_str()).or_default();
                if scene.name != scene.group_name {
                    areas.push(scene.name.as_str());
                }
            }

            summary.push_str("Known scenes:\n");
            for (group, areas) in groups {
                if areas.is_empty() {
                    let _ = writeln!(summary, "- {group}");
                } else {
                    let _ = writeln!(summary, "- {group}: {}", areas.join(", "));
                }
            }
        }

        summary
    }

    /// Hand the contents back as plain lists, in insertion order.
    pub fn into_entity_set(self) -> EntitySet {
        EntitySet::new(
            self.characters.into_values().collect(),
            self.scenes.into_values().collect(),
        )
    }
}

fn ensure_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = uuid::Uuid::new_v4().to_string();
    }
}
