//! Selection and application of the enrichment pass.

use crate::merge::{enrich_character, enrich_scene};
use crate::registry::registry_key;
use crate::vocabulary::SALIENT_VISUAL_MARKERS;
use lorebook_core::{Character, EntitySet, Scene};
use lorebook_rate_limit::EnrichmentConfig;
use std::collections::HashMap;
use tracing::debug;

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Whether a character's text is too thin to draw from.
///
/// Sparse means a short description, short visual text, or visual text
/// without any salient physical marker.
pub fn is_sparse_character(character: &Character, thresholds: &EnrichmentConfig) -> bool {
    let visual = character.visual_memory_points.to_lowercase();
    char_len(&character.description) < thresholds.min_description_chars
        || char_len(&visual) < thresholds.min_visual_chars
        || !SALIENT_VISUAL_MARKERS
            .iter()
            .any(|marker| visual.contains(marker))
}

/// Whether a scene's text is too thin to draw from.
pub fn is_sparse_scene(scene: &Scene, thresholds: &EnrichmentConfig) -> bool {
    char_len(&scene.description) < thresholds.min_description_chars
        || scene.atmosphere.trim().is_empty()
}

/// The subset of `entities` that needs enrichment, in original order.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::select_sparse;
/// use lorebook_core::{Character, EntitySet};
/// use lorebook_rate_limit::EnrichmentConfig;
///
/// let thin = Character { group_name: "A".into(), name: "A".into(), ..Default::default() };
/// let set = EntitySet::new(vec![thin], vec![]);
/// assert_eq!(select_sparse(&set, &EnrichmentConfig::default()).characters.len(), 1);
/// ```
pub fn select_sparse(entities: &EntitySet, thresholds: &EnrichmentConfig) -> EntitySet {
    EntitySet::new(
        entities
            .characters
            .iter()
            .filter(|c| is_sparse_character(c, thresholds))
            .cloned()
            .collect(),
        entities
            .scenes
            .iter()
            .filter(|s| is_sparse_scene(s, thresholds))
            .cloned()
            .collect(),
    )
}

/// Fold enriched records back into `base`.
///
/// Records are matched by id, falling back to the group/name key. Enriched
/// records with no match are ignored, so the pass never adds entities.
pub fn apply_enrichment(base: EntitySet, enriched: EntitySet) -> EntitySet {
    let mut characters_by_id: HashMap<String, Character> = HashMap::new();
    let mut characters_by_key: HashMap<String, Character> = HashMap::new();
    for character in enriched.characters {
        if !character.id.is_empty() {
            characters_by_id.insert(character.id.clone(), character.clone());
        }
        characters_by_key.insert(registry_key(&character.group_name, &character.name), character);
    }

    let mut scenes_by_id: HashMap<String, Scene> = HashMap::new();
    let mut scenes_by_key: HashMap<String, Scene> = HashMap::new();
    for scene in enriched.scenes {
        if !scene.id.is_empty() {
            scenes_by_id.insert(scene.id.clone(), scene.clone());
        }
        scenes_by_key.insert(registry_key(&scene.group_name, &scene.name), scene);
    }

    let mut applied = 0usize;
    let characters = base
        .characters
        .into_iter()
        .map(|character| {
            let key = registry_key(&character.group_name, &character.name);
            match characters_by_id
                .remove(&character.id)
                .or_else(|| characters_by_key.remove(&key))
            {
                Some(update) => {
                    applied += 1;
                    enrich_character(character, update)
                }
                None => character,
            }
        })
        .collect();
    let scenes = base
        .scenes
        .into_iter()
        .map(|scene| {
            let key = registry_key(&scene.group_name, &scene.name);
            match scenes_by_id
                .remove(&scene.id)
                .or_else(|| scenes_by_key.remove(&key))
            {
                Some(update) => {
                    applied += 1;
                    enrich_scene(scene, update)
                }
                None => scene,
            }
        })
        .collect();

    debug!(applied, "Applied enrichment");
    EntitySet::new(characters, scenes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detailed() -> Character {
        Character {
            id: "c1".to_string(),
            group_name: "Lin".to_string(),
            name: "Lin".to_string(),
            description: "A sharp-tongued courier who runs messages across the river city."
                .to_string(),
            visual_memory_points: "Short black hair, a scar across the left eyebrow".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_detailed_character_is_not_sparse() {
        assert!(!is_sparse_character(&detailed(), &EnrichmentConfig::default()));
    }

    #[test]
    fn test_long_visual_text_without_markers_is_sparse() {
        let mut character = detailed();
        character.visual_memory_points = "Looks exactly like everyone else in town".to_string();
        assert!(is_sparse_character(&character, &EnrichmentConfig::default()));
    }

    #[test]
    fn test_enrichment_never_shortens_and_never_adds() {
        let base = EntitySet::new(vec![detailed()], vec![]);
        let update = Character {
            id: "c1".to_string(),
            group_name: "Lin".to_string(),
            name: "Lin".to_string(),
            description: "Courier.".to_string(),
            visual_memory_points:
                "Short black hair tied with red cord, a scar across the left eyebrow, ink-stained fingers"
                    .to_string(),
            ..Default::default()
        };
        let stranger = Character {
            group_name: "Stranger".to_string(),
            name: "Stranger".to_string(),
            ..Default::default()
        };

        let result = apply_enrichment(base, EntitySet::new(vec![update, stranger], vec![]));
        assert_eq!(result.characters.len(), 1);
        let lin = &result.characters[0];
        assert!(lin.description.starts_with("A sharp-tongued courier"));
        assert!(lin.visual_memory_points.contains("ink-stained"));
    }

    #[test]
    fn test_match_falls_back_to_key() {
        let base = EntitySet::new(
            vec![],
            vec![Scene {
                id: "s1".to_string(),
                group_name: "Inn".to_string(),
                name: "Inn".to_string(),
                ..Default::default()
            }],
        );
        let update = Scene {
            group_name: "inn".to_string(),
            name: "INN".to_string(),
            atmosphere: "Smoky and loud".to_string(),
            ..Default::default()
        };

        let result = apply_enrichment(base, EntitySet::new(vec![], vec![update]));
        assert_eq!(result.scenes[0].atmosphere, "Smoky and loud");
        assert_eq!(result.scenes[0].id, "s1");
    }
}
