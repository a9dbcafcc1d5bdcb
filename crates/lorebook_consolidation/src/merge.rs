//! Deterministic merge engine.
//!
//! Folding a duplicate into an existing record must never silently drop a
//! distinct weapon or outfit, and must never leave two similar ones behind.
//! Exact output on equally detailed inputs is order-sensitive; callers should
//! rely only on those two guarantees.

use crate::normalize::{SimilarityProfile, is_similar};
use lorebook_core::{Character, ClothingStyle, Scene, Weapon};

/// Delimiter used when two equally long but different texts are kept together.
pub const TIE_DELIMITER: &str = "; ";

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Keep the longer of two texts; equally long but different texts are joined.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::merge_text;
///
/// assert_eq!(merge_text("a blade", "a short curved blade"), "a short curved blade");
/// assert_eq!(merge_text("red", "tan"), "red; tan");
/// assert_eq!(merge_text("kept", ""), "kept");
/// ```
pub fn merge_text(existing: &str, incoming: &str) -> String {
    let (kept, new) = (existing.trim(), incoming.trim());
    if new.is_empty() || kept == new {
        return kept.to_string();
    }
    if kept.is_empty() {
        return new.to_string();
    }

    match char_len(new).cmp(&char_len(kept)) {
        std::cmp::Ordering::Greater => new.to_string(),
        std::cmp::Ordering::Less => kept.to_string(),
        std::cmp::Ordering::Equal => format!("{kept}{TIE_DELIMITER}{new}"),
    }
}

/// Take `incoming` only if it is strictly longer. Never shortens a field.
pub fn prefer_longer(existing: &str, incoming: &str) -> String {
    if char_len(incoming) > char_len(existing) {
        incoming.trim().to_string()
    } else {
        existing.to_string()
    }
}

/// Deduplicate weapons by name similarity, scanning left to right.
///
/// A weapon similar to an earlier entry is absorbed into it (see
/// [`merge_text`] for the description); otherwise it is appended. Unnamed
/// weapons are never merged.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::merge_weapons;
/// use lorebook_core::Weapon;
///
/// let merged = merge_weapons(vec![
///     Weapon::new("Blade", "a short blade"),
///     Weapon::new("Short Blade", "a short, slightly curved blade"),
///     Weapon::new("Bow", "yew longbow"),
/// ]);
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].description, "a short, slightly curved blade");
/// ```
pub fn merge_weapons(items: Vec<Weapon>) -> Vec<Weapon> {
    let mut merged: Vec<Weapon> = Vec::with_capacity(items.len());

    for item in items {
        if item.name.trim().is_empty() && item.description.trim().is_empty() {
            continue;
        }
        match merged
            .iter_mut()
            .find(|kept| is_similar(&kept.name, &item.name, SimilarityProfile::WEAPON))
        {
            Some(kept) => kept.description = merge_text(&kept.description, &item.description),
            None => merged.push(item),
        }
    }

    merged
}

/// Deduplicate outfits by phase similarity, scanning left to right.
///
/// Same rule as [`merge_weapons`]; the surviving entry also keeps the
/// longer of the two names. Outfits missing a phase are compared by name.
pub fn merge_clothing(items: Vec<ClothingStyle>) -> Vec<ClothingStyle> {
    let mut merged: Vec<ClothingStyle> = Vec::with_capacity(items.len());

    for item in items {
        if item.name.trim().is_empty()
            && item.phase.trim().is_empty()
            && item.description.trim().is_empty()
        {
            continue;
        }
        match merged.iter_mut().find(|kept| same_outfit(kept, &item)) {
            Some(kept) => {
                kept.description = merge_text(&kept.description, &item.description);
                if kept.phase.trim().is_empty() {
                    kept.phase = item.phase;
                }
                if char_len(&item.name) > char_len(&kept.name) {
                    kept.name = item.name;
                }
            }
            None => merged.push(item),
        }
    }

    merged
}

// Outfits are keyed by phase; without a phase on both sides the names decide.
fn same_outfit(kept: &ClothingStyle, item: &ClothingStyle) -> bool {
    if kept.phase.trim().is_empty() || item.phase.trim().is_empty() {
        is_similar(&kept.name, &item.name, SimilarityProfile::CLOTHING)
    } else {
        is_similar(&kept.phase, &item.phase, SimilarityProfile::CLOTHING)
    }
}

/// Union of alias lists, in first-seen order.
///
/// Blank entries and entries equal (case-insensitively) to `survivor_name`
/// are dropped.
pub fn merge_aliases<'a>(
    survivor_name: &str,
    sources: impl IntoIterator<Item = &'a String>,
) -> Vec<String> {
    let survivor = survivor_name.trim().to_lowercase();
    let mut seen: Vec<String> = Vec::new();
    let mut aliases = Vec::new();

    for alias in sources {
        let trimmed = alias.trim();
        let folded = trimmed.to_lowercase();
        if trimmed.is_empty() || folded == survivor || seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        aliases.push(trimmed.to_string());
    }

    aliases
}

/// Fold `incoming` into `existing`.
///
/// `id`, `group_name` and `name` stay those of `existing`; the incoming name
/// becomes an alias when it differs. Age takes the incoming value unless it
/// is unknown, role the more important of the two, text fields the longer.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::merge_character;
/// use lorebook_core::{AgeBracket, Character, CharacterRole};
///
/// let existing = Character {
///     group_name: "Li Xiaoyao".into(),
///     name: "Li Xiaoyao".into(),
///     age: AgeBracket::Youth,
///     role: CharacterRole::Supporting,
///     ..Default::default()
/// };
/// let incoming = Character {
///     group_name: "Li Xiaoyao".into(),
///     name: "Xiaoyao".into(),
///     role: CharacterRole::Primary,
///     ..Default::default()
/// };
///
/// let merged = merge_character(existing, incoming);
/// assert_eq!(merged.name, "Li Xiaoyao");
/// assert_eq!(merged.aliases, vec!["Xiaoyao".to_string()]);
/// assert_eq!(merged.age, AgeBracket::Youth);
/// assert_eq!(merged.role, CharacterRole::Primary);
/// ```
pub fn merge_character(existing: Character, incoming: Character) -> Character {
    let aliases = merge_aliases(
        &existing.name,
        existing
            .aliases
            .iter()
            .chain(std::iter::once(&incoming.name))
            .chain(incoming.aliases.iter()),
    );

    let age = if incoming.age.is_known() {
        incoming.age
    } else {
        existing.age
    };

    let weapons = merge_weapons(existing.weapons.into_iter().chain(incoming.weapons).collect());
    let clothing_styles = merge_clothing(
        existing
            .clothing_styles
            .into_iter()
            .chain(incoming.clothing_styles)
            .collect(),
    );

    Character {
        id: if existing.id.is_empty() {
            incoming.id
        } else {
            existing.id
        },
        group_name: existing.group_name,
        role: existing.role.min(incoming.role),
        age,
        description: merge_text(&existing.description, &incoming.description),
        visual_memory_points: merge_text(
            &existing.visual_memory_points,
            &incoming.visual_memory_points,
        ),
        aliases,
        weapons,
        clothing_styles,
        name: existing.name,
    }
}

/// Fold a repeated scene sighting into the existing record.
///
/// Frequencies add up (an incoming record counts at least once), aliases are
/// unioned and empty text fields are filled. Nothing else is merged.
pub fn merge_scene(existing: Scene, incoming: Scene) -> Scene {
    let aliases = merge_aliases(
        &existing.name,
        existing
            .aliases
            .iter()
            .chain(std::iter::once(&incoming.name))
            .chain(incoming.aliases.iter()),
    );

    let fill = |kept: String, new: String| {
        if kept.trim().is_empty() { new } else { kept }
    };

    Scene {
        id: if existing.id.is_empty() {
            incoming.id
        } else {
            existing.id
        },
        frequency: existing
            .frequency
            .saturating_add(incoming.frequency.max(1)),
        description: fill(existing.description, incoming.description),
        atmosphere: fill(existing.atmosphere, incoming.atmosphere),
        style: fill(existing.style, incoming.style),
        aliases,
        ..existing
    }
}

/// Apply an enrichment reply to a character, field by field.
///
/// Text only ever grows: a field is replaced when the enriched text is
/// longer. An unknown age may be filled. Weapons and outfits are merged.
pub fn enrich_character(existing: Character, enriched: Character) -> Character {
    let aliases = merge_aliases(
        &existing.name,
        existing.aliases.iter().chain(enriched.aliases.iter()),
    );
    let weapons = merge_weapons(existing.weapons.into_iter().chain(enriched.weapons).collect());
    let clothing_styles = merge_clothing(
        existing
            .clothing_styles
            .into_iter()
            .chain(enriched.clothing_styles)
            .collect(),
    );

    Character {
        age: if existing.age.is_known() {
            existing.age
        } else {
            enriched.age
        },
        description: prefer_longer(&existing.description, &enriched.description),
        visual_memory_points: prefer_longer(
            &existing.visual_memory_points,
            &enriched.visual_memory_points,
        ),
        aliases,
        weapons,
        clothing_styles,
        ..existing
    }
}

/// Apply an enrichment reply to a scene. Text fields only ever grow.
pub fn enrich_scene(existing: Scene, enriched: Scene) -> Scene {
    let aliases = merge_aliases(
        &existing.name,
        existing.aliases.iter().chain(enriched.aliases.iter()),
    );

    Scene {
        description: prefer_longer(&existing.description, &enriched.description),
        atmosphere: prefer_longer(&existing.atmosphere, &enriched.atmosphere),
        style: prefer_longer(&existing.style, &enriched.style),
        aliases,
        ..existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::{AgeBracket, CharacterRole};

    fn character(name: &str) -> Character {
        Character {
            id: format!("id-{name}"),
            group_name: name.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_similar_weapons_keep_longest_description() {
        let w1 = Weapon::new("剑", "一把剑");
        let w2 = Weapon::new("长剑", "一把三尺长的青钢剑，剑柄缠着红绳");
        let merged = merge_weapons(vec![w1.clone(), w2.clone()]);

        assert_eq!(merged.len(), 1);
        assert!(
            merged[0].description.chars().count()
                >= w1.description.chars().count().max(w2.description.chars().count())
        );
        assert_eq!(merged[0].name, "剑");
    }

    #[test]
    fn test_dissimilar_weapons_both_survive() {
        let merged = merge_weapons(vec![Weapon::new("长剑", "a"), Weapon::new("短剑", "b")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_equal_length_descriptions_are_both_kept() {
        let merged = merge_weapons(vec![Weapon::new("spear", "ash"), Weapon::new("Spear", "oak")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].description, "ash; oak");
    }

    #[test]
    fn test_blank_weapons_are_dropped() {
        let merged = merge_weapons(vec![Weapon::default(), Weapon::new("bow", "")]);
        assert_eq!(merged, vec![Weapon::new("bow", "")]);
    }

    #[test]
    fn test_unnamed_weapons_are_kept_apart() {
        let merged = merge_weapons(vec![
            Weapon::new("", "a bone dagger"),
            Weapon::new("", "a yew longbow with a frayed string"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].description, "a bone dagger");
    }

    #[test]
    fn test_phaseless_outfits_fall_back_to_names() {
        let merged = merge_clothing(vec![
            ClothingStyle::new("Red robe", "", "silk"),
            ClothingStyle::new("Black armor", "", "lamellar iron plates"),
            ClothingStyle::new("black armor", "", "iron"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Red robe");
        assert_eq!(merged[1].description, "lamellar iron plates");
    }

    #[test]
    fn test_merge_character_keeps_phaseless_outfits() {
        let mut existing = character("A");
        existing.clothing_styles = vec![ClothingStyle::new("Red robe", "", "silk")];
        let mut incoming = character("A");
        incoming.clothing_styles =
            vec![ClothingStyle::new("Black armor", "", "lamellar iron plates")];

        let merged = merge_character(existing, incoming);
        assert_eq!(merged.clothing_styles.len(), 2);
    }

    #[test]
    fn test_clothing_keeps_longer_name() {
        let merged = merge_clothing(vec![
            ClothingStyle::new("Robe", "wedding", "red silk"),
            ClothingStyle::new("Crimson wedding robe", "marriage ceremony", "red"),
            ClothingStyle::new("Armor", "battle", "lamellar"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Crimson wedding robe");
        assert_eq!(merged[0].description, "red silk");
        assert_eq!(merged[0].phase, "wedding");
    }

    #[test]
    fn test_merge_character_unions_everything() {
        let mut existing = character("A");
        existing.aliases = vec!["Ah-A".to_string()];
        existing.age = AgeBracket::Youth;
        existing.description = "short".to_string();
        existing.weapons = vec![Weapon::new("Blade", "a short blade")];
        existing.role = CharacterRole::Secondary;

        let mut incoming = character("A");
        incoming.id = String::new();
        incoming.aliases = vec!["ah-a".to_string(), "Little A".to_string()];
        incoming.description = "a much longer description".to_string();
        incoming.weapons = vec![
            Weapon::new("Short Blade", "a short, slightly curved blade, steel, grey"),
            Weapon::new("Bow", "recurve"),
        ];
        incoming.role = CharacterRole::Extra;

        let merged = merge_character(existing, incoming);

        assert_eq!(merged.id, "id-A");
        assert_eq!(merged.aliases, vec!["Ah-A".to_string(), "Little A".to_string()]);
        assert_eq!(merged.age, AgeBracket::Youth);
        assert_eq!(merged.description, "a much longer description");
        assert_eq!(merged.role, CharacterRole::Secondary);
        assert_eq!(merged.weapons.len(), 2);
        assert_eq!(
            merged.weapons[0].description,
            "a short, slightly curved blade, steel, grey"
        );
    }

    #[test]
    fn test_known_incoming_age_wins() {
        let mut existing = character("B");
        existing.age = AgeBracket::Youth;
        let mut incoming = character("B");
        incoming.age = AgeBracket::Adult;
        assert_eq!(merge_character(existing, incoming).age, AgeBracket::Adult);
    }

    #[test]
    fn test_merge_scene_accumulates_frequency() {
        let existing = Scene {
            id: "s1".to_string(),
            group_name: "Palace".to_string(),
            name: "Palace-Throne Room".to_string(),
            frequency: 2,
            atmosphere: "solemn".to_string(),
            ..Default::default()
        };
        let incoming = Scene {
            group_name: "Palace".to_string(),
            name: "Palace Throne Room".to_string(),
            description: "gilded pillars".to_string(),
            atmosphere: "tense".to_string(),
            frequency: 0,
            ..Default::default()
        };

        let merged = merge_scene(existing, incoming);
        assert_eq!(merged.frequency, 3);
        assert_eq!(merged.name, "Palace-Throne Room");
        assert_eq!(merged.aliases, vec!["Palace Throne Room".to_string()]);
        assert_eq!(merged.description, "gilded pillars");
        assert_eq!(merged.atmosphere, "solemn");
    }

    #[test]
    fn test_enrichment_never_shortens() {
        let mut existing = character("C");
        existing.description = "a detailed existing description".to_string();
        existing.visual_memory_points = "scar".to_string();
        let mut enriched = character("C");
        enriched.description = "shorter".to_string();
        enriched.visual_memory_points = "a jagged scar across the left cheek".to_string();
        enriched.age = AgeBracket::Elderly;

        let result = enrich_character(existing, enriched);
        assert_eq!(result.description, "a detailed existing description");
        assert_eq!(result.visual_memory_points, "a jagged scar across the left cheek");
        assert_eq!(result.age, AgeBracket::Elderly);
    }
}
