//! Canonical entity records accumulated across chunks.
//!
//! These are the shapes handed back to callers and stored in the registry.
//! The service's own wire format is looser; conversion with defaulting lives
//! in the consolidation crate.

use serde::{Deserialize, Serialize};

/// Narrative importance of a character.
///
/// Ordered from most to least important, so `min` picks the more prominent role.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CharacterRole {
    /// Protagonists and the central cast
    #[serde(alias = "主角", alias = "main", alias = "protagonist")]
    #[strum(
        to_string = "primary",
        serialize = "main",
        serialize = "protagonist",
        serialize = "主角",
        serialize = "主要"
    )]
    Primary,
    /// Recurring characters with their own arcs
    #[serde(alias = "配角", alias = "major")]
    #[strum(
        to_string = "secondary",
        serialize = "major",
        serialize = "配角",
        serialize = "重要配角",
        serialize = "次要"
    )]
    Secondary,
    /// Characters that appear repeatedly in a supporting capacity
    #[serde(alias = "辅助", alias = "minor")]
    #[strum(
        to_string = "supporting",
        serialize = "minor",
        serialize = "辅助",
        serialize = "次要配角"
    )]
    Supporting,
    /// Walk-ons and background figures
    #[default]
    #[serde(alias = "龙套", alias = "background")]
    #[strum(
        to_string = "extra",
        serialize = "background",
        serialize = "龙套",
        serialize = "路人",
        serialize = "群演"
    )]
    Extra,
}

/// One of the eight canonical age brackets.
///
/// # Examples
///
/// ```
/// use lorebook_core::AgeBracket;
///
/// assert_eq!(AgeBracket::from_label("7-14"), Some(AgeBracket::Child));
/// assert_eq!(AgeBracket::Elderly.label(), "60+");
/// assert_eq!(AgeBracket::ALL.len(), 8);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum AgeBracket {
    /// 0 to 6 years
    #[serde(rename = "0-6")]
    Infant,
    /// 7 to 14 years
    #[serde(rename = "7-14")]
    Child,
    /// 15 to 25 years
    #[serde(rename = "15-25")]
    Youth,
    /// 26 to 40 years
    #[serde(rename = "26-40")]
    Adult,
    /// 41 to 60 years
    #[serde(rename = "41-60")]
    MiddleAged,
    /// 61 to 79 years
    #[serde(rename = "60+")]
    Elderly,
    /// 80 years and older
    #[serde(rename = "80+")]
    Aged,
    /// No usable age information
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl AgeBracket {
    /// Every bracket, youngest first, `Unknown` last.
    pub const ALL: [AgeBracket; 8] = [
        AgeBracket::Infant,
        AgeBracket::Child,
        AgeBracket::Youth,
        AgeBracket::Adult,
        AgeBracket::MiddleAged,
        AgeBracket::Elderly,
        AgeBracket::Aged,
        AgeBracket::Unknown,
    ];

    /// The canonical label, e.g. `"15-25"`.
    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::Infant => "0-6",
            AgeBracket::Child => "7-14",
            AgeBracket::Youth => "15-25",
            AgeBracket::Adult => "26-40",
            AgeBracket::MiddleAged => "41-60",
            AgeBracket::Elderly => "60+",
            AgeBracket::Aged => "80+",
            AgeBracket::Unknown => "unknown",
        }
    }

    /// Exact (trimmed, case-insensitive) match against a canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|bracket| bracket.label().eq_ignore_ascii_case(trimmed))
    }

    /// Bracket for an age in whole years.
    pub fn from_years(years: u32) -> Self {
        match years {
            0..=6 => AgeBracket::Infant,
            7..=14 => AgeBracket::Child,
            15..=25 => AgeBracket::Youth,
            26..=40 => AgeBracket::Adult,
            41..=60 => AgeBracket::MiddleAged,
            61..=79 => AgeBracket::Elderly,
            _ => AgeBracket::Aged,
        }
    }

    /// Whether this bracket carries information.
    pub fn is_known(self) -> bool {
        self != AgeBracket::Unknown
    }
}

impl std::fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A weapon carried by a character. Identified by content, not by key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    /// Weapon name as written in the source
    pub name: String,
    /// Physical description
    pub description: String,
}

impl Weapon {
    /// Create a weapon from a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// An outfit worn during a particular story phase. Identified by phase similarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothingStyle {
    /// Outfit name
    pub name: String,
    /// Story phase the outfit belongs to (e.g. "wedding", "battle")
    pub phase: String,
    /// Physical description
    pub description: String,
}

impl ClothingStyle {
    /// Create an outfit record.
    pub fn new(
        name: impl Into<String>,
        phase: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phase: phase.into(),
            description: description.into(),
        }
    }
}

/// A consolidated character.
///
/// `group_name` is the stable identity; `name` is the variant active in the
/// current context. Both are equal when no variant exists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
    /// Registry-assigned identifier
    pub id: String,
    /// Stable identity key across renames and forms
    pub group_name: String,
    /// Display form active in the current context
    pub name: String,
    /// Alternate textual references, without duplicates
    pub aliases: Vec<String>,
    /// Narrative importance
    pub role: CharacterRole,
    /// Canonical age bracket
    pub age: AgeBracket,
    /// Free-text description
    pub description: String,
    /// Physical appearance only
    pub visual_memory_points: String,
    /// Outfits in order of first appearance
    pub clothing_styles: Vec<ClothingStyle>,
    /// Weapons in order of first appearance
    pub weapons: Vec<Weapon>,
}

/// Whether a scene takes place indoors or outdoors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SceneStructure {
    /// Indoors
    #[default]
    #[serde(alias = "内景", alias = "室内", alias = "indoor")]
    #[strum(
        to_string = "interior",
        serialize = "indoor",
        serialize = "int",
        serialize = "内景",
        serialize = "室内"
    )]
    Interior,
    /// Outdoors
    #[serde(alias = "外景", alias = "室外", alias = "outdoor")]
    #[strum(
        to_string = "exterior",
        serialize = "outdoor",
        serialize = "ext",
        serialize = "外景",
        serialize = "室外"
    )]
    Exterior,
}

/// Role a location plays in the story.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum SceneType {
    /// A recurring, central location
    #[serde(alias = "core", alias = "核心场景")]
    #[strum(
        to_string = "core-location",
        serialize = "core",
        serialize = "core_location",
        serialize = "核心场景"
    )]
    CoreLocation,
    /// A location tied to a specific plot event
    #[default]
    #[serde(alias = "plot", alias = "剧情节点")]
    #[strum(
        to_string = "plot-node",
        serialize = "plot",
        serialize = "plot_node",
        serialize = "剧情节点"
    )]
    PlotNode,
    /// A location passed through between events
    #[serde(alias = "过渡场景")]
    #[strum(to_string = "transition", serialize = "过渡场景", serialize = "过渡")]
    Transition,
}

/// A consolidated scene (location).
///
/// `group_name` is the place (e.g. "Palace"), `name` a sub-area
/// (e.g. "Palace-Throne Room").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    /// Registry-assigned identifier
    pub id: String,
    /// Stable identity of the place
    pub group_name: String,
    /// Sub-area variant
    pub name: String,
    /// Alternate textual references, without duplicates
    pub aliases: Vec<String>,
    /// Free-text description
    pub description: String,
    /// Interior or exterior
    pub structure: SceneStructure,
    /// Mood and lighting
    pub atmosphere: String,
    /// Visual or architectural style
    pub style: String,
    /// Story role of the location
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    /// Number of times the scene was reported across merges
    pub frequency: u32,
}

/// Characters and scenes travelling together, in registry order.
///
/// # Examples
///
/// ```
/// use lorebook_core::EntitySet;
///
/// let set = EntitySet::default();
/// assert!(set.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntitySet {
    /// Consolidated characters
    pub characters: Vec<Character>,
    /// Consolidated scenes
    pub scenes: Vec<Scene>,
}

impl EntitySet {
    /// Create a set from both lists.
    pub fn new(characters: Vec<Character>, scenes: Vec<Scene>) -> Self {
        Self { characters, scenes }
    }

    /// True when neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.scenes.is_empty()
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.characters.len() + self.scenes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_age_bracket_labels_round_trip_through_serde() {
        for bracket in AgeBracket::ALL {
            let json = serde_json::to_string(&bracket).unwrap();
            assert_eq!(json, format!("\"{}\"", bracket.label()));
            let back: AgeBracket = serde_json::from_str(&json).unwrap();
            assert_eq!(back, bracket);
        }
    }

    #[test]
    fn test_unrecognised_age_label_deserializes_as_unknown() {
        let bracket: AgeBracket = serde_json::from_str("\"teenager\"").unwrap();
        assert_eq!(bracket, AgeBracket::Unknown);
    }

    #[test]
    fn test_year_boundaries() {
        assert_eq!(AgeBracket::from_years(6), AgeBracket::Infant);
        assert_eq!(AgeBracket::from_years(7), AgeBracket::Child);
        assert_eq!(AgeBracket::from_years(60), AgeBracket::MiddleAged);
        assert_eq!(AgeBracket::from_years(61), AgeBracket::Elderly);
        assert_eq!(AgeBracket::from_years(80), AgeBracket::Aged);
    }

    #[test]
    fn test_role_parses_source_language_labels() {
        assert_eq!(CharacterRole::from_str("主角").unwrap(), CharacterRole::Primary);
        assert_eq!(CharacterRole::from_str("EXTRA").unwrap(), CharacterRole::Extra);
        assert!(CharacterRole::Primary < CharacterRole::Supporting);
    }

    #[test]
    fn test_labels_display_in_canonical_form() {
        assert_eq!(CharacterRole::Primary.to_string(), "primary");
        assert_eq!(CharacterRole::Secondary.to_string(), "secondary");
        assert_eq!(CharacterRole::Extra.to_string(), "extra");
        assert_eq!(SceneStructure::Exterior.to_string(), "exterior");
        assert_eq!(SceneType::CoreLocation.to_string(), "core-location");
        assert_eq!(SceneType::Transition.to_string(), "transition");
        assert_eq!(SceneType::from_str("过渡").unwrap(), SceneType::Transition);
    }

    #[test]
    fn test_scene_serializes_type_field() {
        let scene = Scene {
            group_name: "Palace".to_string(),
            name: "Palace-Throne Room".to_string(),
            scene_type: SceneType::CoreLocation,
            ..Default::default()
        };
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["type"], "core-location");
        assert_eq!(value["groupName"], "Palace");
        assert_eq!(value["structure"], "interior");
    }
}
