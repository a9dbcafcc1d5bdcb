//! Prompt text for extraction, enrichment and assisted merging.
//!
//! A caller-supplied prompt replaces only the instruction block. Known
//! entities and the chunk text are always appended after it.

/// Instructions for pulling characters and scenes out of one chunk.
pub const DEFAULT_EXTRACTION_PROMPT: &str = "\
You are building a visual bible for illustrators and video generation.
Read the novel excerpt below and list every character and every scene.

Characters:
- groupName identifies the person. Use the same groupName for every name, title or nickname of one person.
- name is the most complete name used in the excerpt; put other names in aliases.
- role is one of primary, secondary, supporting, extra.
- age is one of 0-6, 7-14, 15-25, 26-40, 41-60, 60+, 80+, unknown. Infer from explicit ages or descriptions such as teenager or old man.
- description covers personality and story function.
- visualMemoryPoints lists the traits an artist must keep consistent: face, hair, build, scars, colours.
- clothingStyles lists each outfit with the story phase it is worn in.
- weapons lists every weapon or signature item with a description.

Scenes:
- groupName is the overall location; name is the specific sub-area, or the same as groupName.
- structure is interior or exterior; type is core-location, plot-node or transition.
- description, atmosphere and style describe what a camera would see.
- frequency is how many times the location appears in this excerpt.

When an entity below is already known, reuse its groupName and name exactly and only add new details.
Do not invent details that the text does not support.";

/// Instructions for filling in sparse entities after extraction.
pub const DEFAULT_ENRICHMENT_PROMPT: &str = "\
The entities below were extracted from a novel but some descriptions are thin.
For each entity, expand description and visualMemoryPoints (characters) or
description, atmosphere and style (scenes) into concrete visual detail an
illustrator can draw from. Keep every id, groupName and name unchanged.
Never remove existing details; only add to them.";

/// Instructions for reconciling two records of the same character.
pub const DEFAULT_MERGE_PROMPT: &str = "\
The two records below describe the same character, seen in different parts of a novel.
Merge them into one record. Keep the groupName and name of the first record,
collect every other name into aliases, keep the more specific age, and combine
descriptions, visual traits, outfits and weapons without dropping any detail.
Treat weapons or outfits that are clearly the same item as one entry.";

/// Build the prompt for one chunk.
///
/// `instructions` is the default prompt or a caller override; `context` is the
/// registry summary and is omitted when empty.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::build_extraction_prompt;
///
/// let prompt = build_extraction_prompt("List characters.", "", "Lin drew her sword.");
/// assert!(prompt.starts_with("List characters."));
/// assert!(prompt.ends_with("Lin drew her sword."));
/// assert!(!prompt.contains("Known entities"));
/// ```
pub fn build_extraction_prompt(instructions: &str, context: &str, chunk: &str) -> String {
    let mut prompt = String::with_capacity(instructions.len() + context.len() + chunk.len() + 64);
    prompt.push_str(instructions.trim_end());
    prompt.push_str("\n\n");
    if !context.trim().is_empty() {
        prompt.push_str("## Known entities\n");
        prompt.push_str(context.trim_end());
        prompt.push_str("\n\n");
    }
    prompt.push_str("## Excerpt\n");
    prompt.push_str(chunk);
    prompt
}

/// Build the enrichment prompt around the serialized entities.
pub fn build_enrichment_prompt(instructions: &str, entities_json: &str) -> String {
    format!("{}\n\n## Entities\n{}", instructions.trim_end(), entities_json)
}

/// Build the assisted-merge prompt around two serialized characters.
pub fn build_merge_prompt(existing_json: &str, incoming_json: &str) -> String {
    format!(
        "{}\n\n## First record\n{}\n\n## Second record\n{}",
        DEFAULT_MERGE_PROMPT, existing_json, incoming_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_precedes_chunk() {
        let prompt = build_extraction_prompt(DEFAULT_EXTRACTION_PROMPT, "- group: A", "text");
        let context_at = prompt.find("- group: A").unwrap();
        let chunk_at = prompt.find("## Excerpt").unwrap();
        assert!(context_at < chunk_at);
    }

    #[test]
    fn test_override_replaces_only_instructions() {
        let prompt = build_extraction_prompt("Custom rules.", "- group: A", "text");
        assert!(prompt.starts_with("Custom rules."));
        assert!(!prompt.contains("visual bible"));
        assert!(prompt.contains("- group: A"));
        assert!(prompt.ends_with("text"));
    }
}
