//! Reading inputs and writing results.

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Read a whole text file.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read an optional prompt file; blank files count as absent.
pub fn read_prompt(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    match path {
        Some(path) => {
            let text = read_text(path)?;
            Ok((!text.trim().is_empty()).then_some(text))
        }
        None => Ok(None),
    }
}

/// Parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_core::{Character, EntitySet};

    #[test]
    fn test_entity_file_round_trips_through_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out/bible.json");
        let set = EntitySet::new(
            vec![Character {
                group_name: "Lin".to_string(),
                name: "Lin".to_string(),
                ..Default::default()
            }],
            vec![],
        );

        write_json(&path, &set)?;
        let back: EntitySet = read_json(&path)?;
        assert_eq!(back, set);
        Ok(())
    }

    #[test]
    fn test_blank_prompt_file_is_ignored() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "  \n")?;

        assert_eq!(read_prompt(Some(&path))?, None);
        assert_eq!(read_prompt(None)?, None);
        Ok(())
    }
}
