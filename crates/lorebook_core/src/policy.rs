//! Run policies shared by configuration and the orchestrator.

use serde::{Deserialize, Serialize};

/// How a duplicate character is merged into the registry.
///
/// The deterministic merge engine is always available; the assisted variant
/// asks the service first and falls back to the deterministic result when
/// that call fails.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MergePolicy {
    /// Only the local merge engine
    #[default]
    Deterministic,
    /// Service-assisted merge, folded over the local merge
    PreferAssisted,
}

/// What happens to a run when a single chunk fails.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChunkFailurePolicy {
    /// Record the failure in the debug log and continue with the next chunk
    #[default]
    Skip,
    /// Stop the run and hand back what was merged so far
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_policies_parse_from_config_labels() {
        assert_eq!(
            MergePolicy::from_str("prefer_assisted").unwrap(),
            MergePolicy::PreferAssisted
        );
        assert_eq!(
            ChunkFailurePolicy::from_str("ABORT").unwrap(),
            ChunkFailurePolicy::Abort
        );
        assert_eq!(ChunkFailurePolicy::default().to_string(), "skip");
    }
}
