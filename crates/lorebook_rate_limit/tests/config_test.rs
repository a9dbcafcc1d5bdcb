//! Tests for the layered configuration loader.

use lorebook_core::{ChunkFailurePolicy, MergePolicy};
use lorebook_rate_limit::{LorebookConfig, RetryPolicy};
use std::io::Write;
use std::time::Duration;
use tempfile::Builder;

#[test]
fn test_bundled_defaults_match_documented_values() -> anyhow::Result<()> {
    let config = LorebookConfig::bundled()?;

    assert_eq!(config.consolidation.chunk_size, 50_000);
    assert_eq!(config.consolidation.pace_ms, 4000);
    assert_eq!(config.consolidation.merge_policy, MergePolicy::Deterministic);
    assert_eq!(
        config.consolidation.chunk_failure_policy,
        ChunkFailurePolicy::Skip
    );
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.base_delay_ms, 5000);
    assert_eq!(config.retry.max_jitter_ms, 2000);
    assert_eq!(config.gemini.request_timeout(), Duration::from_secs(120));
    assert!(!config.gemini.timeout_is_rate_limited);
    Ok(())
}

#[test]
fn test_bundled_defaults_agree_with_struct_defaults() -> anyhow::Result<()> {
    assert_eq!(LorebookConfig::bundled()?, LorebookConfig::default());
    Ok(())
}

#[test]
fn test_file_overrides_only_given_keys() -> anyhow::Result<()> {
    let mut temp_file = Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        temp_file,
        r#"
[consolidation]
pace_ms = 250
merge_policy = "prefer_assisted"

[retry]
max_attempts = 3
"#
    )?;

    let config = LorebookConfig::from_file(temp_file.path())?;

    assert_eq!(config.consolidation.pace_ms, 250);
    assert_eq!(config.consolidation.chunk_size, 50_000);
    assert_eq!(config.consolidation.merge_policy, MergePolicy::PreferAssisted);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.base_delay_ms, 5000);

    let policy = RetryPolicy::from(&config.retry);
    assert_eq!(*policy.max_attempts(), 3);
    assert_eq!(policy.delays().len(), 2);
    Ok(())
}

#[test]
fn test_missing_file_is_a_config_error() {
    let result = LorebookConfig::from_file("/nonexistent/lorebook.toml");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Configuration Error"));
}

#[test]
fn test_invalid_policy_is_rejected() -> anyhow::Result<()> {
    let mut temp_file = Builder::new().suffix(".toml").tempfile()?;
    writeln!(temp_file, "[consolidation]\nchunk_failure_policy = \"explode\"")?;

    assert!(LorebookConfig::from_file(temp_file.path()).is_err());
    Ok(())
}
