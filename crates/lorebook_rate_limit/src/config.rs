//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from lorebook.toml)
//! - `~/.config/lorebook/lorebook.toml`
//! - `./lorebook.toml`
//!
//! Every key is optional in user files; missing keys keep the bundled value.

use crate::RetryPolicy;
use lorebook_core::{ChunkFailurePolicy, MergePolicy};
use lorebook_error::{ConfigError, LorebookError, LorebookResult};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Chunk loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Minimum interval between service requests, in milliseconds
    pub pace_ms: u64,
    /// How duplicate characters are merged
    pub merge_policy: MergePolicy,
    /// What a failed chunk does to the run
    pub chunk_failure_policy: ChunkFailurePolicy,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50_000,
            pace_ms: 4000,
            merge_policy: MergePolicy::default(),
            chunk_failure_policy: ChunkFailurePolicy::default(),
        }
    }
}

/// Retry and backoff settings.
///
/// ```toml
/// [retry]
/// max_attempts = 5
/// base_delay_ms = 5000
/// max_jitter_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total calls allowed per request, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter added to each delay
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 5000,
            max_jitter_ms: 2000,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_jitter_ms),
        )
    }
}

/// Thresholds that select entities for the enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Descriptions shorter than this (in characters) count as sparse
    pub min_description_chars: usize,
    /// Visual text shorter than this (in characters) counts as sparse
    pub min_visual_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            min_description_chars: 30,
            min_visual_chars: 20,
        }
    }
}

/// Gemini driver settings. The API key is read from `GEMINI_API_KEY`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model identifier
    pub model: String,
    /// Per-call deadline in seconds
    pub request_timeout_secs: u64,
    /// Whether a timed-out call is retried like a rate-limit failure
    pub timeout_is_rate_limited: bool,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            request_timeout_secs: 120,
            timeout_is_rate_limited: false,
            temperature: 0.3,
        }
    }
}

impl GeminiConfig {
    /// Per-call deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level Lorebook configuration.
///
/// # Example
///
/// ```no_run
/// use lorebook_rate_limit::{LorebookConfig, RetryPolicy};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = LorebookConfig::load()?;
/// let policy = RetryPolicy::from(&config.retry);
/// println!("chunk size: {}", config.consolidation.chunk_size);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LorebookConfig {
    /// Chunk loop settings
    pub consolidation: ConsolidationConfig,
    /// Retry and backoff settings
    pub retry: RetryConfig,
    /// Enrichment thresholds
    pub enrichment: EnrichmentConfig,
    /// Gemini driver settings
    pub gemini: GeminiConfig,
}

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../lorebook.toml");

impl LorebookConfig {
    /// Load the bundled defaults overlaid with one explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LorebookResult<Self> {
        debug!("Loading configuration from file");

        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                LorebookError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?;

        Self::deserialize_config(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> LorebookResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/lorebook/lorebook.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("lorebook").required(false));

        let config = builder.build().map_err(|e| {
            LorebookError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?;

        Self::deserialize_config(config)
    }

    /// Parse only the bundled defaults.
    pub fn bundled() -> LorebookResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(|e| {
                LorebookError::from(ConfigError::new(format!(
                    "Failed to read bundled configuration: {}",
                    e
                )))
            })?;

        Self::deserialize_config(config)
    }

    fn deserialize_config(config: Config) -> LorebookResult<Self> {
        config.try_deserialize().map_err(|e| {
            LorebookError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
    }

    /// Retry policy built from the `[retry]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }
}
