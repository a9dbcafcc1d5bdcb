//! The chunk loop: extraction, consolidation, pacing and enrichment.

use crate::chunker::split_into_chunks;
use crate::enrichment::{apply_enrichment, select_sparse};
use crate::extraction::{ExtractionClient, ExtractionReply};
use crate::merge::merge_character;
use crate::prompts::{DEFAULT_ENRICHMENT_PROMPT, DEFAULT_EXTRACTION_PROMPT, build_extraction_prompt};
use crate::registry::{EntityRegistry, registry_key};
use lorebook_core::{
    AnalysisDebugLog, Character, ChunkFailurePolicy, EntitySet, MergePolicy, Scene,
};
use lorebook_error::LorebookResult;
use lorebook_interface::LorebookDriver;
use lorebook_rate_limit::{EnrichmentConfig, LorebookConfig, Pacer, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Share of the progress bar taken by the chunk loop.
const CHUNK_PROGRESS_CEILING: u8 = 90;

/// Settings fixed for the lifetime of a [`Consolidator`].
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::ConsolidationOptions;
/// use std::time::Duration;
///
/// let options = ConsolidationOptions::builder()
///     .chunk_size(20_000)
///     .pace(Duration::ZERO)
///     .build()
///     .unwrap();
/// assert_eq!(*options.chunk_size(), 20_000);
/// assert_eq!(*options.request_timeout(), Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq, derive_builder::Builder, derive_getters::Getters)]
#[builder(default)]
pub struct ConsolidationOptions {
    /// Maximum chunk length in characters
    chunk_size: usize,
    /// Minimum interval between chunk requests
    pace: Duration,
    /// Backoff applied to every service call
    retry: RetryPolicy,
    /// Deadline for a single service call
    request_timeout: Duration,
    /// Whether a timed-out call is retried like a rate-limit failure
    timeout_is_rate_limited: bool,
    /// Sampling temperature, driver default when `None`
    temperature: Option<f32>,
    /// How duplicate characters are merged
    merge_policy: MergePolicy,
    /// What a failed chunk does to the run
    chunk_failure_policy: ChunkFailurePolicy,
    /// Thresholds that select entities for enrichment
    enrichment: EnrichmentConfig,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        Self {
            chunk_size: 50_000,
            pace: Duration::from_millis(4000),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(120),
            timeout_is_rate_limited: false,
            temperature: None,
            merge_policy: MergePolicy::default(),
            chunk_failure_policy: ChunkFailurePolicy::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl ConsolidationOptions {
    /// Creates a new options builder.
    pub fn builder() -> ConsolidationOptionsBuilder {
        ConsolidationOptionsBuilder::default()
    }

    /// Options taken from a loaded configuration.
    pub fn from_config(config: &LorebookConfig) -> Self {
        Self {
            chunk_size: config.consolidation.chunk_size,
            pace: Duration::from_millis(config.consolidation.pace_ms),
            retry: config.retry_policy(),
            request_timeout: config.gemini.request_timeout(),
            timeout_is_rate_limited: config.gemini.timeout_is_rate_limited,
            temperature: Some(config.gemini.temperature),
            merge_policy: config.consolidation.merge_policy,
            chunk_failure_policy: config.consolidation.chunk_failure_policy,
            enrichment: config.enrichment.clone(),
        }
    }
}

/// Per-run inputs.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replaces the default extraction instructions when set
    pub prompt_override: Option<String>,
    /// Replaces the default enrichment instructions when set
    pub enrichment_prompt: Option<String>,
    /// Overrides the configured pace interval for this run
    pub pace: Option<Duration>,
    /// Entities from an earlier run to extend instead of starting empty
    pub seed: Option<EntitySet>,
}

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started
    Idle,
    /// Processing the chunk at this index
    Running(usize),
    /// Stopped early by the cancellation token
    Cancelled,
    /// Every chunk was processed
    Completed,
    /// Enrichment pass in progress
    Enriching,
    /// Finished
    Done,
    /// Stopped by a chunk failure under the abort policy
    Errored,
}

/// How a run ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunStatus {
    /// All chunks processed and at least one entity found
    Completed,
    /// Cancelled before the last chunk; entities are partial
    Cancelled,
    /// All chunks processed but nothing was found
    Empty,
    /// Stopped by a chunk failure; entities are partial
    Errored,
}

/// Result of [`Consolidator::run_extraction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    /// Consolidated characters in first-seen order
    pub characters: Vec<Character>,
    /// Consolidated scenes in first-seen order
    pub scenes: Vec<Scene>,
    /// One record per chunk attempt
    pub debug_log: Vec<AnalysisDebugLog>,
    /// How the run ended
    pub status: RunStatus,
    /// The failure that stopped an errored run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionOutcome {
    fn new(entities: EntitySet, debug_log: Vec<AnalysisDebugLog>, status: RunStatus) -> Self {
        Self {
            characters: entities.characters,
            scenes: entities.scenes,
            debug_log,
            status,
            error: None,
        }
    }

    /// Characters and scenes without the log.
    pub fn entity_set(&self) -> EntitySet {
        EntitySet::new(self.characters.clone(), self.scenes.clone())
    }
}

fn transition(state: &mut RunState, next: RunState) {
    match (*state, next) {
        (RunState::Running(_), RunState::Running(_)) => {
            debug!(from = ?*state, to = ?next, "Run state transition")
        }
        _ => info!(from = ?*state, to = ?next, "Run state transition"),
    }
    *state = next;
}

fn chunk_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = index * usize::from(CHUNK_PROGRESS_CEILING) / total;
    u8::try_from(percent).unwrap_or(CHUNK_PROGRESS_CEILING)
}

/// Runs extraction over a document and consolidates the results.
///
/// Chunks are processed strictly in order by a single task: each prompt
/// carries a summary of everything merged from earlier chunks.
///
/// # Examples
///
/// ```no_run
/// use lorebook_consolidation::{ConsolidationOptions, Consolidator, RunOptions};
/// use lorebook_models::GeminiClient;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(novel: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let consolidator = Consolidator::new(GeminiClient::new()?, ConsolidationOptions::default());
/// let outcome = consolidator
///     .run_extraction(
///         novel,
///         &RunOptions::default(),
///         |percent, status| println!("{percent:>3}% {status}"),
///         &CancellationToken::new(),
///     )
///     .await?;
/// println!("{} characters, {} scenes", outcome.characters.len(), outcome.scenes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Consolidator<D> {
    client: ExtractionClient<D>,
    options: ConsolidationOptions,
}

impl<D: LorebookDriver> Consolidator<D> {
    /// Create a consolidator around a driver.
    pub fn new(driver: D, options: ConsolidationOptions) -> Self {
        let client = ExtractionClient::new(driver)
            .with_retry_policy(options.retry)
            .with_request_timeout(options.request_timeout)
            .with_timeout_is_rate_limited(options.timeout_is_rate_limited)
            .with_temperature(options.temperature);
        Self { client, options }
    }

    /// The extraction client used for every call.
    pub fn client(&self) -> &ExtractionClient<D> {
        &self.client
    }

    /// The options this consolidator was built with.
    pub fn options(&self) -> &ConsolidationOptions {
        &self.options
    }

    /// Extract and consolidate every character and scene in `text`.
    ///
    /// `progress` is called at least once per chunk with a percentage and a
    /// status line. `cancel` is checked before each chunk and during pacing;
    /// a call already sent is allowed to finish. Cancellation, an empty
    /// result and (under the default policy) chunk failures are not errors:
    /// they are reported through [`ExtractionOutcome::status`] and the debug log.
    #[instrument(
        skip_all,
        fields(
            text_len = text.len(),
            chunk_size = self.options.chunk_size,
            merge_policy = %self.options.merge_policy,
        )
    )]
    pub async fn run_extraction<P>(
        &self,
        text: &str,
        run: &RunOptions,
        progress: P,
        cancel: &CancellationToken,
    ) -> LorebookResult<ExtractionOutcome>
    where
        P: Fn(u8, &str),
    {
        let chunks = split_into_chunks(text, self.options.chunk_size);
        let total = chunks.len();
        let pacer = Pacer::new(run.pace.unwrap_or(self.options.pace));
        let instructions = run
            .prompt_override
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_EXTRACTION_PROMPT);

        let mut registry = run
            .seed
            .clone()
            .map(EntityRegistry::seeded)
            .unwrap_or_default();
        let mut debug_log = Vec::with_capacity(total);
        let mut state = RunState::Idle;
        let mut cancelled = false;

        info!(chunks = total, seeded = registry.len(), "Starting extraction run");

        for (index, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            transition(&mut state, RunState::Running(index));
            progress(
                chunk_percent(index, total),
                &format!("Processing chunk {}/{}", index + 1, total),
            );

            let started = Instant::now();
            let context = registry.context_summary();
            let echoed_prompt =
                (index == 0).then(|| build_extraction_prompt(instructions, &context, chunk));

            let (entry, failure) = match self
                .client
                .extract_raw(instructions, &context, chunk)
                .await
            {
                Ok(raw) => match ExtractionReply::parse(raw.clone()) {
                    Ok(reply) => {
                        let entry =
                            AnalysisDebugLog::success(index, reply.raw.clone(), reply.value.clone());
                        self.fold_reply(&mut registry, reply, index).await;
                        (entry, None)
                    }
                    Err(e) => {
                        warn!(chunk = index, error = %e, "Unparseable reply, skipping chunk");
                        (AnalysisDebugLog::failure(index, raw, e.to_string()), Some(e))
                    }
                },
                Err(e) => {
                    warn!(chunk = index, error = %e, "Extraction call failed, skipping chunk");
                    (AnalysisDebugLog::failure(index, "", e.to_string()), Some(e))
                }
            };

            debug_log.push(match echoed_prompt {
                Some(prompt) => entry.with_prompt(prompt),
                None => entry,
            });

            if let (Some(e), ChunkFailurePolicy::Abort) =
                (failure, self.options.chunk_failure_policy)
            {
                transition(&mut state, RunState::Errored);
                progress(
                    chunk_percent(index, total),
                    &format!("Stopped at chunk {}/{}: {}", index + 1, total, e),
                );
                let mut outcome = ExtractionOutcome::new(
                    registry.into_entity_set(),
                    debug_log,
                    RunStatus::Errored,
                );
                outcome.error = Some(e.to_string());
                return Ok(outcome);
            }

            if index + 1 < total && !pacer.pace(started, cancel).await {
                cancelled = true;
                break;
            }
        }

        if cancelled {
            transition(&mut state, RunState::Cancelled);
            info!(
                characters = registry.character_count(),
                scenes = registry.scene_count(),
                "Run cancelled, returning partial result"
            );
            progress(
                chunk_percent(debug_log.len(), total),
                &format!(
                    "Cancelled after {} of {} chunks",
                    debug_log.len(),
                    total
                ),
            );
            return Ok(ExtractionOutcome::new(
                registry.into_entity_set(),
                debug_log,
                RunStatus::Cancelled,
            ));
        }

        transition(&mut state, RunState::Completed);

        if registry.is_empty() {
            warn!(chunks = total, "No characters or scenes found");
            progress(100, "Warning: no characters or scenes were found");
            return Ok(ExtractionOutcome::new(
                EntitySet::default(),
                debug_log,
                RunStatus::Empty,
            ));
        }

        transition(&mut state, RunState::Enriching);
        progress(CHUNK_PROGRESS_CEILING, "Enriching sparse entities");

        let consolidated = registry.into_entity_set();
        let entities = match self
            .run_enrichment(consolidated.clone(), run.enrichment_prompt.as_deref())
            .await
        {
            Ok(enriched) => enriched,
            Err(e) => {
                warn!(error = %e, "Enrichment failed, keeping consolidated result");
                consolidated
            }
        };

        transition(&mut state, RunState::Done);
        progress(
            100,
            &format!(
                "Done: {} characters, {} scenes",
                entities.characters.len(),
                entities.scenes.len()
            ),
        );

        Ok(ExtractionOutcome::new(
            entities,
            debug_log,
            RunStatus::Completed,
        ))
    }

    /// Merge one parsed reply into the registry.
    async fn fold_reply(&self, registry: &mut EntityRegistry, reply: ExtractionReply, index: usize) {
        let entities = reply.payload.into_entity_set(index);
        debug!(
            chunk = index,
            characters = entities.characters.len(),
            scenes = entities.scenes.len(),
            "Folding reply into registry"
        );

        for character in entities.characters {
            let key = registry_key(&character.group_name, &character.name);
            let existing = match self.options.merge_policy {
                MergePolicy::PreferAssisted => registry.get_character(&key).cloned(),
                MergePolicy::Deterministic => None,
            };

            match existing {
                Some(existing) => {
                    let merged = self.assisted_merge(existing, character).await;
                    registry.replace_character(&key, merged);
                }
                None => {
                    registry.upsert_character(character);
                }
            }
        }

        for scene in entities.scenes {
            registry.upsert_scene(scene);
        }
    }

    /// Service-assisted merge folded over the local merge.
    ///
    /// Falls back to the local merge when the call fails.
    async fn assisted_merge(&self, existing: Character, incoming: Character) -> Character {
        let assisted = self.client.merge_characters(&existing, &incoming).await;
        let deterministic = merge_character(existing, incoming);
        match assisted {
            Ok(ai) => merge_character(deterministic, ai),
            Err(e) => {
                warn!(
                    group = %deterministic.group_name,
                    error = %e,
                    "Assisted merge failed, using local merge"
                );
                deterministic
            }
        }
    }

    /// Fill in detail on the sparse entities of `entities`.
    ///
    /// Returns the input unchanged when nothing is sparse. Records are never
    /// added or removed and text fields never get shorter.
    ///
    /// # Errors
    ///
    /// Returns the service or parse error of the enrichment call.
    #[instrument(skip_all, fields(characters = entities.characters.len(), scenes = entities.scenes.len()))]
    pub async fn run_enrichment(
        &self,
        entities: EntitySet,
        prompt_override: Option<&str>,
    ) -> LorebookResult<EntitySet> {
        let sparse = select_sparse(&entities, &self.options.enrichment);
        if sparse.is_empty() {
            debug!("Nothing to enrich");
            return Ok(entities);
        }

        info!(
            characters = sparse.characters.len(),
            scenes = sparse.scenes.len(),
            "Enriching sparse entities"
        );
        let instructions = prompt_override
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_ENRICHMENT_PROMPT);
        let reply = self.client.enrich(&sparse, instructions).await?;
        Ok(apply_enrichment(entities, reply.payload.into_entity_set(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_progress_stays_below_enrichment() {
        assert_eq!(chunk_percent(0, 4), 0);
        assert_eq!(chunk_percent(2, 4), 45);
        assert_eq!(chunk_percent(3, 4), 67);
        assert_eq!(chunk_percent(0, 0), 0);
    }

    #[test]
    fn test_options_follow_configuration() {
        let mut config = LorebookConfig::default();
        config.consolidation.pace_ms = 0;
        config.consolidation.merge_policy = MergePolicy::PreferAssisted;
        config.retry.max_attempts = 2;

        let options = ConsolidationOptions::from_config(&config);
        assert_eq!(*options.pace(), Duration::ZERO);
        assert_eq!(*options.merge_policy(), MergePolicy::PreferAssisted);
        assert_eq!(*options.retry().max_attempts(), 2);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RunStatus::Empty.to_string(), "empty");
        assert_eq!(
            serde_json::to_value(RunStatus::Cancelled).unwrap(),
            serde_json::json!("cancelled")
        );
    }
}
