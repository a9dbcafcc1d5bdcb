//! Incremental entity consolidation for long narrative text.
//!
//! A document is split into chunks and sent to a generative-text service one
//! chunk at a time. Each reply is folded into an [`EntityRegistry`] keyed by
//! group and name, so a character met under three names in three chapters
//! ends up as one record. After the last chunk, entities with thin
//! descriptions go through a single enrichment call.
//!
//! # Components
//!
//! - [`split_into_chunks`]: character-bounded chunking
//! - [`normalize_age`], [`is_similar`]: attribute normalization
//! - [`merge_character`], [`merge_weapons`], [`merge_clothing`]: deterministic merging
//! - [`ExtractionClient`]: schema-constrained calls with timeout and retry
//! - [`Consolidator`]: the chunk loop with pacing, progress and cancellation
//!
//! # Example
//!
//! ```rust,ignore
//! use lorebook_consolidation::{ConsolidationOptions, Consolidator, RunOptions};
//! use lorebook_models::GeminiClient;
//! use tokio_util::sync::CancellationToken;
//!
//! let consolidator = Consolidator::new(GeminiClient::new()?, ConsolidationOptions::default());
//! let outcome = consolidator
//!     .run_extraction(&novel, &RunOptions::default(), |_, _| {}, &CancellationToken::new())
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunker;
mod enrichment;
mod extraction;
mod merge;
mod normalize;
mod orchestrator;
mod payload;
mod prompts;
mod registry;
mod schema;
pub mod vocabulary;

pub use chunker::split_into_chunks;
pub use enrichment::{apply_enrichment, is_sparse_character, is_sparse_scene, select_sparse};
pub use extraction::{ExtractionClient, ExtractionReply, extract_json, parse_json};
pub use merge::{
    TIE_DELIMITER, enrich_character, enrich_scene, merge_aliases, merge_character,
    merge_clothing, merge_scene, merge_text, merge_weapons, prefer_longer,
};
pub use normalize::{SimilarityProfile, core_words, is_similar, normalize_age, strip_suffixes};
pub use orchestrator::{
    ConsolidationOptions, ConsolidationOptionsBuilder, Consolidator, ExtractionOutcome,
    RunOptions, RunState, RunStatus,
};
pub use payload::{
    ExtractionPayload, RawCharacter, RawClothingStyle, RawScene, RawWeapon, character_to_value,
};
pub use prompts::{
    DEFAULT_ENRICHMENT_PROMPT, DEFAULT_EXTRACTION_PROMPT, DEFAULT_MERGE_PROMPT,
    build_enrichment_prompt, build_extraction_prompt, build_merge_prompt,
};
pub use registry::{EntityRegistry, KEY_SEPARATORS, Upsert, normalize_key_part, registry_key};
pub use schema::{
    CHARACTER_SCHEMA, EXTRACTION_SCHEMA, character_schema, clothing_schema, scene_schema,
    weapon_schema,
};
