//! Lorebook: a consolidated visual bible from long narrative text.
//!
//! Lorebook reads a novel-length document chunk by chunk, asks a
//! generative-text service for the characters and scenes in each chunk, and
//! merges every sighting of the same entity into one record. The result is a
//! list of characters (names, aliases, age bracket, looks, outfits, weapons)
//! and scenes (locations, sub-areas, atmosphere) ready for image prompts.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lorebook::{
//!     CancellationToken, ConsolidationOptions, Consolidator, GeminiClient, LorebookConfig,
//!     RunOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LorebookConfig::load()?;
//!     let consolidator = Consolidator::new(
//!         GeminiClient::new()?,
//!         ConsolidationOptions::from_config(&config),
//!     );
//!
//!     let novel = std::fs::read_to_string("novel.txt")?;
//!     let outcome = consolidator
//!         .run_extraction(&novel, &RunOptions::default(), |_, _| {}, &CancellationToken::new())
//!         .await?;
//!     println!("{} characters", outcome.characters.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `lorebook_error` - Error types
//! - `lorebook_core` - Entity model, request types, logging setup
//! - `lorebook_interface` - `LorebookDriver` trait
//! - `lorebook_rate_limit` - Retry policy, pacing, configuration
//! - `lorebook_models` - Gemini driver
//! - `lorebook_consolidation` - Chunking, normalization, merging, orchestration
//!
//! This crate (`lorebook`) re-exports everything for convenience.

pub use lorebook_consolidation::*;
pub use lorebook_core::*;
pub use lorebook_error::*;
pub use lorebook_interface::*;
pub use lorebook_models::*;
pub use lorebook_rate_limit::*;
pub use tokio_util::sync::CancellationToken;
