//! Error types for the Lorebook crates.
//!
//! This crate provides the foundation error types used throughout the Lorebook workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error also answers [`RetryableError::is_rate_limited`], which the
//! retry policy uses to decide between backing off and failing fast.
//!
//! # Examples
//!
//! ```
//! use lorebook_error::{ExtractionError, ExtractionErrorKind, LorebookResult};
//!
//! fn parse_reply() -> LorebookResult<String> {
//!     Err(ExtractionError::new(ExtractionErrorKind::MalformedResponse(
//!         "No JSON found in response".to_string(),
//!     )))?
//! }
//!
//! match parse_reply() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod extraction;
mod gemini;
mod json;
mod retryable;

pub use config::ConfigError;
pub use error::{LorebookError, LorebookErrorKind, LorebookResult};
pub use extraction::{ExtractionError, ExtractionErrorKind};
pub use gemini::{GeminiError, GeminiErrorKind};
pub use json::JsonError;
pub use retryable::{RATE_LIMIT_PATTERNS, RetryableError, mentions_rate_limit};
