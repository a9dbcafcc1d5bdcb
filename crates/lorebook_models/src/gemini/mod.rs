//! Google Gemini REST driver.
//!
//! Talks to the `generateContent` endpoint directly so that raw HTTP status
//! codes and error bodies reach the retry classifier, and so that
//! `responseSchema` can constrain replies to the entity shapes.

mod client;
mod conversion;
mod dto;

pub use client::GeminiClient;
pub use dto::{
    Candidate, Content, GeminiRequest, GeminiResponse, GenerationConfig, Part, PromptFeedback,
};

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, lorebook_error::GeminiError>;
