//! Audit trail of every extraction attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One record per chunk attempt, successful or not.
///
/// Records are appended by the orchestrator and never mutated afterwards.
/// The prompt is echoed for the first chunk only to keep the log bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDebugLog {
    /// When the attempt finished
    timestamp: DateTime<Utc>,
    /// Zero-based chunk index
    chunk_index: usize,
    /// Raw service response text (empty when the call itself failed)
    raw_response: String,
    /// Parsed payload, or null when parsing failed
    parsed_payload: Option<serde_json::Value>,
    /// Error detail for failed attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Prompt sent with the request, only recorded for chunk 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

impl AnalysisDebugLog {
    /// Record a parsed reply.
    pub fn success(
        chunk_index: usize,
        raw_response: impl Into<String>,
        parsed_payload: serde_json::Value,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            chunk_index,
            raw_response: raw_response.into(),
            parsed_payload: Some(parsed_payload),
            error: None,
            prompt: None,
        }
    }

    /// Record a failed attempt. `raw_response` is whatever text arrived, if any.
    pub fn failure(
        chunk_index: usize,
        raw_response: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            chunk_index,
            raw_response: raw_response.into(),
            parsed_payload: None,
            error: Some(error.into()),
            prompt: None,
        }
    }

    /// Attach the prompt that produced this record.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Whether the attempt produced a parsed payload.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.parsed_payload.is_some()
    }
}
