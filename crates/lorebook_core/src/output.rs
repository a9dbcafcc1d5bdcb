//! Output types from service responses.

use serde::{Deserialize, Serialize};

/// A piece of generated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output (structured replies arrive as JSON text).
    Text(String),

    /// Already-decoded JSON output, for drivers that parse on their side.
    Json(serde_json::Value),
}

impl Output {
    /// Render this output as the text the service sent.
    pub fn as_text(&self) -> String {
        match self {
            Output::Text(text) => text.clone(),
            Output::Json(value) => value.to_string(),
        }
    }
}
