//! Request and response types for schema-constrained generation.

use crate::{Message, Output};
use serde::{Deserialize, Serialize};

/// A generation request, optionally constrained to a JSON response schema.
///
/// # Examples
///
/// ```
/// use lorebook_core::{GenerateRequest, Message, Role};
/// use serde_json::json;
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::new(Role::User, "List the characters.")])
///     .temperature(Some(0.2))
///     .response_schema(Some(json!({"type": "OBJECT"})))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert!(request.response_schema().is_some());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    temperature: Option<f32>,
    /// Model identifier to use (driver default when `None`)
    model: Option<String>,
    /// JSON schema the reply must conform to
    response_schema: Option<serde_json::Value>,
}

impl GenerateRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use lorebook_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("{\"characters\": []}".to_string())],
/// };
///
/// assert_eq!(response.text(), "{\"characters\": []}");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenated text of every output, in order.
    pub fn text(&self) -> String {
        self.outputs.iter().map(Output::as_text).collect()
    }
}
