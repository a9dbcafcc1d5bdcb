//! Google Gemini REST client.
//!
//! # Example
//!
//! ```no_run
//! use lorebook_models::GeminiClient;
//! use lorebook_core::{GenerateRequest, Message, Role};
//! use lorebook_interface::LorebookDriver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new()?.with_model("gemini-2.5-pro");
//!
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::new(Role::User, "Hello")])
//!     .model(Some("gemini-2.5-flash".to_string()))
//!     .build()?;
//! let response = client.generate(&request).await?;
//! # Ok(())
//! # }
//! ```

use super::GeminiResult;
use super::conversion::{from_gemini_response, status_error, to_gemini_request};
use super::dto::GeminiResponse;
use async_trait::async_trait;
use lorebook_core::{GenerateRequest, GenerateResponse};
use lorebook_error::{GeminiError, GeminiErrorKind, LorebookResult};
use lorebook_interface::LorebookDriver;
use reqwest::Client;
use std::env;
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini `generateContent` endpoint.
///
/// Retries are not handled here. Every failure is returned with its HTTP
/// status and body intact so the caller's retry policy can classify it.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    /// Default model name when `req.model` is None
    model_name: String,
    /// Applied when a request leaves temperature unset
    temperature: Option<f32>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client using `GEMINI_API_KEY` from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not set or the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn new() -> GeminiResult<Self> {
        let api_key =
            env::var("GEMINI_API_KEY").map_err(|_| GeminiError::new(GeminiErrorKind::MissingApiKey))?;
        Self::with_api_key(api_key)
    }

    /// Create a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn with_api_key(api_key: impl Into<String>) -> GeminiResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::MissingApiKey));
        }

        let client = Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            temperature: None,
        })
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    /// Set the default temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Internal generate method that returns Gemini-specific errors.
    #[instrument(skip(self, req), fields(model = tracing::field::Empty))]
    async fn generate_internal(&self, req: &GenerateRequest) -> GeminiResult<GenerateResponse> {
        let model_name = req.model().as_deref().unwrap_or(&self.model_name);
        tracing::Span::current().record("model", model_name);

        let body = to_gemini_request(req, self.temperature);
        let url = self.endpoint(model_name);
        debug!(url = %url, structured = req.response_schema().is_some(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini returned an error status");
            return Err(status_error(status.as_u16(), error_text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::Transport(e.to_string())))?;
        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            GeminiError::new(GeminiErrorKind::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        from_gemini_response(&parsed)
    }
}

#[async_trait]
impl LorebookDriver for GeminiClient {
    async fn generate(&self, req: &GenerateRequest) -> LorebookResult<GenerateResponse> {
        self.generate_internal(req).await.map_err(Into::into)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    /// Returns the default model name used when `GenerateRequest.model` is None.
    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected() {
        let err = GeminiClient::with_api_key("  ").unwrap_err();
        assert_eq!(err.kind, GeminiErrorKind::MissingApiKey);
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        let client = GeminiClient::with_api_key("key")
            .unwrap()
            .with_base_url("http://localhost:8080/v1beta/");
        assert_eq!(
            client.endpoint("models/gemini-2.5-pro"),
            "http://localhost:8080/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GeminiClient::with_api_key("secret-key").unwrap();
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
