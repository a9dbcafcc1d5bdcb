//! Schema-constrained calls to the generative-text service.
//!
//! [`ExtractionClient`] wraps any [`LorebookDriver`] with a per-call timeout
//! and the shared [`RetryPolicy`]. Replies are recovered from markdown fences
//! or surrounding prose before they are parsed.

use crate::payload::{ExtractionPayload, RawCharacter, character_to_value};
use crate::prompts::{build_enrichment_prompt, build_extraction_prompt, build_merge_prompt};
use crate::schema::{CHARACTER_SCHEMA, EXTRACTION_SCHEMA};
use lorebook_core::{Character, EntitySet, GenerateRequest, Message, Role};
use lorebook_error::{
    ExtractionError, ExtractionErrorKind, JsonError, LorebookError, LorebookResult,
};
use lorebook_interface::LorebookDriver;
use lorebook_rate_limit::RetryPolicy;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Extract JSON from a reply that may contain markdown or extra text.
///
/// Tries, in order: a fenced code block, the first balanced `{...}` object,
/// then the first balanced `[...]` array.
///
/// # Errors
///
/// Returns [`ExtractionErrorKind::MalformedResponse`] if no JSON is found.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::extract_json;
///
/// let reply = "Here you go:\n```json\n{\"characters\": []}\n```\nAnything else?";
/// assert_eq!(extract_json(reply).unwrap(), "{\"characters\": []}");
///
/// let reply = "Result: {\"scenes\": [{\"name\": \"Inn\"}]} done.";
/// assert!(extract_json(reply).unwrap().starts_with("{\"scenes\""));
/// ```
pub fn extract_json(response: &str) -> LorebookResult<String> {
    let trimmed = response.trim();
    if trimmed.starts_with('{') && serde_json::from_str::<Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    if let Some(json) = extract_from_code_block(response) {
        return Ok(json);
    }

    if let Some(json) =
        extract_balanced(response, '{', '}').or_else(|| extract_balanced(response, '[', ']'))
    {
        return Ok(json);
    }

    warn!(response_length = response.len(), "No JSON found in service reply");
    Err(ExtractionError::new(ExtractionErrorKind::MalformedResponse(format!(
        "no JSON found in reply of {} bytes",
        response.len()
    )))
    .into())
}

/// Content of the first fenced code block, with or without a language tag.
///
/// An unterminated fence (a truncated reply) yields everything after it.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let after_fence = start + 3;
    let body_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);

    let body = match response[body_start..].find("```") {
        Some(end) => &response[body_start..body_start + end],
        None => &response[body_start..],
    };
    let body = body.trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Text from the first `open` to its matching `close`, skipping string contents.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse JSON into `T`.
///
/// # Errors
///
/// Returns [`ExtractionErrorKind::MalformedResponse`] with a short preview of
/// the offending text.
///
/// # Examples
///
/// ```
/// use lorebook_consolidation::{ExtractionPayload, parse_json};
///
/// let payload: ExtractionPayload = parse_json(r#"{"characters": [{"name": "Lin"}]}"#).unwrap();
/// assert_eq!(payload.characters[0].name, "Lin");
/// ```
pub fn parse_json<T>(json_str: &str) -> LorebookResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let preview: String = json_str.chars().take(100).collect();
        warn!(error = %e, json_preview = %preview, "JSON parsing failed");
        ExtractionError::new(ExtractionErrorKind::MalformedResponse(format!(
            "{e} (JSON: {preview}...)"
        )))
        .into()
    })
}

/// A parsed extraction or enrichment reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReply {
    /// Reply text exactly as received
    pub raw: String,
    /// The JSON that was recovered from `raw`
    pub value: Value,
    /// Typed view of `value`
    pub payload: ExtractionPayload,
}

impl ExtractionReply {
    /// Recover and parse the JSON in `raw`.
    ///
    /// A bare top-level array is read as a list of characters.
    pub fn parse(raw: impl Into<String>) -> LorebookResult<Self> {
        let raw = raw.into();
        let json = extract_json(&raw)?;
        let value: Value = parse_json(&json)?;

        let payload = match &value {
            Value::Object(_) => parse_json_value(value.clone())?,
            Value::Array(_) => parse_json_value(serde_json::json!({ "characters": value }))?,
            other => {
                return Err(ExtractionError::new(ExtractionErrorKind::MalformedResponse(
                    format!("expected an object, got {other}"),
                ))
                .into());
            }
        };

        Ok(Self {
            raw,
            value,
            payload,
        })
    }
}

fn parse_json_value<T: serde::de::DeserializeOwned>(value: Value) -> LorebookResult<T> {
    serde_json::from_value(value).map_err(|e| {
        ExtractionError::new(ExtractionErrorKind::MalformedResponse(e.to_string())).into()
    })
}

/// Calls the service with a response schema, a timeout and retries.
///
/// # Examples
///
/// ```no_run
/// use lorebook_consolidation::{ExtractionClient, DEFAULT_EXTRACTION_PROMPT};
/// use lorebook_models::GeminiClient;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ExtractionClient::new(GeminiClient::new()?)
///     .with_request_timeout(Duration::from_secs(60));
/// let reply = client
///     .extract(DEFAULT_EXTRACTION_PROMPT, "", "Lin drew her sword.")
///     .await?;
/// println!("{} characters", reply.payload.characters.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionClient<D> {
    driver: D,
    retry: RetryPolicy,
    request_timeout: Duration,
    timeout_is_rate_limited: bool,
    temperature: Option<f32>,
}

impl<D: LorebookDriver> ExtractionClient<D> {
    /// Client with the default retry policy and a 120 second timeout.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(120),
            timeout_is_rate_limited: false,
            temperature: None,
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Deadline for a single attempt.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Whether an attempt that times out counts as rate limited (and is retried).
    pub fn with_timeout_is_rate_limited(mut self, rate_limited: bool) -> Self {
        self.timeout_is_rate_limited = rate_limited;
        self
    }

    /// Sampling temperature sent with each request; the driver default when unset.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The retry policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn request(&self, prompt: &str, schema: &Value) -> LorebookResult<GenerateRequest> {
        GenerateRequest::builder()
            .messages(vec![Message::new(Role::User, prompt)])
            .temperature(self.temperature)
            .response_schema(Some(schema.clone()))
            .build()
            .map_err(|e| {
                ExtractionError::new(ExtractionErrorKind::RequestBuild(e.to_string())).into()
            })
    }

    /// One round trip, retried under the policy. Returns the reply text.
    ///
    /// # Errors
    ///
    /// - [`ExtractionErrorKind::ServiceOverloaded`] when every attempt was rate limited
    /// - [`ExtractionErrorKind::Timeout`] when a non-retried attempt ran out of time
    /// - [`ExtractionErrorKind::EmptyResponse`] when the reply had no text
    /// - the driver's own error for any other failure
    #[instrument(skip(self, prompt, schema), fields(provider = self.driver.provider_name(), prompt_len = prompt.len()))]
    pub async fn call(&self, prompt: &str, schema: &Value) -> LorebookResult<String> {
        let request = self.request(prompt, schema)?;
        let request = &request;
        let driver = &self.driver;
        let timeout = self.request_timeout;
        let rate_limited = self.timeout_is_rate_limited;

        let text = self
            .retry
            .execute("generate", move || async move {
                let outcome: LorebookResult<String> =
                    match tokio::time::timeout(timeout, driver.generate(request)).await {
                        Ok(response) => response.map(|r| r.text()),
                        Err(_) => {
                            warn!(timeout_ms = timeout.as_millis() as u64, "Service call timed out");
                            Err(LorebookError::from(ExtractionError::new(
                                ExtractionErrorKind::Timeout {
                                    elapsed_ms: timeout.as_millis() as u64,
                                    rate_limited,
                                },
                            )))
                        }
                    };
                outcome
            })
            .await?;

        if text.trim().is_empty() {
            return Err(ExtractionError::new(ExtractionErrorKind::EmptyResponse).into());
        }

        debug!(response_len = text.len(), "Received reply");
        Ok(text)
    }

    /// Send one chunk and return the raw reply text.
    ///
    /// Kept separate from parsing so callers can log the text of replies
    /// that fail to parse.
    pub async fn extract_raw(
        &self,
        instructions: &str,
        context: &str,
        chunk: &str,
    ) -> LorebookResult<String> {
        let prompt = build_extraction_prompt(instructions, context, chunk);
        self.call(&prompt, &EXTRACTION_SCHEMA).await
    }

    /// Extract the characters and scenes in one chunk.
    #[instrument(skip_all, fields(chunk_len = chunk.len(), context_len = context.len()))]
    pub async fn extract(
        &self,
        instructions: &str,
        context: &str,
        chunk: &str,
    ) -> LorebookResult<ExtractionReply> {
        let raw = self.extract_raw(instructions, context, chunk).await?;
        ExtractionReply::parse(raw)
    }

    /// Ask the service to fill in detail on already-consolidated entities.
    #[instrument(skip_all, fields(characters = entities.characters.len(), scenes = entities.scenes.len()))]
    pub async fn enrich(
        &self,
        entities: &EntitySet,
        instructions: &str,
    ) -> LorebookResult<ExtractionReply> {
        let entities_json =
            serde_json::to_string_pretty(entities).map_err(|e| JsonError::new(e.to_string()))?;
        let prompt = build_enrichment_prompt(instructions, &entities_json);
        let raw = self.call(&prompt, &EXTRACTION_SCHEMA).await?;
        ExtractionReply::parse(raw)
    }

    /// Ask the service to reconcile two records of the same character.
    ///
    /// The result keeps the identity of `existing`; callers normally fold it
    /// over the deterministic merge so nothing is lost.
    #[instrument(skip_all, fields(group = %existing.group_name))]
    pub async fn merge_characters(
        &self,
        existing: &Character,
        incoming: &Character,
    ) -> LorebookResult<Character> {
        let existing_json = character_to_value(existing).to_string();
        let incoming_json = character_to_value(incoming).to_string();
        let prompt = build_merge_prompt(&existing_json, &incoming_json);

        let raw = self.call(&prompt, &CHARACTER_SCHEMA).await?;
        let json = extract_json(&raw)?;
        let merged: RawCharacter = parse_json(&json)?;

        let mut merged = merged.into_character(0, 0);
        merged.id = existing.id.clone();
        merged.group_name = existing.group_name.clone();
        merged.name = existing.name.clone();
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"
Here's the JSON you requested:

```json
{
  "characters": [{"name": "Lin"}]
}
```

Hope this helps!
"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("\"characters\""));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_balanced_braces() {
        let response = r#"Sure! Here it is: {"scenes": [{"name": "Inn", "nested": {"a": 1}}]} Bye."#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(serde_json::from_str::<Value>(&json).is_ok());
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let response = r#"{"characters": [{"description": "wears a } shaped \"pin\""}]}"#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_truncated_fence_yields_remainder() {
        let response = "```json\n{\"characters\": []}";
        assert_eq!(extract_json(response).unwrap(), "{\"characters\": []}");
    }

    #[test]
    fn test_no_json_found() {
        let err = extract_json("I could not find anyone in this passage.").unwrap_err();
        assert!(format!("{err}").contains("no JSON found"));
    }

    #[test]
    fn test_reply_parse_accepts_bare_array() {
        let reply = ExtractionReply::parse(r#"[{"name": "Lin"}]"#).unwrap();
        assert_eq!(reply.payload.characters.len(), 1);
        assert!(reply.payload.scenes.is_empty());
    }

    #[test]
    fn test_reply_parse_rejects_bad_json() {
        assert!(ExtractionReply::parse("{\"characters\": [").is_err());
    }
}
