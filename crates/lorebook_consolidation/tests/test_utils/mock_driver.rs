//! Scripted driver for testing.

use async_trait::async_trait;
use lorebook_core::{GenerateRequest, GenerateResponse, Output};
use lorebook_error::{GeminiError, GeminiErrorKind, LorebookError, LorebookResult};
use lorebook_interface::LorebookDriver;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Behavior configuration for mock responses.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return success with the given text
    Success(String),
    /// Always return the specified error
    Error(GeminiErrorKind),
    /// Return a sequence of responses (errors or success)
    Sequence(Vec<MockResponse>),
}

/// A single mock response (success or error).
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(GeminiErrorKind),
}

impl MockResponse {
    /// Success with a JSON value rendered as text.
    #[allow(dead_code)]
    pub fn json(value: serde_json::Value) -> Self {
        MockResponse::Success(value.to_string())
    }

    /// HTTP failure with the given status.
    #[allow(dead_code)]
    pub fn status(status_code: u16, message: &str) -> Self {
        MockResponse::Error(GeminiErrorKind::HttpError {
            status_code,
            message: message.to_string(),
        })
    }
}

/// Scripted [`LorebookDriver`] that records every request it receives.
///
/// Clones share the call counter and request log, so a test can keep one
/// handle while the consolidator owns another.
#[derive(Debug, Clone)]
pub struct MockDriver {
    behavior: MockBehavior,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    latency: Duration,
    cancel_after: Option<(usize, CancellationToken)>,
}

#[allow(dead_code)]
impl MockDriver {
    /// Create a mock with custom behavior.
    pub fn new_with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            latency: Duration::from_millis(1),
            cancel_after: None,
        }
    }

    /// Create a mock that always succeeds with the given text.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new_with_behavior(MockBehavior::Success(text.into()))
    }

    /// Create a mock that always fails with the given error.
    pub fn new_error(error: GeminiErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::Error(error))
    }

    /// Create a mock with a sequence of responses.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self::new_with_behavior(MockBehavior::Sequence(responses))
    }

    /// Simulated time each call takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Cancel `token` once `calls` calls have completed.
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Get the number of times generate() was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the user prompt of request `index`.
    pub fn prompt(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index]
            .messages()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }

    fn next_response(&self) -> LorebookResult<GenerateResponse> {
        let mut count = self.call_count.lock().unwrap();
        let current_count = *count;
        *count += 1;

        let reply = match &self.behavior {
            MockBehavior::Success(text) => MockResponse::Success(text.clone()),
            MockBehavior::Error(kind) => MockResponse::Error(kind.clone()),
            MockBehavior::Sequence(responses) => match responses.get(current_count) {
                Some(response) => response.clone(),
                None => MockResponse::Error(GeminiErrorKind::InvalidResponse(format!(
                    "Mock sequence exhausted (call {} beyond {} responses)",
                    current_count + 1,
                    responses.len()
                ))),
            },
        };

        match reply {
            MockResponse::Success(text) => Ok(GenerateResponse {
                outputs: vec![Output::Text(text)],
            }),
            MockResponse::Error(kind) => Err(LorebookError::from(GeminiError::new(kind))),
        }
    }
}

#[async_trait]
impl LorebookDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> LorebookResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        tokio::time::sleep(self.latency).await;
        let response = self.next_response();

        if let Some((calls, token)) = &self.cancel_after {
            if self.call_count() >= *calls {
                token.cancel();
            }
        }

        response
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_sequence() {
        let mock = MockDriver::new_sequence(vec![
            MockResponse::Success("first".to_string()),
            MockResponse::status(429, "Rate limit"),
        ]);
        let request = GenerateRequest::default();

        assert_eq!(mock.generate(&request).await.unwrap().text(), "first");
        assert!(mock.generate(&request).await.is_err());
        assert!(mock.generate(&request).await.is_err());
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests().len(), 3);
    }
}
