//! The generative-text service contract.

use async_trait::async_trait;
use lorebook_core::{GenerateRequest, GenerateResponse};
use lorebook_error::LorebookResult;
use std::sync::Arc;

/// Core trait every generative-text backend implements.
///
/// Implementations accept a prompt plus an optional response schema and
/// return either the generated text or an error whose
/// [`RetryableError`](lorebook_error::RetryableError) classification tells
/// rate-limit failures apart from everything else.
#[async_trait]
pub trait LorebookDriver: Send + Sync {
    /// Generate model output for a request.
    async fn generate(&self, req: &GenerateRequest) -> LorebookResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-2.5-flash").
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<D: LorebookDriver + ?Sized> LorebookDriver for Arc<D> {
    async fn generate(&self, req: &GenerateRequest) -> LorebookResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<D: LorebookDriver + ?Sized> LorebookDriver for Box<D> {
    async fn generate(&self, req: &GenerateRequest) -> LorebookResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
