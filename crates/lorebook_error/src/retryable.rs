//! Failure classification shared by every service call.

/// Message fragments that identify a quota or overload condition.
///
/// Matched case-insensitively against error messages and response bodies.
pub const RATE_LIMIT_PATTERNS: &[&str] = &[
    "resource_exhausted",
    "resource has been exhausted",
    "quota",
    "rate limit",
    "rate-limit",
    "ratelimit",
    "too many requests",
    "overloaded",
    "unavailable",
    "try again later",
];

/// Returns true if the message text matches a known quota-exceeded pattern.
///
/// # Examples
///
/// ```
/// use lorebook_error::mentions_rate_limit;
///
/// assert!(mentions_rate_limit("429 RESOURCE_EXHAUSTED: Quota exceeded"));
/// assert!(!mentions_rate_limit("400 INVALID_ARGUMENT"));
/// ```
pub fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Trait for errors that the retry policy can classify.
///
/// Only rate-limited failures are retried. Everything else (bad request,
/// authentication, malformed schema) is treated as non-transient and
/// surfaces immediately.
///
/// # Examples
///
/// ```
/// use lorebook_error::{GeminiError, GeminiErrorKind, RetryableError};
///
/// let err = GeminiError::new(GeminiErrorKind::HttpError {
///     status_code: 429,
///     message: "Too Many Requests".to_string(),
/// });
/// assert!(err.is_rate_limited());
///
/// let err = GeminiError::new(GeminiErrorKind::HttpError {
///     status_code: 401,
///     message: "API key not valid".to_string(),
/// });
/// assert!(!err.is_rate_limited());
/// ```
pub trait RetryableError {
    /// Returns true if this failure is a rate-limit or overload signal.
    fn is_rate_limited(&self) -> bool;
}
