//! Gemini-specific error types.

use crate::RetryableError;

/// Gemini-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GeminiErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to create the HTTP client
    #[display("Failed to create Gemini client: {}", _0)]
    ClientCreation(String),
    /// Request never produced an HTTP response (DNS, TLS, connection reset)
    #[display("Gemini transport failure: {}", _0)]
    Transport(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message (response body)
        message: String,
    },
    /// Response body did not match the generateContent shape
    #[display("Invalid Gemini response: {}", _0)]
    InvalidResponse(String),
    /// Prompt or candidate was blocked by the safety filters
    #[display("Gemini blocked the request: {}", _0)]
    Blocked(String),
    /// Response contained no candidate text
    #[display("Gemini returned no candidate text")]
    EmptyResponse,
}

impl GeminiErrorKind {
    /// Whether this failure means the service is throttling us.
    ///
    /// 429 and 503 are the quota and overload codes; other statuses are
    /// treated as rate limiting only when the body names a quota condition.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GeminiErrorKind::HttpError {
                status_code,
                message,
            } => matches!(*status_code, 429 | 503) || crate::mentions_rate_limit(message),
            GeminiErrorKind::Transport(message) => crate::mentions_rate_limit(message),
            _ => false,
        }
    }
}

/// Gemini error with source location tracking.
///
/// # Examples
///
/// ```
/// use lorebook_error::{GeminiError, GeminiErrorKind};
///
/// let err = GeminiError::new(GeminiErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gemini Error: {} at line {} in {}", kind, line, file)]
pub struct GeminiError {
    /// The kind of error that occurred
    pub kind: GeminiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GeminiError {
    /// Create a new GeminiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GeminiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for GeminiError {
    fn is_rate_limited(&self) -> bool {
        self.kind.is_rate_limited()
    }
}
