//! Extraction error types.

use crate::RetryableError;

/// Specific error conditions raised while extracting or consolidating entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ExtractionErrorKind {
    /// Every attempt was rate limited and the retry ceiling was reached
    #[display("Service overloaded: still rate limited after {} attempts", attempts)]
    ServiceOverloaded {
        /// Number of calls made before giving up
        attempts: u32,
    },
    /// The caller-supplied deadline elapsed before the service answered
    #[display("Service call timed out after {} ms", elapsed_ms)]
    Timeout {
        /// Deadline that elapsed, in milliseconds
        elapsed_ms: u64,
        /// Whether the configured policy treats this timeout as server-busy
        rate_limited: bool,
    },
    /// Service answered but the payload did not match the expected schema
    #[display("Malformed service response: {}", _0)]
    MalformedResponse(String),
    /// Driver returned no text output at all
    #[display("Service returned no text output")]
    EmptyResponse,
    /// Request or schema could not be serialized
    #[display("Failed to build request: {}", _0)]
    RequestBuild(String),
}

/// Error type for extraction operations.
///
/// # Examples
///
/// ```
/// use lorebook_error::{ExtractionError, ExtractionErrorKind};
///
/// let err = ExtractionError::new(ExtractionErrorKind::ServiceOverloaded { attempts: 5 });
/// assert!(format!("{}", err).contains("5 attempts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Extraction Error: {} at line {} in {}", kind, line, file)]
pub struct ExtractionError {
    /// The specific error condition
    pub kind: ExtractionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ExtractionError {
    /// Create a new ExtractionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ExtractionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for ExtractionError {
    fn is_rate_limited(&self) -> bool {
        matches!(
            self.kind,
            ExtractionErrorKind::Timeout {
                rate_limited: true,
                ..
            }
        )
    }
}
