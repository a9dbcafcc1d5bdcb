//! Top-level error wrapper types.

use crate::{ConfigError, ExtractionError, GeminiError, JsonError, RetryableError};

/// Every error condition the Lorebook crates can raise.
///
/// # Examples
///
/// ```
/// use lorebook_error::{LorebookError, JsonError};
///
/// let json_err = JsonError::new("trailing comma");
/// let err: LorebookError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum LorebookErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gemini provider error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Extraction or consolidation error
    #[from(ExtractionError)]
    Extraction(ExtractionError),
}

/// Lorebook error with kind discrimination.
///
/// # Examples
///
/// ```
/// use lorebook_error::{LorebookResult, ConfigError};
///
/// fn might_fail() -> LorebookResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Lorebook Error: {}", _0)]
pub struct LorebookError(Box<LorebookErrorKind>);

impl LorebookError {
    /// Create a new error from a kind.
    pub fn new(kind: LorebookErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LorebookErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to LorebookErrorKind
impl<T> From<T> for LorebookError
where
    T: Into<LorebookErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for LorebookError {
    fn is_rate_limited(&self) -> bool {
        match self.kind() {
            LorebookErrorKind::Gemini(e) => e.is_rate_limited(),
            LorebookErrorKind::Extraction(e) => e.is_rate_limited(),
            LorebookErrorKind::Json(_) | LorebookErrorKind::Config(_) => false,
        }
    }
}

/// Result type for Lorebook operations.
///
/// # Examples
///
/// ```
/// use lorebook_error::{ExtractionError, ExtractionErrorKind, LorebookResult};
///
/// fn parse_reply() -> LorebookResult<String> {
///     Err(ExtractionError::new(ExtractionErrorKind::EmptyResponse))?
/// }
/// ```
pub type LorebookResult<T> = std::result::Result<T, LorebookError>;
