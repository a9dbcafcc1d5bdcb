//! Message types for generation requests.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single text message in a generation request.
///
/// # Examples
///
/// ```
/// use lorebook_core::{Message, Role};
///
/// let message = Message::new(Role::User, "Extract every character.");
/// assert_eq!(message.role, Role::User);
/// assert!(message.text.contains("character"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The message text
    pub text: String,
}

impl Message {
    /// Create a message from a role and any string-like content.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}
