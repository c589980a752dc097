//! Chat message types shared by the transport and the session.

use serde::{Deserialize, Serialize};

/// A single role-tagged message in a conversation.
///
/// Only `user` and `assistant` roles travel over the wire; the system
/// prompt is applied server-side. Messages are immutable once created and
/// their insertion order is the chat history.
///
/// # Examples
///
/// ```
/// use levrok::chat::ChatMessage;
///
/// let msg = ChatMessage::user("Hello!");
/// assert_eq!(msg.role, "user");
/// assert_eq!(msg.content, "Hello!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (`user` or `assistant`)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Returns true when the message was sent by the user
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}
