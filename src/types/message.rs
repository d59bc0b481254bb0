use serde::{Deserialize, Serialize};

/// Role of a message in a chat.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Assistant role.
    Assistant,

    /// Tool output.  Never rendered.
    Tool,

    /// System prompt.  Never rendered.
    System,
}

impl Role {
    /// Returns true for the roles that are shown to the user.
    pub fn is_displayed(self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

/// A message of a chat's history as the backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// Raw text, possibly containing a `<think>` reasoning segment.
    pub content: String,
}

impl Message {
    /// Create a new `Message`.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
