use serde::{Deserialize, Serialize};

use crate::types::ChatId;

/// An entry of the session's chat list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSummary {
    /// The chat's identifier.
    pub id: ChatId,

    /// The chat's title.
    #[serde(default)]
    pub title: String,
}

impl ChatSummary {
    /// Create a new `ChatSummary`.
    pub fn new(id: impl Into<ChatId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Session metadata returned by `/session/{sessionId}`.
///
/// The chat list is in creation order (oldest first).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Models the backend can serve.
    #[serde(default)]
    pub model_list: Vec<String>,

    /// Knowledge-base indexes available for retrieval.
    #[serde(default)]
    pub index_list: Vec<String>,

    /// Chats of this session.
    #[serde(default)]
    pub chat_list: Vec<ChatSummary>,
}
