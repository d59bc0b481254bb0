use serde::{Deserialize, Serialize};

/// Body of `/newchat/{sessionId}/{chatId}/{model}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewChatParams {
    /// Prompt words that prime the new chat.
    pub tip_words: String,

    /// Title shown in the chat list.
    pub title: String,
}

impl NewChatParams {
    /// Create a new `NewChatParams`.
    pub fn new(tip_words: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tip_words: tip_words.into(),
            title: title.into(),
        }
    }
}
