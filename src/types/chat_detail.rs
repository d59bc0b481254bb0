use serde::{Deserialize, Serialize};

use crate::types::Message;

/// A chat's model and history, returned by `/chat/{sessionId}/{chatId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatDetail {
    /// The model the chat was created with.
    #[serde(default)]
    pub model: String,

    /// Messages in the order they were exchanged.
    #[serde(default)]
    pub messages: Vec<Message>,
}
