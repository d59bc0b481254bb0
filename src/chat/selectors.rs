//! Model, index, and chat selection.

use crate::error::{Error, Result};
use crate::types::{ChatId, ChatSummary, SessionInfo};

/// Name accepted in place of an index to mean "no knowledge-base retrieval".
pub const NO_INDEX: &str = "none";

/// The selectable lists and the current selection of each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
    /// Models the backend offers.
    pub models: Vec<String>,
    /// Indexes the backend offers.  "No index" is implicit and not listed.
    pub indexes: Vec<String>,
    /// Chats of the session, most recent first.
    pub chats: Vec<ChatSummary>,
    /// Selected model.
    pub model: Option<String>,
    /// Selected index; `None` means no retrieval.
    pub index: Option<String>,
    /// Selected chat.
    pub chat: Option<ChatId>,
}

impl Selectors {
    /// Creates empty selectors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repopulate the lists from session metadata.
    ///
    /// The model selection survives when the model is still offered and otherwise falls
    /// back to the first model.  The index selection survives when still offered and
    /// otherwise falls back to no index.  The chat selection is left alone.
    pub fn apply(&mut self, info: SessionInfo) {
        let SessionInfo {
            model_list,
            index_list,
            mut chat_list,
        } = info;
        self.model = self
            .model
            .take()
            .filter(|m| model_list.contains(m))
            .or_else(|| model_list.first().cloned());
        self.index = self.index.take().filter(|i| index_list.contains(i));
        chat_list.reverse();
        self.models = model_list;
        self.indexes = index_list;
        self.chats = chat_list;
    }

    /// Select `name` if it is one of the offered models.
    pub fn select_model(&mut self, name: &str) -> Result<()> {
        if !self.models.iter().any(|m| m == name) {
            return Err(Error::validation(
                format!("model {name} is not available"),
                Some("model".to_string()),
            ));
        }
        self.model = Some(name.to_string());
        Ok(())
    }

    /// Select an index by name; `None` or [`NO_INDEX`] clears the selection.
    pub fn select_index(&mut self, name: Option<&str>) -> Result<()> {
        self.index = self.resolve_index(name)?;
        Ok(())
    }

    /// Check `name` against the offered indexes; `None` or "none" resolves to no index.
    pub fn resolve_index(&self, name: Option<&str>) -> Result<Option<String>> {
        let Some(name) = name.filter(|n| !n.eq_ignore_ascii_case(NO_INDEX)) else {
            return Ok(None);
        };
        if !self.indexes.iter().any(|i| i == name) {
            return Err(Error::validation(
                format!("index {name} is not available"),
                Some("index".to_string()),
            ));
        }
        Ok(Some(name.to_string()))
    }

    /// Resolve a 1-based position in the chat list or a chat identifier.
    pub fn resolve_chat(&self, reference: &str) -> Option<ChatId> {
        let reference = reference.trim();
        if let Ok(n) = reference.parse::<usize>()
            && n >= 1
            && let Some(chat) = self.chats.get(n - 1)
        {
            return Some(chat.id.clone());
        }
        self.chats
            .iter()
            .find(|c| c.id.as_str() == reference)
            .map(|c| c.id.clone())
    }

    /// Title of a listed chat.
    pub fn chat_title(&self, id: &ChatId) -> Option<&str> {
        self.chats
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.title.as_str())
    }

    /// One-line summary of the current selection.
    pub fn status_line(&self) -> String {
        let model = self.model.as_deref().unwrap_or("no model");
        let index = self.index.as_deref().unwrap_or(NO_INDEX);
        let chat = match &self.chat {
            Some(id) => self.chat_title(id).unwrap_or(id.as_str()).to_string(),
            None => "new chat".to_string(),
        };
        format!("model: {model} | index: {index} | chat: {chat}")
    }
}
