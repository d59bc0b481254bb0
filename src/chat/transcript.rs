use crate::think::parse_think;
use crate::types::{MessageId, Role};
use crate::view::ReasoningDisplay;

/// A displayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Display identifier.
    pub id: MessageId,
    /// Role of the message.
    pub role: Role,
    /// Raw content, including any think block.
    pub content: String,
    /// Display state of the reasoning panel.
    pub reasoning: ReasoningDisplay,
}

impl TranscriptEntry {
    /// Returns true if the content carries a think block.
    pub fn has_reasoning(&self) -> bool {
        parse_think(&self.content).reasoning.is_some()
    }
}

/// The ordered list of displayed messages.
///
/// Entries are only ever appended or cleared all at once; an entry's content may be
/// replaced in place while its reply streams.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under a fresh identifier and return the identifier.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let mut id = MessageId::generate();
        while self.contains(&id) {
            id = MessageId::generate();
        }
        self.entries.push(TranscriptEntry {
            id: id.clone(),
            role,
            content: content.into(),
            reasoning: ReasoningDisplay::collapsed(),
        });
        id
    }

    /// Replace the content of `id`.
    pub fn update_content(&mut self, id: &MessageId, content: &str) -> Option<&TranscriptEntry> {
        let entry = self.entries.iter_mut().find(|e| &e.id == id)?;
        content.clone_into(&mut entry.content);
        Some(entry)
    }

    /// Flip the reasoning display of `id`.
    pub fn toggle(&mut self, id: &MessageId) -> Option<&TranscriptEntry> {
        let entry = self.entries.iter_mut().find(|e| &e.id == id)?;
        entry.reasoning.toggle();
        Some(entry)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns true if `id` is displayed.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    /// Look up an entry.
    pub fn get(&self, id: &MessageId) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is displayed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n`-th most recent message with reasoning, counting from 1.
    pub fn nth_with_reasoning_from_end(&self, n: usize) -> Option<&MessageId> {
        let n = n.checked_sub(1)?;
        self.entries
            .iter()
            .rev()
            .filter(|e| e.has_reasoning())
            .nth(n)
            .map(|e| &e.id)
    }
}
