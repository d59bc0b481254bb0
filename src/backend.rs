//! The chat backend as seen by the controller.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::Result;
use crate::types::{ChatDetail, ChatId, NewChatParams, SessionId, SessionInfo};

/// A streamed reply body.  Finite and not restartable.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Operations of the chat backend.
///
/// [`ChatClient`](crate::ChatClient) implements this over HTTP; tests substitute in-memory
/// implementations.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Start (or resume) the session.
    async fn start(&self, session: &SessionId) -> Result<()>;

    /// Fetch the model list, index list, and chat list.
    async fn session(&self, session: &SessionId) -> Result<SessionInfo>;

    /// Fetch a chat's model and history.
    async fn chat(&self, session: &SessionId, chat: &ChatId) -> Result<ChatDetail>;

    /// Create a chat that will be answered by `model`.
    async fn new_chat(
        &self,
        session: &SessionId,
        chat: &ChatId,
        model: &str,
        params: &NewChatParams,
    ) -> Result<()>;

    /// Send a message; the reply streams back as plain text.
    ///
    /// `index` is the knowledge-base index to consult, `None` for no retrieval.
    async fn send(
        &self,
        session: &SessionId,
        chat: &ChatId,
        index: Option<&str>,
        message: &str,
    ) -> Result<ByteStream>;

    /// Clear the server-side context of a chat.
    async fn clear(&self, session: &SessionId, chat: &ChatId) -> Result<()>;

    /// Remove a chat.
    async fn remove(&self, session: &SessionId, chat: &ChatId) -> Result<()>;

    /// Stop the session.
    async fn stop(&self, session: &SessionId) -> Result<()>;
}
