//! The session and chat controller.
//!
//! [`ChatController`] owns everything the chat front end needs between user actions: the
//! session identifier, the selectors, the send control, and the transcript of displayed
//! messages.  Every operation is a `&mut self` async method, so operations never overlap.
//!
//! Failures are surfaced through [`Renderer::alert`] as "{action}: {message}" and then
//! returned to the caller; nothing is retried.

use std::time::Instant;

use crate::accumulator::{TextAccumulator, accumulate, decode_stream};
use crate::backend::{Backend, ByteStream};
use crate::chat::{Selectors, Transcript, insert_index_mention};
use crate::error::{Error, Result};
use crate::observability::{CHAT_ALERTS, CHAT_SENDS, CHAT_SENDS_IGNORED, STREAM_DURATION};
use crate::render::{Renderer, UiEvent};
use crate::session_store::{SessionStore, ensure_session_id};
use crate::think::THINKING_PLACEHOLDER;
use crate::types::{ChatId, MessageId, NewChatParams, Role, SessionId};
use crate::view::render_message;

const START_SESSION_FAILED: &str = "Failed to start session";
const SESSION_INFO_FAILED: &str = "Failed to fetch session info";
const LOAD_CHAT_FAILED: &str = "Failed to load chat";
const CREATE_CHAT_FAILED: &str = "Failed to create chat";
const SEND_FAILED: &str = "Failed to send message";
const CLEAR_CONTEXT_FAILED: &str = "Failed to clear context";
const REMOVE_CHAT_FAILED: &str = "Failed to remove chat";
const STOP_SESSION_FAILED: &str = "Failed to stop session";
const SELECT_FAILED: &str = "Failed to change selection";

/// Title of a chat created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New chat";

/// Prefix of the text that replaces a reply the backend refused.
pub const REQUEST_ERROR_PREFIX: &str = "Request error: ";

/// Coarse state of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// No session has been started.
    NoSession,
    /// A session is active but no chat is selected.
    NoChatSelected,
    /// A session is active and this chat is selected.
    ChatSelected(ChatId),
}

/// What became of a message handed to [`ChatController::send_message`].
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Another message was in flight; nothing was sent.
    Ignored,
    /// The reply streamed to completion.
    Completed {
        /// Display identifier of the reply.
        message_id: MessageId,
    },
    /// The reply failed; its message shows the error or the partial reply.
    Failed {
        /// Display identifier of the reply.
        message_id: MessageId,
        /// What went wrong.
        error: Error,
    },
}

impl SendOutcome {
    /// Display identifier of the reply, if one was created.
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            SendOutcome::Ignored => None,
            SendOutcome::Completed { message_id } | SendOutcome::Failed { message_id, .. } => {
                Some(message_id)
            }
        }
    }
}

/// Drives a [`Backend`] and a [`Renderer`] through the chat lifecycle.
pub struct ChatController<B: Backend, R: Renderer, S: SessionStore> {
    backend: B,
    renderer: R,
    store: S,
    session: Option<SessionId>,
    linked: bool,
    send_disabled: bool,
    selectors: Selectors,
    tip_words: String,
    mention: Option<Option<String>>,
    transcript: Transcript,
}

impl<B: Backend, R: Renderer, S: SessionStore> ChatController<B, R, S> {
    /// Creates a controller.  Nothing is requested until [`Self::start_session`].
    pub fn new(backend: B, renderer: R, store: S) -> Self {
        Self {
            backend,
            renderer,
            store,
            session: None,
            linked: false,
            send_disabled: false,
            selectors: Selectors::new(),
            tip_words: String::new(),
            mention: None,
            transcript: Transcript::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Returns true once the backend accepted the session.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Returns true while a message is in flight.
    pub fn is_send_disabled(&self) -> bool {
        self.send_disabled
    }

    pub fn current_chat(&self) -> Option<&ChatId> {
        self.selectors.chat.as_ref()
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn tip_words(&self) -> &str {
        &self.tip_words
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> ControllerState {
        match (&self.session, self.linked, &self.selectors.chat) {
            (Some(_), true, Some(chat)) => ControllerState::ChatSelected(chat.clone()),
            (Some(_), true, None) => ControllerState::NoChatSelected,
            _ => ControllerState::NoSession,
        }
    }

    /// Alert the user about `err` under `title` and hand the error back.
    fn surface(&mut self, title: &str, err: Error) -> Error {
        self.alert(title, &err);
        err
    }

    fn alert(&mut self, title: &str, err: &Error) {
        CHAT_ALERTS.click();
        self.renderer
            .alert(&format!("{title}: {}", err.user_message()));
    }

    fn require_session(&mut self, title: &str) -> Result<SessionId> {
        match &self.session {
            Some(session) => Ok(session.clone()),
            None => Err(self.surface(
                title,
                Error::validation("no session has been started", Some("session".to_string())),
            )),
        }
    }

    fn clear_display(&mut self) {
        self.transcript.clear();
        self.renderer.clear();
    }

    /// Add a message to the transcript and the display.
    fn push_message(&mut self, role: Role, content: &str) -> MessageId {
        let id = self.transcript.push(role, content);
        if let Some(entry) = self.transcript.get(&id)
            && let Some(view) = render_message(&entry.content, entry.role, Some(&id), entry.reasoning)
        {
            self.renderer.append(&view);
            self.renderer.scroll_to_end();
        }
        id
    }

    /// Ensure a session identifier, start it on the backend, and load its metadata.
    pub async fn start_session(&mut self) -> Result<()> {
        let session = match ensure_session_id(&mut self.store) {
            Ok(session) => session,
            Err(err) => return Err(self.surface(START_SESSION_FAILED, err)),
        };
        self.session = Some(session.clone());
        if let Err(err) = self.backend.start(&session).await {
            return Err(self.surface(START_SESSION_FAILED, err));
        }
        self.linked = true;
        self.refresh_session().await
    }

    /// Reload the model, index, and chat lists.
    ///
    /// With no chat selected, the most recent chat is selected; with no chats at all the
    /// display is cleared.
    pub async fn refresh_session(&mut self) -> Result<()> {
        let session = self.require_session(SESSION_INFO_FAILED)?;
        let info = match self.backend.session(&session).await {
            Ok(info) => info,
            Err(err) => return Err(self.surface(SESSION_INFO_FAILED, err)),
        };
        self.selectors.apply(info);
        self.renderer.show_selectors(&self.selectors);
        if self.selectors.chat.is_none() {
            match self.selectors.chats.first().map(|c| c.id.clone()) {
                Some(chat) => {
                    self.select_chat(&chat).await?;
                }
                None => self.clear_display(),
            }
        }
        Ok(())
    }

    /// Switch to `chat` and show its history.
    ///
    /// Returns false, without fetching or clearing anything, when `chat` is already the
    /// current chat.
    pub async fn select_chat(&mut self, chat: &ChatId) -> Result<bool> {
        if self.selectors.chat.as_ref() == Some(chat) {
            return Ok(false);
        }
        self.selectors.chat = Some(chat.clone());
        self.clear_display();
        self.load_chat(chat).await?;
        Ok(true)
    }

    async fn load_chat(&mut self, chat: &ChatId) -> Result<()> {
        let session = self.require_session(LOAD_CHAT_FAILED)?;
        let detail = match self.backend.chat(&session, chat).await {
            Ok(detail) => detail,
            Err(err) => return Err(self.surface(LOAD_CHAT_FAILED, err)),
        };
        if !detail.model.is_empty() {
            self.selectors.model = Some(detail.model);
        }
        for message in detail.messages {
            if message.role.is_displayed() {
                self.push_message(message.role, &message.content);
            }
        }
        self.renderer.show_selectors(&self.selectors);
        Ok(())
    }

    /// Create a chat titled `title` with the selected model and select it.
    pub async fn create_chat(&mut self, title: &str) -> Result<ChatId> {
        let session = self.require_session(CREATE_CHAT_FAILED)?;
        let Some(model) = self.selectors.model.clone() else {
            return Err(self.surface(
                CREATE_CHAT_FAILED,
                Error::validation("Please select a model", Some("model".to_string())),
            ));
        };
        let chat = ChatId::generate();
        let params = NewChatParams::new(self.tip_words.clone(), title);
        if let Err(err) = self
            .backend
            .new_chat(&session, &chat, &model, &params)
            .await
        {
            return Err(self.surface(CREATE_CHAT_FAILED, err));
        }
        self.selectors.chat = Some(chat.clone());
        self.clear_display();
        self.refresh_session().await?;
        Ok(chat)
    }

    /// Send `input` to the current chat, creating a chat first if none is selected, and
    /// stream the reply into a placeholder message.
    pub async fn send_message(&mut self, input: &str) -> Result<SendOutcome> {
        if self.send_disabled {
            CHAT_SENDS_IGNORED.click();
            return Ok(SendOutcome::Ignored);
        }
        if input.trim().is_empty() {
            return Err(self.surface(
                SEND_FAILED,
                Error::validation("Please enter a message", Some("message".to_string())),
            ));
        }
        let session = self.require_session(SEND_FAILED)?;
        let input = match self.mention.take() {
            Some(index) => insert_index_mention(input, index.as_deref()),
            None => input.to_string(),
        };
        let input = input.as_str();
        let chat = match self.selectors.chat.clone() {
            Some(chat) => chat,
            None => self.create_chat(input).await?,
        };
        CHAT_SENDS.click();
        self.send_disabled = true;
        let outcome = self.send_to(&session, &chat, input).await;
        self.send_disabled = false;
        self.refresh_session().await?;
        Ok(outcome)
    }

    async fn send_to(&mut self, session: &SessionId, chat: &ChatId, input: &str) -> SendOutcome {
        self.push_message(Role::User, input);
        let message_id = self.push_message(Role::Assistant, THINKING_PLACEHOLDER);
        let index = self.selectors.index.clone();
        let result = match self
            .backend
            .send(session, chat, index.as_deref(), input)
            .await
        {
            Ok(bytes) => self.stream_reply(&message_id, bytes).await,
            Err(err) => Err(err),
        };
        let Err(error) = result else {
            return SendOutcome::Completed { message_id };
        };
        let still_waiting = self
            .transcript
            .get(&message_id)
            .is_some_and(|e| e.content == THINKING_PLACEHOLDER);
        if still_waiting {
            let text = format!("{REQUEST_ERROR_PREFIX}{}", error.user_message());
            update_message(&mut self.transcript, &mut self.renderer, &message_id, &text);
        }
        if !error.is_api() {
            self.alert(SEND_FAILED, &error);
        }
        SendOutcome::Failed { message_id, error }
    }

    /// Fold a streamed reply into the message `id`, re-rendering after every fragment.
    ///
    /// On success a final pass renders the complete reply, so even an empty reply
    /// replaces the placeholder.  On failure the message keeps what was received.
    pub async fn stream_reply(&mut self, id: &MessageId, bytes: ByteStream) -> Result<()> {
        let started = Instant::now();
        let mut accumulator = TextAccumulator::new(id.clone());
        let transcript = &mut self.transcript;
        let renderer = &mut self.renderer;
        let result = accumulate(decode_stream(bytes), &mut accumulator, |id, text| {
            update_message(transcript, renderer, id, text)
        })
        .await;
        STREAM_DURATION.add(started.elapsed().as_secs_f64());
        if result.is_ok() {
            update_message(
                &mut self.transcript,
                &mut self.renderer,
                id,
                accumulator.text(),
            );
        }
        result
    }

    /// Remove `chat` after confirmation.
    ///
    /// `event` is the input event that requested removal; its propagation is stopped
    /// before anything else happens.  Returns false if the user declined.
    pub async fn remove_chat(&mut self, chat: &ChatId, event: &mut dyn UiEvent) -> Result<bool> {
        event.stop_propagation();
        let session = self.require_session(REMOVE_CHAT_FAILED)?;
        let title = self
            .selectors
            .chat_title(chat)
            .unwrap_or(chat.as_str())
            .to_string();
        if !self
            .renderer
            .confirm(&format!("Remove the chat \"{title}\"?"))
        {
            return Ok(false);
        }
        if let Err(err) = self.backend.remove(&session, chat).await {
            return Err(self.surface(REMOVE_CHAT_FAILED, err));
        }
        if self.selectors.chat.as_ref() == Some(chat) {
            self.selectors.chat = None;
        }
        self.refresh_session().await?;
        Ok(true)
    }

    /// Drop the backend context of the current chat and clear the display.
    pub async fn clear_context(&mut self) -> Result<()> {
        let session = self.require_session(CLEAR_CONTEXT_FAILED)?;
        let Some(chat) = self.selectors.chat.clone() else {
            return Err(self.surface(
                CLEAR_CONTEXT_FAILED,
                Error::validation("No chat is selected", Some("chat".to_string())),
            ));
        };
        if let Err(err) = self.backend.clear(&session, &chat).await {
            return Err(self.surface(CLEAR_CONTEXT_FAILED, err));
        }
        self.clear_display();
        Ok(())
    }

    /// Stop the session on the backend.
    pub async fn stop_session(&mut self) -> Result<()> {
        let session = self.require_session(STOP_SESSION_FAILED)?;
        if let Err(err) = self.backend.stop(&session).await {
            return Err(self.surface(STOP_SESSION_FAILED, err));
        }
        self.linked = false;
        Ok(())
    }

    /// Called when the front end shuts down.  The backend session is left running.
    pub fn teardown(&mut self) {}

    /// Show or hide the reasoning of message `id`.  Returns false if `id` is not displayed.
    pub fn toggle_reasoning(&mut self, id: &MessageId) -> bool {
        let Some(entry) = self.transcript.toggle(id) else {
            return false;
        };
        if let Some(view) = render_message(&entry.content, entry.role, Some(id), entry.reasoning)
        {
            self.renderer.replace(id, &view);
            self.renderer.scroll_to_end();
        }
        true
    }

    /// Select the model used for new chats.
    pub fn select_model(&mut self, name: &str) -> Result<()> {
        if let Err(err) = self.selectors.select_model(name) {
            return Err(self.surface(SELECT_FAILED, err));
        }
        self.renderer.show_selectors(&self.selectors);
        Ok(())
    }

    /// Select the index consulted by sends; `None` or "none" disables retrieval.
    pub fn select_index(&mut self, name: Option<&str>) -> Result<()> {
        if let Err(err) = self.selectors.select_index(name) {
            return Err(self.surface(SELECT_FAILED, err));
        }
        self.renderer.show_selectors(&self.selectors);
        Ok(())
    }

    /// Mention `name` at the start of the next message sent.
    ///
    /// The mention is rewritten into that one message only; the index consulted by sends
    /// stays whatever [`Self::select_index`] chose.  `None` or "none" strips any leading
    /// mention instead.
    pub fn mention_index(&mut self, name: Option<&str>) -> Result<()> {
        match self.selectors.resolve_index(name) {
            Ok(index) => {
                self.mention = Some(index);
                Ok(())
            }
            Err(err) => Err(self.surface(SELECT_FAILED, err)),
        }
    }

    /// The mention waiting for the next message, if any.
    pub fn pending_mention(&self) -> Option<Option<&str>> {
        self.mention.as_ref().map(Option::as_deref)
    }

    /// Set the prompt words sent when a chat is created.
    pub fn set_tip_words(&mut self, tip_words: impl Into<String>) {
        self.tip_words = tip_words.into();
    }
}

/// Store `text` as the content of `id` and re-render it.
fn update_message<R: Renderer>(
    transcript: &mut Transcript,
    renderer: &mut R,
    id: &MessageId,
    text: &str,
) {
    let Some(entry) = transcript.update_content(id, text) else {
        return;
    };
    if let Some(view) = render_message(&entry.content, entry.role, Some(id), entry.reasoning) {
        renderer.replace(id, &view);
        renderer.scroll_to_end();
    }
}
