//! Integration tests for the kbchat library.
//! The scripted tests run against an in-memory backend; the live test requires a backend
//! named by KBCHAT_HOST.

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use futures::stream;
    use kbchat::chat::{ChatController, ControllerState, SendOutcome, Selectors};
    use kbchat::view::MessageBody;
    use kbchat::{
        Backend, ByteStream, ChatClient, ChatDetail, ChatId, ChatSummary, CommandEvent, Error,
        MemorySessionStore, Message, MessageId, MessageView, NewChatParams, Renderer, Result,
        Role, SessionId, SessionInfo,
    };

    /// A backend that keeps chats in memory and answers every message by echoing it back
    /// behind a think block.
    #[derive(Default)]
    struct EchoBackend {
        chats: Mutex<Vec<(ChatSummary, ChatDetail)>>,
        requests: Mutex<Vec<String>>,
    }

    impl EchoBackend {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn log(&self, request: String) {
            self.requests.lock().unwrap().push(request);
        }
    }

    #[async_trait::async_trait]
    impl Backend for EchoBackend {
        async fn start(&self, session: &SessionId) -> Result<()> {
            self.log(format!("start {session}"));
            Ok(())
        }

        async fn session(&self, _: &SessionId) -> Result<SessionInfo> {
            self.log("session".to_string());
            Ok(SessionInfo {
                model_list: vec!["deepseek-r1:8b".to_string()],
                index_list: vec!["manuals".to_string()],
                chat_list: self
                    .chats
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|(summary, _)| summary.clone())
                    .collect(),
            })
        }

        async fn chat(&self, _: &SessionId, chat: &ChatId) -> Result<ChatDetail> {
            self.log(format!("chat {chat}"));
            self.chats
                .lock()
                .unwrap()
                .iter()
                .find(|(summary, _)| &summary.id == chat)
                .map(|(_, detail)| detail.clone())
                .ok_or_else(|| Error::api(404, "chat not found"))
        }

        async fn new_chat(
            &self,
            _: &SessionId,
            chat: &ChatId,
            model: &str,
            params: &NewChatParams,
        ) -> Result<()> {
            self.log(format!("newchat {chat} {model}"));
            self.chats.lock().unwrap().push((
                ChatSummary::new(chat.clone(), params.title.clone()),
                ChatDetail {
                    model: model.to_string(),
                    messages: vec![],
                },
            ));
            Ok(())
        }

        async fn send(
            &self,
            _: &SessionId,
            chat: &ChatId,
            index: Option<&str>,
            message: &str,
        ) -> Result<ByteStream> {
            self.log(format!("send {chat} {}", index.unwrap_or("null")));
            let reply = format!("<think>echoing</think>You said: {message}");
            if let Some((_, detail)) = self
                .chats
                .lock()
                .unwrap()
                .iter_mut()
                .find(|(summary, _)| &summary.id == chat)
            {
                detail.messages.push(Message::user(message));
                detail.messages.push(Message::assistant(reply.clone()));
            }
            // Split mid-character to exercise incremental decoding.
            let bytes = reply.into_bytes();
            let chunks: Vec<Result<Bytes>> = bytes
                .chunks(5)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }

        async fn clear(&self, _: &SessionId, chat: &ChatId) -> Result<()> {
            self.log(format!("clear {chat}"));
            Ok(())
        }

        async fn remove(&self, _: &SessionId, chat: &ChatId) -> Result<()> {
            self.log(format!("remove {chat}"));
            self.chats
                .lock()
                .unwrap()
                .retain(|(summary, _)| &summary.id != chat);
            Ok(())
        }

        async fn stop(&self, session: &SessionId) -> Result<()> {
            self.log(format!("stop {session}"));
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScreenRenderer {
        screen: Vec<MessageView>,
        alerts: Vec<String>,
    }

    impl Renderer for ScreenRenderer {
        fn append(&mut self, view: &MessageView) {
            self.screen.push(view.clone());
        }

        fn replace(&mut self, id: &MessageId, view: &MessageView) -> bool {
            match self.screen.iter_mut().find(|v| v.id.as_ref() == Some(id)) {
                Some(slot) => {
                    *slot = view.clone();
                    true
                }
                None => false,
            }
        }

        fn clear(&mut self) {
            self.screen.clear();
        }

        fn show_selectors(&mut self, _: &Selectors) {}

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn confirm(&mut self, _: &str) -> bool {
            true
        }

        fn print_info(&mut self, _: &str) {}
    }

    fn answer(view: &MessageView) -> &str {
        match &view.body {
            MessageBody::Content {
                answer_markdown, ..
            } => answer_markdown,
            MessageBody::Loading { label } => label,
        }
    }

    #[tokio::test]
    async fn full_conversation_flow() {
        let mut controller = ChatController::new(
            EchoBackend::default(),
            ScreenRenderer::default(),
            MemorySessionStore::new(),
        );
        controller.start_session().await.unwrap();
        assert_eq!(controller.state(), ControllerState::NoChatSelected);

        // First message creates a chat titled after it.
        controller.select_index(Some("manuals")).unwrap();
        let outcome = controller.send_message("héllo wörld").await.unwrap();
        let SendOutcome::Completed { message_id } = outcome else {
            panic!("send failed: {outcome:?}");
        };
        let first_chat = controller.current_chat().unwrap().clone();
        assert_eq!(
            controller.selectors().chat_title(&first_chat),
            Some("héllo wörld")
        );
        let reply = controller
            .renderer()
            .screen
            .iter()
            .find(|v| v.id.as_ref() == Some(&message_id))
            .unwrap();
        assert_eq!(answer(reply), "You said: héllo wörld");
        assert_eq!(reply.reasoning().unwrap().markdown, "echoing");
        assert!(
            controller
                .backend()
                .requests()
                .contains(&format!("send {first_chat} manuals"))
        );

        // A second chat, then back to the first: its history is reloaded.
        let second_chat = controller.create_chat("second").await.unwrap();
        assert!(controller.renderer().screen.is_empty());
        assert_eq!(controller.selectors().chats[0].id, second_chat);
        assert!(controller.select_chat(&first_chat).await.unwrap());
        let roles: Vec<Role> = controller.renderer().screen.iter().map(|v| v.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant]);

        // Removing the selected chat falls back to the remaining one.
        let mut event = CommandEvent::new();
        assert!(
            controller
                .remove_chat(&first_chat, &mut event)
                .await
                .unwrap()
        );
        assert_eq!(
            controller.state(),
            ControllerState::ChatSelected(second_chat.clone())
        );
        assert!(controller.renderer().alerts.is_empty());
    }

    #[tokio::test]
    async fn session_id_survives_restart() {
        let mut first = ChatController::new(
            EchoBackend::default(),
            ScreenRenderer::default(),
            MemorySessionStore::new(),
        );
        first.start_session().await.unwrap();
        let session = first.session_id().unwrap().clone();

        let store = MemorySessionStore::with_session_id(session.as_str());
        let mut second =
            ChatController::new(EchoBackend::default(), ScreenRenderer::default(), store);
        second.start_session().await.unwrap();
        assert_eq!(second.session_id(), Some(&session));
        assert_eq!(
            second.backend().requests()[0],
            format!("start {}", session.as_str())
        );
    }

    #[tokio::test]
    #[ignore] // Ignore by default as this requires a running backend
    async fn live_backend_session() {
        let Ok(host) = std::env::var("KBCHAT_HOST") else {
            eprintln!("Skipping test: KBCHAT_HOST not set");
            return;
        };
        let client = ChatClient::new(Some(host)).expect("Failed to create client");
        let mut controller =
            ChatController::new(client, ScreenRenderer::default(), MemorySessionStore::new());
        controller.start_session().await.unwrap();
        assert!(controller.is_linked());
    }
}
