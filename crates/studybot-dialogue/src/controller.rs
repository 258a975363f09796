//! Dialogue controller: turns participant actions into new session snapshots.
//!
//! Every operation takes the current [`Session`] by reference and returns a
//! new one. On error the caller keeps the snapshot it already has, so a
//! failed model call leaves no half-applied turn behind.

use std::sync::Arc;

use tracing::{debug, info, warn};

use studybot_core::{Session, SessionPhase};
use studybot_providers::{LlmProvider, LlmRequestConfig};

use crate::error::DialogueError;
use crate::exporter::{TranscriptExporter, TranscriptPayload};
use crate::identifier;
use crate::marker::scan_reply;
use crate::script::{Script, END_MARKER};

/// A discrete participant action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    /// Let the bot speak first (only has an effect on a fresh session).
    Greet,
    /// Send a chat message.
    Submit(String),
    /// "Start a new chat".
    Reset,
}

pub struct DialogueController {
    provider: Arc<dyn LlmProvider>,
    exporter: Arc<dyn TranscriptExporter>,
    script: Script,
    request_config: LlmRequestConfig,
}

impl DialogueController {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        exporter: Arc<dyn TranscriptExporter>,
        script: Script,
        request_config: LlmRequestConfig,
    ) -> Self {
        info!(
            provider = provider.display_name(),
            model = provider.model(),
            exporter = exporter.name(),
            "dialogue controller initialized"
        );
        Self {
            provider,
            exporter,
            script,
            request_config,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// A fresh session seeded with the study script.
    pub fn start_session(&self) -> Session {
        let session = Session::new(self.script.system_prompt());
        info!(session_id = %session.id(), "session started");
        session
    }

    /// Dispatch one participant action.
    pub async fn handle(
        &self,
        session: &Session,
        action: UserAction,
    ) -> Result<Session, DialogueError> {
        match action {
            UserAction::Greet => self.greet(session).await,
            UserAction::Submit(text) => self.submit(session, &text).await,
            UserAction::Reset => Ok(self.reset(session)),
        }
    }

    /// Generate the bot's opening turn. Only a fresh session is greeted;
    /// any other snapshot is returned unchanged.
    pub async fn greet(&self, session: &Session) -> Result<Session, DialogueError> {
        if session.phase() != SessionPhase::Fresh {
            debug!(session_id = %session.id(), "greeting already sent");
            return Ok(session.clone());
        }

        let mut next = session.clone();
        self.reply(&mut next).await?;
        Ok(next)
    }

    /// Append a participant message and the bot's reply.
    pub async fn submit(&self, session: &Session, text: &str) -> Result<Session, DialogueError> {
        if session.is_closed() {
            return Err(DialogueError::ChatClosed);
        }
        if text.trim().is_empty() {
            return Err(DialogueError::EmptyMessage);
        }

        let mut next = session.clone();
        identifier::capture(&mut next, text);
        next.push_user(text)?;
        self.reply(&mut next).await?;
        Ok(next)
    }

    /// "Start a new chat": drop everything and issue a new session id.
    pub fn reset(&self, session: &Session) -> Session {
        let next = session.restart();
        info!(
            old_session_id = %session.id(),
            session_id = %next.id(),
            "session reset"
        );
        next
    }

    /// Ask the model for the next assistant turn and apply it to `session`.
    async fn reply(&self, session: &mut Session) -> Result<(), DialogueError> {
        let response = self
            .provider
            .chat(session.messages(), &self.request_config)
            .await?;

        let raw = response.content.unwrap_or_default();
        let scanned = scan_reply(&raw, END_MARKER);
        session.push_assistant(scanned.visible);

        if scanned.closes_chat {
            session.close();
            info!(
                session_id = %session.id(),
                turns = session.visible_messages().len(),
                "end marker received, chat closed"
            );
            self.export_once(session).await;
        }

        Ok(())
    }

    /// Export the transcript unless it was already saved. Failures are
    /// reported on the admin log target and otherwise swallowed.
    async fn export_once(&self, session: &mut Session) {
        if session.is_saved() {
            debug!(session_id = %session.id(), "transcript already saved");
            return;
        }

        let payload = TranscriptPayload::from(&*session);
        match self.exporter.export(&payload).await {
            Ok(()) => {
                session.mark_saved();
                info!(
                    session_id = %session.id(),
                    sink = self.exporter.name(),
                    "transcript saved"
                );
            }
            Err(e) => {
                // No retry: the chat is closed, so nothing re-triggers export.
                warn!(
                    target: "studybot::admin",
                    session_id = %session.id(),
                    sink = self.exporter.name(),
                    error = %e,
                    "failed to save transcript"
                );
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::ExportError;
    use crate::script::{REFUSAL_TEXT, TROUBLESHOOTING_STEPS};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use studybot_core::types::{LlmResponse, Message, Role};
    use studybot_providers::ProviderError;

    const GREETING: &str = "Hello. I'm a bot assistant Jerry. Please provide your Prolific ID below:";

    /// A mock LLM provider that returns canned responses and records what it was sent.
    struct MockProvider {
        responses: Mutex<Vec<Result<LlmResponse, ProviderError>>>,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl MockProvider {
        fn new(responses: Vec<Result<LlmResponse, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn replies(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(LlmResponse::text(*t))).collect())
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> Vec<Message> {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn chat(
            &self,
            messages: &[Message],
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(LlmResponse::text("(no more responses)"))
            } else {
                responses.remove(0)
            }
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    /// Records exported payloads; optionally fails every export.
    #[derive(Default)]
    struct MockExporter {
        exported: Mutex<Vec<TranscriptPayload>>,
        fail: bool,
    }

    impl MockExporter {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn count(&self) -> usize {
            self.exported.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TranscriptExporter for MockExporter {
        async fn export(&self, payload: &TranscriptPayload) -> Result<(), ExportError> {
            self.exported.lock().unwrap().push(payload.clone());
            if self.fail {
                Err(ExportError::UnexpectedBody("nope".into()))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn controller(
        provider: Arc<MockProvider>,
        exporter: Arc<MockExporter>,
    ) -> DialogueController {
        DialogueController::new(
            provider,
            exporter,
            Script::default(),
            LlmRequestConfig::default(),
        )
    }

    fn closing_reply() -> String {
        format!(
            "{TROUBLESHOOTING_STEPS}\n\nThank you, I hope this was helpful! Please return to the survey: https://survey.example.edu\n{END_MARKER}"
        )
    }

    #[tokio::test]
    async fn test_fresh_session_gets_greeting() {
        let provider = Arc::new(MockProvider::replies(&[GREETING]));
        let exporter = Arc::new(MockExporter::default());
        let ctl = controller(provider.clone(), exporter);

        let session = ctl.start_session();
        assert_eq!(session.phase(), SessionPhase::Fresh);

        let greeted = ctl.greet(&session).await.unwrap();

        assert_eq!(greeted.visible_messages(), &[Message::assistant(GREETING)]);
        assert_eq!(greeted.phase(), SessionPhase::GreetingSent);
        assert!(!greeted.is_closed());
        // The model only saw the system script.
        let sent = provider.last_call();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_greeting_happens_once() {
        let provider = Arc::new(MockProvider::replies(&[GREETING, "second greeting"]));
        let ctl = controller(provider.clone(), Arc::new(MockExporter::default()));

        let greeted = ctl.greet(&ctl.start_session()).await.unwrap();
        let again = ctl.greet(&greeted).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(again.visible_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_first_message_captured_as_prolific_id() {
        let provider = Arc::new(MockProvider::replies(&[
            GREETING,
            "Thanks! How can I assist you with your Internet issue today?",
        ]));
        let ctl = controller(provider.clone(), Arc::new(MockExporter::default()));

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        let session = ctl.submit(&session, "ABCDEF123456").await.unwrap();

        assert_eq!(session.prolific_id(), Some("ABCDEF123456"));
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.visible_messages().len(), 3);
    }

    #[tokio::test]
    async fn test_model_receives_full_history() {
        let provider = Arc::new(MockProvider::replies(&[GREETING, "How can I help?"]));
        let ctl = controller(provider.clone(), Arc::new(MockExporter::default()));

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        ctl.submit(&session, "ABCDEF123456").await.unwrap();

        let sent = provider.last_call();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].content, ctl.script().system_prompt());
        assert_eq!(sent[1], Message::assistant(GREETING));
        assert_eq!(sent[2], Message::user("ABCDEF123456"));
    }

    #[tokio::test]
    async fn test_slow_wifi_closes_chat_and_exports_once() {
        let closing = closing_reply();
        let provider = Arc::new(MockProvider::replies(&[
            GREETING,
            "How can I assist you with your Internet issue today?",
            closing.as_str(),
        ]));
        let exporter = Arc::new(MockExporter::default());
        let ctl = controller(provider, exporter.clone());

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        let session = ctl.submit(&session, "ABCDEF123456").await.unwrap();
        let session = ctl.submit(&session, "My WiFi is really slow").await.unwrap();

        assert!(session.is_closed());
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert!(session.ended_at().is_some());
        assert!(session.is_saved());

        let last = session.visible_messages().last().unwrap();
        assert!(last.content.contains("Forget and reconnect to the WiFi network"));
        assert!(last.content.ends_with("https://survey.example.edu"));
        assert!(session
            .visible_messages()
            .iter()
            .all(|m| !m.content.contains(END_MARKER)));

        assert_eq!(exporter.count(), 1);
        let payload = exporter.exported.lock().unwrap()[0].clone();
        assert_eq!(payload.session_id, session.id());
        assert_eq!(payload.prolific_id.as_deref(), Some("ABCDEF123456"));
        assert_eq!(payload.messages.len(), 5);
        assert!(payload.messages.iter().all(|m| !m.is_system()));
    }

    #[tokio::test]
    async fn test_input_rejected_after_close() {
        let closing = closing_reply();
        let provider = Arc::new(MockProvider::replies(&[closing.as_str()]));
        let exporter = Arc::new(MockExporter::default());
        let ctl = controller(provider.clone(), exporter.clone());

        let closed = ctl
            .submit(&ctl.start_session(), "slow wifi")
            .await
            .unwrap();
        assert!(closed.is_closed());

        let err = ctl.submit(&closed, "one more thing").await.unwrap_err();
        assert!(matches!(err, DialogueError::ChatClosed));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(exporter.count(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_question_refused_and_chat_stays_open() {
        let provider = Arc::new(MockProvider::replies(&[GREETING, "Thanks!", REFUSAL_TEXT]));
        let exporter = Arc::new(MockExporter::default());
        let ctl = controller(provider, exporter.clone());

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        let session = ctl.submit(&session, "ABCDEF123456").await.unwrap();
        let session = ctl.submit(&session, "what's the weather").await.unwrap();

        assert_eq!(
            session.visible_messages().last().unwrap().content,
            REFUSAL_TEXT
        );
        assert!(!session.is_closed());
        assert_eq!(exporter.count(), 0);
    }

    #[tokio::test]
    async fn test_reset_after_close() {
        let closing = closing_reply();
        let provider = Arc::new(MockProvider::replies(&[GREETING, closing.as_str()]));
        let ctl = controller(provider, Arc::new(MockExporter::default()));

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        let closed = ctl.submit(&session, "slow wifi please").await.unwrap();
        assert!(closed.is_closed());

        let fresh = ctl.handle(&closed, UserAction::Reset).await.unwrap();

        assert_ne!(fresh.id(), closed.id());
        assert_eq!(fresh.phase(), SessionPhase::Fresh);
        assert!(fresh.visible_messages().is_empty());
        assert!(fresh.prolific_id().is_none());
        assert!(!fresh.is_saved());
        assert_eq!(fresh.system_prompt(), ctl.script().system_prompt());
    }

    #[tokio::test]
    async fn test_provider_failure_abandons_turn() {
        let provider = Arc::new(MockProvider::new(vec![
            Ok(LlmResponse::text(GREETING)),
            Err(ProviderError::Api {
                status: 500,
                body: "upstream down".into(),
            }),
        ]));
        let ctl = controller(provider, Arc::new(MockExporter::default()));

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        let err = ctl.submit(&session, "ABCDEF123456").await.unwrap_err();

        assert!(matches!(err, DialogueError::Provider(_)));
        // Caller still holds the pre-turn snapshot.
        assert_eq!(session.visible_messages().len(), 1);
        assert!(session.prolific_id().is_none());
    }

    #[tokio::test]
    async fn test_export_failure_leaves_saved_flag_unset() {
        let closing = closing_reply();
        let provider = Arc::new(MockProvider::replies(&[closing.as_str()]));
        let exporter = Arc::new(MockExporter::failing());
        let ctl = controller(provider, exporter.clone());

        let closed = ctl
            .submit(&ctl.start_session(), "slow wifi")
            .await
            .unwrap();

        assert!(closed.is_closed());
        assert!(!closed.is_saved());
        assert_eq!(exporter.count(), 1);
    }

    #[tokio::test]
    async fn test_export_skipped_when_already_saved() {
        let exporter = Arc::new(MockExporter::default());
        let ctl = controller(Arc::new(MockProvider::replies(&[])), exporter.clone());

        let mut session = ctl.start_session();
        session.close();
        ctl.export_once(&mut session).await;
        ctl.export_once(&mut session).await;

        assert_eq!(exporter.count(), 1);
        assert!(session.is_saved());
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let provider = Arc::new(MockProvider::replies(&[GREETING]));
        let ctl = controller(provider.clone(), Arc::new(MockExporter::default()));

        let err = ctl.submit(&ctl.start_session(), "   ").await.unwrap_err();
        assert!(matches!(err, DialogueError::EmptyMessage));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_reply_content_becomes_empty_message() {
        let provider = Arc::new(MockProvider::new(vec![Ok(LlmResponse::default())]));
        let ctl = controller(provider, Arc::new(MockExporter::default()));

        let session = ctl.greet(&ctl.start_session()).await.unwrap();
        assert_eq!(session.visible_messages(), &[Message::assistant("")]);
    }

    #[tokio::test]
    async fn test_handle_dispatch() {
        let provider = Arc::new(MockProvider::replies(&[GREETING, "How can I help?"]));
        let ctl = controller(provider, Arc::new(MockExporter::default()));

        let session = ctl
            .handle(&ctl.start_session(), UserAction::Greet)
            .await
            .unwrap();
        let session = ctl
            .handle(&session, UserAction::Submit("ABCDEF123456".into()))
            .await
            .unwrap();

        assert_eq!(session.visible_messages().len(), 3);
        assert_eq!(session.prolific_id(), Some("ABCDEF123456"));
    }
}
