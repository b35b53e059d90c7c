//! SendMessage command handler.
//!
//! Runs one roleplay turn: validate the message, extract fields, ask the
//! LLM for the coach's reply, then decide whether the stage is complete.
//! The turn works on a copy of the stored state and writes it back only
//! after the reply arrives, so a failed call leaves the session untouched.
//! Turns on the same session run one at a time under its `SessionLocks`
//! entry.

use std::sync::Arc;
use thiserror::Error;
use tokio::time::timeout;

use crate::domain::conversation::{
    CompletionHeuristic, ExtractedField, ExtractorConfig, FieldExtractor, Stage, TurnRole,
};
use crate::domain::foundation::SessionId;
use crate::ports::{
    CompletionRequest, LlmProvider, ProviderError, SessionStore, SessionStoreError, TokenUsage,
};

use super::session_locks::SessionLocks;
use super::settings::RoleplaySettings;

/// Command to send a user message to a session.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            content: content.into(),
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageResult {
    /// The coach's reply.
    pub reply: String,
    /// Stage that produced the reply.
    pub replied_in: Stage,
    /// Stage after the turn.
    pub stage: Stage,
    /// True if this turn completed `replied_in`.
    pub advanced: bool,
    /// Fields filled from the user message.
    pub extracted: Vec<ExtractedField>,
    pub usage: TokenUsage,
}

/// Errors that can occur when sending a message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SendMessageError {
    /// Message content is empty or whitespace only.
    #[error("Validation error: message content cannot be empty")]
    EmptyMessage,

    /// Message content exceeds the configured limit.
    #[error("Validation error: message is {actual} characters, limit is {max}")]
    MessageTooLong { max: usize, actual: usize },

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// LLM call failed; the session was not modified.
    #[error("LLM provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Session store error: {0}")]
    Store(SessionStoreError),
}

impl From<SessionStoreError> for SendMessageError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => SendMessageError::SessionNotFound(id),
            other => SendMessageError::Store(other),
        }
    }
}

impl SendMessageError {
    /// Text to show the user in place of a reply.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyMessage => "Please type a message before sending.".to_string(),
            Self::MessageTooLong { max, .. } => {
                format!("That message is too long. Please keep it under {} characters.", max)
            }
            Self::SessionNotFound(_) => {
                "This roleplay session has ended. Please start a new one.".to_string()
            }
            Self::Provider(err) => err.fallback_message().to_string(),
            Self::Store(_) => "Something went wrong saving your session. Please try again.".to_string(),
        }
    }
}

/// Handler for roleplay turns.
pub struct SendMessageHandler {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn SessionStore>,
    extractor: FieldExtractor,
    heuristic: CompletionHeuristic,
    settings: RoleplaySettings,
    locks: SessionLocks,
}

impl SendMessageHandler {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn SessionStore>,
        settings: RoleplaySettings,
    ) -> Self {
        let extractor = FieldExtractor::new(
            ExtractorConfig::default().with_max_field_chars(settings.max_field_chars),
        );
        Self {
            provider,
            store,
            extractor,
            heuristic: CompletionHeuristic::default(),
            settings,
            locks: SessionLocks::new(),
        }
    }

    /// Shares turn locks with other handlers on the same store.
    pub fn with_locks(mut self, locks: SessionLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Replaces the keyword tables.
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the signal-phrase tables.
    pub fn with_heuristic(mut self, heuristic: CompletionHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub async fn handle(
        &self,
        cmd: SendMessageCommand,
    ) -> Result<SendMessageResult, SendMessageError> {
        // 1. Validate input
        let content = cmd.content.trim();
        if content.is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }
        let length = content.chars().count();
        if length > self.settings.max_message_chars {
            return Err(SendMessageError::MessageTooLong {
                max: self.settings.max_message_chars,
                actual: length,
            });
        }

        // 2. Serialize turns on this session
        let guard = self.locks.acquire(cmd.session_id).await;
        let result = self.run_turn(cmd.session_id, content).await;
        drop(guard);
        self.locks.release(cmd.session_id).await;
        result
    }

    async fn run_turn(
        &self,
        session_id: SessionId,
        content: &str,
    ) -> Result<SendMessageResult, SendMessageError> {
        // 3. Load a private copy of the session
        let mut state = self
            .store
            .get(session_id)
            .await?
            .ok_or(SendMessageError::SessionNotFound(session_id))?;
        let stage = state.stage();

        // 4. Record the user turn and extract fields
        state.record_turn(TurnRole::User, content);
        let outcome = self.extractor.extract(stage, content, state.extracted_mut());

        // 5. Ask the LLM for the reply
        let request = CompletionRequest::new(state.current_prompt())
            .with_turns(state.history().iter())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        let response = match timeout(self.settings.llm_timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(self.provider_failure(session_id, err)),
            Err(_) => {
                let err = ProviderError::timed_out_after(self.settings.llm_timeout);
                return Err(self.provider_failure(session_id, err));
            }
        };

        // 6. Record the reply and check stage completion
        state.record_turn(TurnRole::Assistant, response.content.as_str());
        let advanced = self
            .heuristic
            .should_advance(stage, &response.content, state.extracted())
            && state.advance();
        let new_stage = state.stage();

        // 7. Persist
        self.store.put(session_id, state).await?;

        Ok(SendMessageResult {
            reply: response.content,
            replied_in: stage,
            stage: new_stage,
            advanced,
            extracted: outcome.updated,
            usage: response.usage,
        })
    }

    fn provider_failure(&self, session_id: SessionId, err: ProviderError) -> SendMessageError {
        tracing::warn!(
            session_id = %session_id,
            provider = %self.provider.provider_info().name,
            error = %err,
            kind = ?err.kind(),
            "LLM call failed; turn discarded"
        );
        SendMessageError::Provider(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockLlmProvider;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::conversation::ConversationState;
    use crate::ports::{MessageRole, ProviderErrorKind};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Fixture {
        provider: MockLlmProvider,
        store: Arc<InMemorySessionStore>,
        handler: SendMessageHandler,
        session_id: SessionId,
    }

    async fn fixture_with(settings: RoleplaySettings, provider: MockLlmProvider) -> Fixture {
        let store = Arc::new(InMemorySessionStore::new());
        let state = ConversationState::new(SessionId::new(), settings.history_window);
        let session_id = state.session_id();
        store.put(session_id, state).await.unwrap();

        let handler =
            SendMessageHandler::new(Arc::new(provider.clone()), store.clone(), settings);

        Fixture {
            provider,
            store,
            handler,
            session_id,
        }
    }

    async fn fixture(provider: MockLlmProvider) -> Fixture {
        fixture_with(RoleplaySettings::default(), provider).await
    }

    impl Fixture {
        async fn send(&self, content: &str) -> Result<SendMessageResult, SendMessageError> {
            self.handler
                .handle(SendMessageCommand::new(self.session_id, content))
                .await
        }

        async fn state(&self) -> ConversationState {
            self.store.get(self.session_id).await.unwrap().unwrap()
        }
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn empty_message_is_rejected_without_calling_llm() {
            let f = fixture(MockLlmProvider::new()).await;

            assert_eq!(f.send("   ").await, Err(SendMessageError::EmptyMessage));
            assert_eq!(f.provider.call_count(), 0);
        }

        #[tokio::test]
        async fn overlong_message_is_rejected() {
            let settings = RoleplaySettings {
                max_message_chars: 5,
                ..Default::default()
            };
            let f = fixture_with(settings, MockLlmProvider::new()).await;

            assert_eq!(
                f.send("abcdef").await,
                Err(SendMessageError::MessageTooLong { max: 5, actual: 6 })
            );
            assert!(f.send("  abcde  ").await.is_ok());
        }

        #[tokio::test]
        async fn unknown_session_is_not_found() {
            let f = fixture(MockLlmProvider::new()).await;
            let missing = SessionId::new();

            let result = f
                .handler
                .handle(SendMessageCommand::new(missing, "hello"))
                .await;

            assert_eq!(result, Err(SendMessageError::SessionNotFound(missing)));
        }
    }

    mod turns {
        use super::*;

        #[tokio::test]
        async fn intent_turn_extracts_and_advances() {
            let f = fixture(MockLlmProvider::new().with_response("Got it, that makes sense.")).await;

            let result = f.send("I need help losing weight").await.unwrap();

            assert_eq!(result.reply, "Got it, that makes sense.");
            assert_eq!(result.replied_in, Stage::Intent);
            assert_eq!(result.stage, Stage::Logical);
            assert!(result.advanced);
            assert_eq!(result.extracted, vec![ExtractedField::DesiredOutcome]);

            let state = f.state().await;
            assert_eq!(state.stage(), Stage::Logical);
            assert_eq!(
                state.extracted().desired_outcome.as_deref(),
                Some("I need help losing weight")
            );
            assert_eq!(state.history().len(), 2);
        }

        #[tokio::test]
        async fn phrase_without_data_stays_in_stage() {
            let f = fixture(MockLlmProvider::new().with_response("Got it!")).await;

            let result = f.send("hello there").await.unwrap();

            assert!(!result.advanced);
            assert_eq!(result.stage, Stage::Intent);
            assert_eq!(f.state().await.turns_in(Stage::Intent), 1);
        }

        #[tokio::test]
        async fn request_carries_stage_prompt_and_history() {
            let f = fixture(MockLlmProvider::new().with_response("Tell me more.")).await;

            f.send("I want more clients").await.unwrap();
            f.send("  second message  ").await.unwrap();

            let call = f.provider.last_call().unwrap();
            assert!(call.system_prompt.contains("STAGE: INTENT"));
            assert!(call.system_prompt.contains("I want more clients"));
            let roles: Vec<_> = call.messages.iter().map(|m| m.role).collect();
            assert_eq!(
                roles,
                vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
            );
            assert_eq!(call.messages[2].content, "second message");
            assert_eq!(call.max_tokens, 300);
        }

        #[tokio::test]
        async fn history_window_bounds_request() {
            let settings = RoleplaySettings {
                history_window: 3,
                ..Default::default()
            };
            let f = fixture_with(settings, MockLlmProvider::new()).await;

            for i in 0..4 {
                f.send(&format!("message {i}")).await.unwrap();
            }

            assert_eq!(f.provider.last_call().unwrap().messages.len(), 3);
            assert_eq!(f.state().await.history().len(), 3);
        }

        #[tokio::test]
        async fn concurrent_sends_keep_both_turns() {
            let provider = MockLlmProvider::new().with_delay(Duration::from_millis(50));
            let f = fixture(provider).await;

            let (first, second) = tokio::join!(f.send("hello there"), f.send("still here"));

            assert!(first.is_ok());
            assert!(second.is_ok());
            assert_eq!(f.provider.call_count(), 2);

            let state = f.state().await;
            assert_eq!(state.history().len(), 4);
            assert_eq!(state.turns_in(Stage::Intent), 2);
            // The second turn saw the first one's exchange.
            assert_eq!(f.provider.last_call().unwrap().messages.len(), 3);
        }

        #[tokio::test]
        async fn locks_are_released_after_turn() {
            let locks = SessionLocks::new();
            let f = fixture(MockLlmProvider::new()).await;
            let handler = SendMessageHandler::new(
                Arc::new(f.provider.clone()),
                f.store.clone(),
                RoleplaySettings::default(),
            )
            .with_locks(locks.clone());

            handler
                .handle(SendMessageCommand::new(f.session_id, "hello"))
                .await
                .unwrap();

            assert!(locks.is_empty().await);
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn provider_error_leaves_state_untouched() {
            let f = fixture(
                MockLlmProvider::new().with_error(ProviderError::rate_limited(10)),
            )
            .await;
            let before = f.state().await;

            let err = f.send("I need more leads").await.unwrap_err();

            assert_eq!(err, SendMessageError::Provider(ProviderError::rate_limited(10)));
            assert_eq!(f.state().await, before);
        }

        #[tokio::test]
        async fn user_message_follows_error_kind() {
            let f = fixture(
                MockLlmProvider::new().with_error(ProviderError::AuthenticationFailed),
            )
            .await;

            let err = f.send("hello").await.unwrap_err();

            assert_eq!(
                err.user_message(),
                ProviderErrorKind::Authentication.fallback_message()
            );
        }

        #[tokio::test]
        async fn slow_provider_times_out() {
            let settings = RoleplaySettings {
                llm_timeout: Duration::from_millis(20),
                ..Default::default()
            };
            let provider = MockLlmProvider::new().with_delay(Duration::from_millis(500));
            let f = fixture_with(settings, provider).await;
            let before = f.state().await;

            let err = f.send("hello").await.unwrap_err();

            assert_eq!(err, SendMessageError::Provider(ProviderError::timeout(1)));
            assert!(err.to_string().contains("1s"));
            assert_eq!(f.state().await, before);
        }

        struct FailingStore;

        #[async_trait]
        impl SessionStore for FailingStore {
            async fn get(
                &self,
                _session_id: SessionId,
            ) -> Result<Option<ConversationState>, SessionStoreError> {
                Err(SessionStoreError::Backend("offline".to_string()))
            }

            async fn put(
                &self,
                _session_id: SessionId,
                _state: ConversationState,
            ) -> Result<(), SessionStoreError> {
                Err(SessionStoreError::Backend("offline".to_string()))
            }

            async fn remove(&self, _session_id: SessionId) -> Result<(), SessionStoreError> {
                Err(SessionStoreError::Backend("offline".to_string()))
            }
        }

        #[tokio::test]
        async fn store_errors_propagate() {
            let handler = SendMessageHandler::new(
                Arc::new(MockLlmProvider::new()),
                Arc::new(FailingStore),
                RoleplaySettings::default(),
            );

            let err = handler
                .handle(SendMessageCommand::new(SessionId::new(), "hello"))
                .await
                .unwrap_err();

            assert!(matches!(err, SendMessageError::Store(_)));
        }
    }
}
