//! Mock LLM Provider for testing.
//!
//! Provides a scripted implementation of the LlmProvider port, allowing
//! roleplay flows to run without calling real APIs.
//!
//! # Features
//!
//! - Pre-configured replies consumed in order
//! - Error injection for failure-path testing
//! - Simulated delays for timeout testing
//! - Call recording for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockLlmProvider::new()
//!     .with_response("Got it, that makes sense.")
//!     .with_error(ProviderError::rate_limited(5));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ProviderError,
    ProviderInfo, TokenUsage,
};

/// Reply returned once the script runs out.
pub const DEFAULT_MOCK_REPLY: &str = "Mock response";

/// A scripted outcome for one call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(ProviderError),
}

/// Mock LLM provider for testing.
#[derive(Debug, Clone)]
pub struct MockLlmProvider {
    /// Scripted outcomes (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success(content.into()));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a reply on a shared handle.
    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Returns the most recent call.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        lock(&self.calls).last().cloned()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success(DEFAULT_MOCK_REPLY.to_string()))
    }
}

/// Locks a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success(content) => Ok(CompletionResponse {
                content,
                model: self.info.model.clone(),
                usage: TokenUsage::new(10, 20),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MessageRole;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new("system").with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn returns_responses_in_order() {
        let provider = MockLlmProvider::new()
            .with_response("First")
            .with_response("Second");

        assert_eq!(provider.complete(test_request()).await.unwrap().content, "First");
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "Second");
    }

    #[tokio::test]
    async fn falls_back_to_default_reply() {
        let provider = MockLlmProvider::new();
        let response = provider.complete(test_request()).await.unwrap();
        assert_eq!(response.content, DEFAULT_MOCK_REPLY);
        assert_eq!(response.model, "mock-model-1");
    }

    #[tokio::test]
    async fn returns_injected_errors() {
        let provider = MockLlmProvider::new()
            .with_error(ProviderError::AuthenticationFailed)
            .with_response("recovered");

        assert_eq!(
            provider.complete(test_request()).await.unwrap_err(),
            ProviderError::AuthenticationFailed
        );
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "recovered");
    }

    #[tokio::test]
    async fn records_calls() {
        let provider = MockLlmProvider::new();
        provider.complete(test_request()).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        let call = provider.last_call().unwrap();
        assert_eq!(call.system_prompt, "system");
        assert_eq!(call.messages.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_script() {
        let provider = MockLlmProvider::new();
        let handle = provider.clone();
        handle.push(MockResponse::Success("shared".into()));

        assert_eq!(provider.complete(test_request()).await.unwrap().content, "shared");
        assert_eq!(handle.call_count(), 1);
    }

    #[tokio::test]
    async fn delay_is_applied() {
        let provider = MockLlmProvider::new().with_delay(Duration::from_millis(20));
        let start = std::time::Instant::now();
        provider.complete(test_request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
