//! Mock completion service for testing.
//!
//! Provides a configurable implementation of the CompletionService trait so
//! batch behavior can be tested without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{RunnerError, RunnerResult};
use crate::service::CompletionService;
use crate::types::{CompletionResponse, TokenUsage};

/// Predefined reply for a completion call.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub outcome: Result<CompletionResponse, RunnerError>,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn success(content: impl Into<String>) -> Self {
        let content = content.into();
        let tokens = content.split_whitespace().count() as u64;
        Self {
            outcome: Ok(CompletionResponse::new(
                content,
                Some(TokenUsage {
                    prompt_tokens: 1,
                    completion_tokens: tokens,
                    total_tokens: tokens + 1,
                }),
            )),
            delay: None,
        }
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        Self::failure(RunnerError::Transport(message.into()))
    }

    pub fn status(status: u16) -> Self {
        Self::failure(RunnerError::Status {
            status,
            body: String::new(),
        })
    }

    pub fn application_error(message: impl Into<String>) -> Self {
        Self::failure(RunnerError::Application(message.into()))
    }

    pub fn failure(error: RunnerError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
        }
    }

    /// Hold the reply back for a while before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Mock completion service.
///
/// Replies are looked up by prompt first, then taken round-robin from the
/// sequential list, and default to echoing the prompt.
#[derive(Clone, Default)]
pub struct MockCompletionService {
    /// Replies for specific prompts.
    by_prompt: Arc<RwLock<HashMap<String, MockReply>>>,
    /// Replies handed out in call order.
    sequence: Arc<RwLock<Vec<MockReply>>>,
    /// Index of next sequential reply.
    sequence_index: Arc<AtomicUsize>,
    /// Prompts received, in call order.
    captured_prompts: Arc<RwLock<Vec<String>>>,
}

impl MockCompletionService {
    /// Create a new mock service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to a specific prompt.
    pub fn on_prompt(self, prompt: impl Into<String>, reply: MockReply) -> Self {
        self.by_prompt.write().insert(prompt.into(), reply);
        self
    }

    /// Add a reply for the next call without a prompt-specific reply.
    pub fn add_reply(self, reply: MockReply) -> Self {
        self.sequence.write().push(reply);
        self
    }

    /// Get all captured prompts.
    pub fn get_prompts(&self) -> Vec<String> {
        self.captured_prompts.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_prompts.read().len()
    }

    fn next_reply(&self, prompt: &str) -> MockReply {
        if let Some(reply) = self.by_prompt.read().get(prompt) {
            return reply.clone();
        }

        let sequence = self.sequence.read();
        if sequence.is_empty() {
            return MockReply::success(format!("echo: {}", prompt));
        }
        let index = self.sequence_index.fetch_add(1, Ordering::SeqCst);
        sequence[index % sequence.len()].clone()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> RunnerResult<CompletionResponse> {
        self.captured_prompts.write().push(prompt.to_string());
        let reply = self.next_reply(prompt);

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.outcome
    }
}
