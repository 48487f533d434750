//! Completion service trait.

use async_trait::async_trait;

use crate::error::RunnerResult;
use crate::types::CompletionResponse;

/// A text-completion backend: one prompt in, one response or error out.
///
/// Implementations make a single attempt per call and do not retry.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> RunnerResult<CompletionResponse>;
}
