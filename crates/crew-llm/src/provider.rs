//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// A chat-completion service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate one completion for the given conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name (e.g., "openai")
    fn name(&self) -> &str;
}
