//! LLM reasoning backend for stock-crew
//!
//! This crate connects constructed jobs to a chat-completion model. It
//! includes:
//!
//! - Message, completion and tool definition types in the OpenAI chat shape
//! - The [`LLMProvider`] trait and an OpenAI-compatible implementation
//! - [`LlmBackend`], the [`crew_core::ReasoningBackend`] that runs a job's
//!   tool-calling loop

pub mod backend;
pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

#[cfg(feature = "openai")]
pub mod providers;

pub use backend::{BackendConfig, LlmBackend};
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role, ToolCall};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;
