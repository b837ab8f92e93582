//! Tool-calling reasoning backend
//!
//! [`LlmBackend`] runs one job as a conversation: the persona becomes the
//! system prompt, the rendered task the first user turn, and every tool call
//! the model makes is answered from the job's own capability handles until
//! the model produces a final answer or the job's iteration budget runs out.

use crate::{CompletionRequest, LLMProvider, Message, StopReason, ToolCall, ToolDefinition};
use async_trait::async_trait;
use crew_core::{BackendOutput, Job, ReasoningBackend, TaskInputs, TaskReport, UsageStats};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const FINAL_ANSWER_PROMPT: &str = "You have used all available reasoning steps. \
     Stop calling tools and give your best complete final answer now.";

/// Model parameters for every job the backend runs
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: Some(0.7),
        }
    }
}

/// [`ReasoningBackend`] backed by a chat-completion provider
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    config: BackendConfig,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, config: BackendConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request(&self, conversation: &[Message], tools: &[ToolDefinition]) -> CompletionRequest {
        CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .tools(tools.to_vec())
            .build()
    }

    /// Answer each call from the job's handles
    ///
    /// Unknown tools and tool failures are reported back to the model
    /// rather than aborting the run.
    async fn run_tools(
        &self,
        job: &Job,
        calls: &[ToolCall],
        report: &mut TaskReport,
    ) -> Vec<Message> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            report.tool_calls.push(call.name.clone());

            let Some(tool) = job.tool(&call.name) else {
                warn!(tool = %call.name, "Model requested unknown tool");
                results.push(Message::tool_error(
                    &call.id,
                    format!("tool '{}' is not available", call.name),
                ));
                continue;
            };

            let started = Instant::now();
            match tool.execute(call.arguments.clone()).await {
                Ok(value) => {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    debug!(
                        tool = %call.name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        result_len = text.len(),
                        "Tool call succeeded"
                    );
                    results.push(Message::tool_result(&call.id, text));
                }
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool call failed");
                    results.push(Message::tool_error(&call.id, e.to_string()));
                }
            }
        }

        results
    }
}

#[async_trait]
impl ReasoningBackend for LlmBackend {
    #[instrument(skip(self, job, inputs), fields(kind = %job.kind(), ticker = %inputs.ticker))]
    async fn execute(&self, job: &Job, inputs: &TaskInputs) -> crew_core::Result<BackendOutput> {
        let task = job.render(inputs)?;
        let tools: Vec<ToolDefinition> = job
            .tools()
            .iter()
            .map(|t| ToolDefinition::from_tool(t.as_ref()))
            .collect();

        let mut conversation = vec![
            Message::system(task.system_prompt()),
            Message::user(task.user_prompt()),
        ];
        let mut report = TaskReport::default();
        let mut usage = UsageStats::default();

        for iteration in 1..=job.max_iterations() {
            report.iterations = iteration;
            let response = self
                .provider
                .complete(self.request(&conversation, &tools))
                .await?;
            usage.accumulate(response.usage.into());

            if response.stop_reason == StopReason::ToolUse && response.message.has_tool_calls() {
                debug!(
                    iteration,
                    calls = response.message.tool_calls.len(),
                    "Model requested tools"
                );
                let calls = response.message.tool_calls.clone();
                conversation.push(response.message);
                let results = self.run_tools(job, &calls, &mut report).await;
                conversation.extend(results);
                continue;
            }

            if response.stop_reason == StopReason::MaxTokens {
                warn!(iteration, "Response truncated at token limit");
            }

            info!(iteration, tokens = usage.total(), "Job finished");
            report.raw_output = response.message.content;
            report.usage = Some(usage);
            return Ok(BackendOutput::Report(report));
        }

        warn!(
            max_iterations = job.max_iterations(),
            "Iteration budget exhausted, forcing a final answer"
        );
        conversation.push(Message::user(FINAL_ANSWER_PROMPT));
        let response = self.provider.complete(self.request(&conversation, &[])).await?;
        usage.accumulate(response.usage.into());

        report.raw_output = response.message.content;
        report.usage = Some(usage);
        Ok(BackendOutput::Report(report))
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockLLMProvider;
    use crate::{CompletionResponse, LLMError, TokenUsage};
    use crew_core::{JobSpec, Kind, Persona, Tool};
    use serde_json::{Value, json};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, params: Value) -> crew_core::Result<Value> {
            Ok(json!(format!("echo: {}", params["query"])))
        }

        fn name(&self) -> &str {
            "search_internet"
        }

        fn description(&self) -> &str {
            "Echoes the query"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn job(max_iterations: usize) -> Job {
        Job::from_spec(
            JobSpec {
                kind: Kind::Sentiment,
                persona: Persona::new("Analyst", "Gauge mood", "Reads the news."),
                task_description: "Analyze {{ ticker }}".to_string(),
                expected_output: "Report".to_string(),
                max_iterations,
                allow_delegation: false,
            },
            vec![Arc::new(EchoTool) as Arc<dyn Tool>],
        )
        .unwrap()
    }

    fn inputs() -> TaskInputs {
        TaskInputs {
            ticker: "AAPL".to_string(),
            ..TaskInputs::default()
        }
    }

    fn usage() -> TokenUsage {
        TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        }
    }

    fn final_answer(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: usage(),
        }
    }

    fn tool_call() -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_tool_calls(
                None,
                vec![ToolCall {
                    id: "call_1".to_string(),
                    name: "search_internet".to_string(),
                    arguments: json!({"query": "AAPL"}),
                }],
            ),
            stop_reason: StopReason::ToolUse,
            usage: usage(),
        }
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let mut provider = MockLLMProvider::new();
        provider
            .expect_complete()
            .times(1)
            .withf(|req| {
                req.messages.len() == 2
                    && req.messages[1].text().is_some_and(|t| t.contains("Analyze AAPL"))
                    && req.tools.len() == 1
            })
            .returning(|_| Ok(final_answer("Bullish")));

        let backend = LlmBackend::new(Arc::new(provider), BackendConfig::default());
        let output = backend.execute(&job(5), &inputs()).await.unwrap();

        let BackendOutput::Report(report) = output else {
            panic!("expected report");
        };
        assert_eq!(report.raw_output.as_deref(), Some("Bullish"));
        assert_eq!(report.iterations, 1);
        assert_eq!(report.usage.unwrap().total(), 15);
    }

    #[tokio::test]
    async fn test_tool_loop() {
        let mut provider = MockLLMProvider::new();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(tool_call()));
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|req| {
                req.messages.last().is_some_and(|m| {
                    m.tool_call_id.as_deref() == Some("call_1") && m.text() == Some("echo: \"AAPL\"")
                })
            })
            .returning(|_| Ok(final_answer("Neutral")));

        let backend = LlmBackend::new(Arc::new(provider), BackendConfig::default());
        let output = backend.execute(&job(5), &inputs()).await.unwrap();

        let BackendOutput::Report(report) = output else {
            panic!("expected report");
        };
        assert_eq!(report.raw_output.as_deref(), Some("Neutral"));
        assert_eq!(report.tool_calls, vec!["search_internet".to_string()]);
        assert_eq!(report.iterations, 2);
    }

    #[tokio::test]
    async fn test_budget_exhausted_forces_final_answer() {
        let mut provider = MockLLMProvider::new();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(tool_call()));
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|req| req.tools.is_empty())
            .returning(|_| Ok(final_answer("Best effort")));

        let backend = LlmBackend::new(Arc::new(provider), BackendConfig::default());
        let output = backend.execute(&job(1), &inputs()).await.unwrap();

        let BackendOutput::Report(report) = output else {
            panic!("expected report");
        };
        assert_eq!(report.raw_output.as_deref(), Some("Best effort"));
        assert_eq!(report.usage.unwrap().total(), 30);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut provider = MockLLMProvider::new();
        provider
            .expect_complete()
            .returning(|_| Err(LLMError::AuthenticationFailed));

        let backend = LlmBackend::new(Arc::new(provider), BackendConfig::default());
        let err = backend.execute(&job(3), &inputs()).await.unwrap_err();
        assert!(matches!(err, crew_core::Error::ExecutionFailed(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let mut provider = MockLLMProvider::new();
        let mut seq = mockall::Sequence::new();
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(CompletionResponse {
                    message: Message::assistant_tool_calls(
                        None,
                        vec![ToolCall {
                            id: "call_x".to_string(),
                            name: "read_file".to_string(),
                            arguments: json!({}),
                        }],
                    ),
                    stop_reason: StopReason::ToolUse,
                    usage: TokenUsage::default(),
                })
            });
        provider
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|req| {
                req.messages
                    .last()
                    .and_then(Message::text)
                    .is_some_and(|t| t.starts_with("Error: tool 'read_file'"))
            })
            .returning(|_| Ok(final_answer("Done")));

        let backend = LlmBackend::new(Arc::new(provider), BackendConfig::default());
        assert!(backend.execute(&job(5), &inputs()).await.is_ok());
    }
}
