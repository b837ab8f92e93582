//! Bounded execution of one job
//!
//! Every run hands the job to the reasoning backend on its own task and waits
//! at most the configured budget. Whatever happens, the caller gets an
//! [`ExecutionResult`] with non-empty text; failures are folded into
//! per-kind status messages and never escape as errors.

use crate::engine::context::{PreloadedAnalysis, assemble};
use crate::engine::normalize::normalize;
use crate::error::CrewError;
use chrono::Datelike;
use crew_core::{Job, Kind, ReasoningBackend, TaskInputs};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::{Instant, timeout};
use tracing::{info, warn};

const EMPTY_RESULT: &str = "the reasoning backend returned an empty result";

/// Outcome category of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Ok,
    Timeout,
    Error,
}

/// What one job produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub kind: Kind,
    /// Analysis text, or the status message for a timeout or error
    pub text: String,
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    pub fn ok(kind: Kind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            status: ExecutionStatus::Ok,
        }
    }

    /// Timeout placeholder; chat suggests narrowing the question
    pub fn timeout(kind: Kind, ticker: &str) -> Self {
        let hint = if kind.is_chat() {
            "Please try asking a more specific question."
        } else {
            "Please try again later."
        };
        Self {
            kind,
            text: format!("{} for {ticker} timed out. {hint}", kind.label()),
            status: ExecutionStatus::Timeout,
        }
    }

    pub fn error(kind: Kind, ticker: &str, message: &str) -> Self {
        Self {
            kind,
            text: format!(
                "{} for {ticker} could not be completed. Error: {message}",
                kind.label()
            ),
            status: ExecutionStatus::Error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExecutionStatus::Ok
    }
}

/// Per-call inputs shared by every job of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub ticker: String,
    pub search_scope: String,
    pub current_year: String,
    pub question: Option<String>,
    pub preloaded: Option<PreloadedAnalysis>,
    /// Pre-assembled chat context; takes precedence over `preloaded`
    pub context: Option<String>,
}

impl ExecutionRequest {
    pub fn new(ticker: impl Into<String>, search_scope: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            search_scope: search_scope.into(),
            current_year: current_year(),
            ..Self::default()
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_preloaded(mut self, preloaded: PreloadedAnalysis) -> Self {
        self.preloaded = Some(preloaded);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_current_year(mut self, year: impl Into<String>) -> Self {
        self.current_year = year.into();
        self
    }

    /// Template inputs for one kind
    ///
    /// Only chat jobs receive `question` and `context`.
    pub fn to_inputs(&self, kind: Kind) -> TaskInputs {
        let (question, context) = if kind.is_chat() {
            let context = self.context.clone().unwrap_or_else(|| {
                assemble(
                    self.preloaded.as_ref().unwrap_or(&PreloadedAnalysis::default()),
                    None,
                    &self.ticker,
                )
            });
            (self.question.clone(), Some(context))
        } else {
            (None, None)
        };

        TaskInputs {
            ticker: self.ticker.clone(),
            topic: format!("{} for {}", kind.label(), self.ticker),
            current_year: self.current_year.clone(),
            search_scope: self.search_scope.clone(),
            question,
            context,
        }
    }
}

/// Current calendar year in local time
pub fn current_year() -> String {
    chrono::Local::now().year().to_string()
}

/// Runs jobs against a reasoning backend under a time budget
#[derive(Clone)]
pub struct Executor {
    backend: Arc<dyn ReasoningBackend>,
    timeout: Duration,
}

impl Executor {
    pub fn new(backend: Arc<dyn ReasoningBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run a job with the default budget
    pub async fn run(&self, job: Arc<Job>, request: &ExecutionRequest) -> ExecutionResult {
        self.run_with_timeout(job, request, self.timeout).await
    }

    /// Run a job, waiting at most `limit`
    ///
    /// On timeout the worker task is aborted. Abort takes effect at the
    /// worker's next await point; a backend stuck in blocking code keeps its
    /// thread until it returns.
    pub async fn run_with_timeout(
        &self,
        job: Arc<Job>,
        request: &ExecutionRequest,
        limit: Duration,
    ) -> ExecutionResult {
        let kind = job.kind();
        let ticker = request.ticker.as_str();
        let inputs = request.to_inputs(kind);
        let backend = Arc::clone(&self.backend);
        let started = Instant::now();

        info!(
            kind = %kind,
            ticker = %ticker,
            variant = ?job.variant(),
            backend = %backend.name(),
            "Starting job"
        );

        let mut handle = tokio::spawn(async move {
            let output = backend.execute(&job, &inputs).await?;
            let text = normalize(&output);
            if text.trim().is_empty() {
                return Err(CrewError::ExecutionFailed(EMPTY_RESULT.to_string()));
            }
            Ok(text)
        });

        let result = match timeout(limit, &mut handle).await {
            Ok(Ok(Ok(text))) => ExecutionResult::ok(kind, text),
            Ok(Ok(Err(err))) => {
                warn!(kind = %kind, ticker = %ticker, error = %err, "Job failed");
                ExecutionResult::error(kind, ticker, &err.to_string())
            }
            Ok(Err(join_err)) => {
                let message = join_error_message(&join_err);
                warn!(kind = %kind, ticker = %ticker, error = %message, "Job worker died");
                ExecutionResult::error(kind, ticker, &message)
            }
            Err(_) => {
                handle.abort();
                let err = CrewError::ExecutionTimeout {
                    kind,
                    ticker: ticker.to_string(),
                    secs: limit.as_secs(),
                };
                warn!(kind = %kind, ticker = %ticker, "{err}");
                ExecutionResult::timeout(kind, ticker)
            }
        };

        info!(
            kind = %kind,
            ticker = %ticker,
            status = ?result.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Finished job"
        );
        result
    }
}

fn join_error_message(err: &JoinError) -> String {
    if err.is_panic() {
        "the analysis worker panicked".to_string()
    } else {
        "the analysis worker was cancelled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{fallback, templates};
    use crate::testing::{Script, ScriptedBackend};

    fn job(kind: Kind) -> Arc<Job> {
        Arc::new(Job::from_spec(templates::spec(kind, 1), Vec::new()).unwrap())
    }

    fn executor_with(backend: ScriptedBackend) -> (Executor, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let executor = Executor::new(backend.clone(), Duration::from_secs(120));
        (executor, backend)
    }

    fn request() -> ExecutionRequest {
        ExecutionRequest::new("AAPL", "Limited to top financial websites").with_current_year("2025")
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_backend_times_out_at_budget() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Hang));

        let started = Instant::now();
        let result = executor.run(job(Kind::Sentiment), &request()).await;
        let waited = started.elapsed();

        assert_eq!(result.status, ExecutionStatus::Timeout);
        assert_eq!(
            result.text,
            "Sentiment analysis for AAPL timed out. Please try again later."
        );
        assert!(waited >= Duration::from_secs(120));
        assert!(waited < Duration::from_secs(121));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_timeout_message() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Hang));
        let result = executor
            .run(job(Kind::Chat), &request().with_question("Buy?"))
            .await;

        assert_eq!(result.status, ExecutionStatus::Timeout);
        assert_eq!(
            result.text,
            "Analysis for AAPL timed out. Please try asking a more specific question."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_within_budget_succeeds() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Slow(
            Duration::from_secs(119),
            "Late but fine".to_string(),
        )));
        let result = executor.run(job(Kind::Risk), &request()).await;

        assert!(result.is_ok());
        assert_eq!(result.text, "Late but fine");
    }

    #[tokio::test]
    async fn test_backend_error_becomes_error_text() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Fail("boom".to_string())));
        let result = executor.run(job(Kind::Technical), &request()).await;

        assert_eq!(result.status, ExecutionStatus::Error);
        assert!(
            result
                .text
                .starts_with("Technical analysis for AAPL could not be completed. Error: ")
        );
        assert!(result.text.contains("boom"));
    }

    #[tokio::test]
    async fn test_panic_is_error() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Panic));
        let result = executor.run(job(Kind::Quantitative), &request()).await;
        assert_eq!(result.status, ExecutionStatus::Error);
        assert!(result.text.contains("panicked"));
    }

    #[tokio::test]
    async fn test_report_without_answer_is_error() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Empty));
        let result = executor.run(job(Kind::Quantitative), &request()).await;
        assert_eq!(result.status, ExecutionStatus::Error);
        assert_eq!(
            result.text,
            format!("Quantitative analysis for AAPL could not be completed. Error: {EMPTY_RESULT}")
        );
        assert!(!result.text.contains("Task report"));

        let (executor, _) = executor_with(ScriptedBackend::new(Script::Reply("   ".to_string())));
        let result = executor.run(job(Kind::Risk), &request()).await;
        assert_eq!(result.status, ExecutionStatus::Error);
    }

    #[tokio::test]
    async fn test_minimal_job_produces_text() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Echo));
        let minimal = Arc::new(fallback::minimal(Kind::Risk, "risk assessment"));

        let result = executor.run(minimal, &request()).await;
        assert!(result.is_ok());
        assert!(!result.text.trim().is_empty());
        assert!(result.text.contains("risk assessment"));
    }

    #[tokio::test]
    async fn test_inputs_reach_backend() {
        let (executor, backend) = executor_with(ScriptedBackend::new(Script::Echo));
        let preloaded = PreloadedAnalysis::default().with(Kind::Sentiment, "Bullish");

        let result = executor
            .run(
                job(Kind::Chat),
                &request()
                    .with_question("Should I buy?")
                    .with_preloaded(preloaded),
            )
            .await;
        assert!(result.is_ok());
        assert!(result.text.contains("Should I buy?"));

        let seen = backend.seen();
        assert_eq!(seen.len(), 1);
        let (kind, inputs) = &seen[0];
        assert_eq!(*kind, Kind::Chat);
        assert_eq!(inputs.topic, "Analysis for AAPL");
        assert_eq!(inputs.current_year, "2025");
        assert_eq!(inputs.context.as_deref(), Some("SENTIMENT ANALYSIS:\nBullish"));
    }

    #[tokio::test]
    async fn test_chat_without_question_is_error() {
        let (executor, _) = executor_with(ScriptedBackend::new(Script::Echo));
        let result = executor.run(job(Kind::Chat), &request()).await;
        assert_eq!(result.status, ExecutionStatus::Error);
    }

    #[test]
    fn test_analysis_inputs_omit_chat_fields() {
        let inputs = request().with_question("ignored").to_inputs(Kind::Technical);
        assert_eq!(inputs.topic, "Technical analysis for AAPL");
        assert_eq!(inputs.question, None);
        assert_eq!(inputs.context, None);
    }

    #[test]
    fn test_chat_inputs_default_context() {
        let inputs = request().with_question("Buy?").to_inputs(Kind::Chat);
        assert_eq!(
            inputs.context.as_deref(),
            Some("No preloaded analysis available.")
        );

        let inputs = request()
            .with_question("Buy?")
            .with_context("given")
            .to_inputs(Kind::Chat);
        assert_eq!(inputs.context.as_deref(), Some("given"));
    }
}
