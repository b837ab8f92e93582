//! The reasoning backend seam
//!
//! A backend takes a constructed [`Job`] plus the inputs for one execution and
//! produces some output. What that output looks like depends on the backend:
//! a structured report from the tool-calling loop, a plain string, or raw
//! JSON from a remote service. Callers reduce it to text with a normalizer.

use crate::{Job, Result, TaskInputs};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Token accounting for one execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl UsageStats {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Add another execution's usage to this one
    pub fn accumulate(&mut self, other: UsageStats) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Structured result of a job run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Final answer text, if the backend produced one
    pub raw_output: Option<String>,
    /// Names of tools called, in call order
    pub tool_calls: Vec<String>,
    /// Reasoning iterations used
    pub iterations: usize,
    pub usage: Option<UsageStats>,
}

impl TaskReport {
    pub fn with_output(raw_output: impl Into<String>) -> Self {
        Self {
            raw_output: Some(raw_output.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task report: {} iteration(s), {} tool call(s)",
            self.iterations,
            self.tool_calls.len()
        )?;
        if let Some(usage) = self.usage {
            write!(f, ", {} tokens", usage.total())?;
        }
        Ok(())
    }
}

/// Whatever a backend returned for one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BackendOutput {
    Report(TaskReport),
    Text(String),
    Json(Value),
}

impl From<TaskReport> for BackendOutput {
    fn from(report: TaskReport) -> Self {
        BackendOutput::Report(report)
    }
}

impl From<String> for BackendOutput {
    fn from(text: String) -> Self {
        BackendOutput::Text(text)
    }
}

/// Runs a job to completion
///
/// Implementations must be safe to call concurrently with the same job.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Execute one job with the given inputs
    async fn execute(&self, job: &Job, inputs: &TaskInputs) -> Result<BackendOutput>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = TaskReport {
            raw_output: Some("done".to_string()),
            tool_calls: vec!["search_internet".to_string()],
            iterations: 2,
            usage: Some(UsageStats {
                input_tokens: 100,
                output_tokens: 20,
            }),
        };
        assert_eq!(
            report.to_string(),
            "Task report: 2 iteration(s), 1 tool call(s), 120 tokens"
        );
    }

    #[test]
    fn test_usage_accumulate() {
        let mut total = UsageStats::default();
        total.accumulate(UsageStats {
            input_tokens: 10,
            output_tokens: 5,
        });
        total.accumulate(UsageStats {
            input_tokens: 1,
            output_tokens: 1,
        });
        assert_eq!(total.total(), 17);
    }
}
