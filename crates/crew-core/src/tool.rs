//! Capability handle trait

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A capability a job can use while reasoning, such as web search
///
/// Handles are shared between jobs through `Arc<dyn Tool>`, so they must be
/// safe to call concurrently.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with JSON parameters matching [`Tool::input_schema`]
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Name the reasoning backend uses to call this tool
    ///
    /// Must be unique among the tools attached to one job.
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// JSON Schema of the parameters
    fn input_schema(&self) -> Value;
}
