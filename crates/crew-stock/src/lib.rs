//! Stock analysis job orchestration
//!
//! This crate turns analysis requests for a ticker into jobs for a reasoning
//! backend and brings the results back as text. It includes:
//!
//! - Per-kind job templates, a builder that degrades to fallback jobs, and a
//!   registry that builds each kind at most once per process
//! - A time-bounded executor that always yields displayable text
//! - Concurrent and paced sequential batches over several kinds
//! - Chat context assembly from earlier analyses
//! - A Yahoo Finance descriptor provider with a TTL cache
//!
//! # Example
//!
//! ```rust,ignore
//! use crew_llm::{BackendConfig, LlmBackend};
//! use crew_llm::providers::OpenAIProvider;
//! use crew_stock::{BatchMode, CrewConfig, StockCrew, YahooDescriptorProvider};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = Arc::new(OpenAIProvider::from_env()?);
//!     let backend = Arc::new(LlmBackend::new(provider, BackendConfig::default()));
//!     let descriptors = Arc::new(YahooDescriptorProvider::new(Duration::from_secs(15))?);
//!
//!     let crew = StockCrew::new(CrewConfig::from_env()?, backend, descriptors);
//!     let batch = crew.full_analysis("AAPL", BatchMode::Concurrent).await?;
//!     println!("{}", batch.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod service;

#[cfg(test)]
mod testing;

pub use api::YahooDescriptorProvider;
pub use cache::CachedDescriptorProvider;
pub use config::{CrewConfig, CrewConfigBuilder};
pub use engine::{
    BatchMode, BatchOrchestrator, BatchResult, ExecutionRequest, ExecutionResult,
    ExecutionStatus, Executor, PreloadedAnalysis, assemble, normalize,
};
pub use error::{CrewError, Result};
pub use jobs::{FallbackFactory, JobBuilder, JobFactory, JobRegistry};
pub use service::{StockCrew, normalize_ticker};

pub use crew_core::Kind;
