//! Job execution
//!
//! - [`Executor`]: one job, bounded by a time budget
//! - [`BatchOrchestrator`]: several kinds for one ticker
//! - [`assemble`]: chat context from earlier analyses
//! - [`normalize`]: backend output to display text

pub mod batch;
pub mod context;
pub mod executor;
pub mod normalize;

pub use batch::{BatchMode, BatchOrchestrator, BatchResult, basic_summary};
pub use context::{NO_PRELOADED_ANALYSIS, PreloadedAnalysis, assemble};
pub use executor::{ExecutionRequest, ExecutionResult, ExecutionStatus, Executor, current_year};
pub use normalize::normalize;
