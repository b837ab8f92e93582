//! Error types for crew-core

use thiserror::Error;

/// Result type alias for crew-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by jobs, tools and backends
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// A job could not be assembled from its spec
    #[error("Job construction failed: {0}")]
    ConstructionFailed(String),

    /// A task template could not be rendered with the given inputs
    #[error("Task rendering failed: {0}")]
    RenderFailed(String),

    /// The reasoning backend failed while running a job
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// A capability handle (search, scrape) failed
    #[error("Tool error: {0}")]
    ToolFailed(String),

    /// Instrument descriptor could not be looked up
    #[error("Descriptor unavailable for {ticker}: {reason}")]
    DescriptorUnavailable {
        ticker: String,
        reason: String,
    },
}
