//! Error types for job orchestration

use crew_core::Kind;
use thiserror::Error;

/// Orchestration errors
///
/// Only [`CrewError::Validation`] and [`CrewError::Config`] leave the public
/// service API. Everything else is absorbed into placeholder text by the
/// executor or the batch orchestrator.
#[derive(Debug, Error)]
pub enum CrewError {
    /// Request is missing a required field
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A job could not be built
    #[error("Construction failed for {kind}: {reason}")]
    Construction { kind: Kind, reason: String },

    /// The reasoning backend did not finish in time
    #[error("{kind} for {ticker} timed out after {secs}s")]
    ExecutionTimeout {
        kind: Kind,
        ticker: String,
        secs: u64,
    },

    /// The reasoning backend failed
    #[error("{0}")]
    ExecutionFailed(String),

    /// Descriptor lookup failed
    #[error("Descriptor error: {0}")]
    Descriptor(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] crew_core::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for orchestration
pub type Result<T> = std::result::Result<T, CrewError>;

impl From<crew_utils::ConfigError> for CrewError {
    fn from(err: crew_utils::ConfigError) -> Self {
        CrewError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for CrewError {
    fn from(err: reqwest::Error) -> Self {
        CrewError::Descriptor(err.to_string())
    }
}

impl From<anyhow::Error> for CrewError {
    fn from(err: anyhow::Error) -> Self {
        CrewError::Other(err.to_string())
    }
}
