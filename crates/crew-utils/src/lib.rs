//! Shared utilities for stock-crew
//!
//! This crate provides common functionality used across the stock-crew workspace,
//! including logging setup and environment-driven configuration.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, env_or, env_parse};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
