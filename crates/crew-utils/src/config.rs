//! Configuration management utilities

use crate::LogFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error reading configuration from the environment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "stock-crew".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load from the process environment, reading a `.env` file first if present
    ///
    /// Reads `CREW_ENV` and `CREW_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Ok(Self {
            app_name: defaults.app_name,
            environment: env_or("CREW_ENV", &defaults.environment),
            log_format: env_parse("CREW_LOG_FORMAT")?.unwrap_or(defaults.log_format),
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}

/// Read a variable, falling back to `default` when unset or empty
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Read and parse a variable
///
/// Returns `Ok(None)` when the variable is unset or empty.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::Invalid {
                    key: key.to_string(),
                    value: v.clone(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "stock-crew");
        assert!(!config.is_production());
    }

    #[test]
    fn test_env_parse_missing_is_none() {
        let value: Option<u64> = env_parse("CREW_UTILS_TEST_SURELY_UNSET").unwrap();
        assert_eq!(value, None);
        assert_eq!(env_or("CREW_UTILS_TEST_SURELY_UNSET", "x"), "x");
    }
}
