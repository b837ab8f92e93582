//! Configuration for job orchestration

use crate::error::{CrewError, Result};
use crew_core::Kind;
use crew_tools::ToolsConfig;
use crew_utils::env_parse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BATCH_SEARCH_SCOPE: &str = "Limited to top financial websites";

/// Default search scope text for a kind
pub fn default_search_scope(kind: Kind) -> &'static str {
    match kind {
        Kind::Sentiment => {
            "Limited to Yahoo Finance, CNBC, MarketWatch, Seeking Alpha, and Bloomberg"
        }
        Kind::Technical => "Limited to Yahoo Finance, TradingView, Barchart, and StockCharts",
        Kind::Quantitative => "Limited to Yahoo Finance, Morningstar, Finviz, and Zacks",
        Kind::Risk => "Limited to Yahoo Finance, Morningstar, and Bloomberg",
        Kind::Chat => DEFAULT_BATCH_SEARCH_SCOPE,
    }
}

/// Configuration for job orchestration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewConfig {
    /// How long a caller waits for one job
    pub job_timeout: Duration,

    /// Gap between jobs in a sequential batch
    pub pacing_delay: Duration,

    /// Search scope per kind for single-kind runs
    pub search_scopes: HashMap<Kind, String>,

    /// Search scope used for every job of a batch
    pub batch_search_scope: String,

    /// Reasoning iterations for the four analysis kinds
    pub max_iterations: usize,

    /// Reasoning iterations for chat
    pub chat_max_iterations: usize,

    /// Serper API key; without it jobs degrade to their fallback form
    pub serper_api_key: Option<String>,

    pub scrape_max_chars: usize,
    pub search_results: usize,
    pub search_rate_per_minute: u32,

    /// How long instrument descriptors stay cached
    pub descriptor_cache_ttl: Duration,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(120),
            pacing_delay: Duration::from_secs(3),
            search_scopes: Kind::ALL
                .iter()
                .map(|&k| (k, default_search_scope(k).to_string()))
                .collect(),
            batch_search_scope: DEFAULT_BATCH_SEARCH_SCOPE.to_string(),
            max_iterations: 15,
            chat_max_iterations: 12,
            serper_api_key: None,
            scrape_max_chars: 8_000,
            search_results: 10,
            search_rate_per_minute: 60,
            descriptor_cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl CrewConfig {
    /// Create a new configuration builder
    pub fn builder() -> CrewConfigBuilder {
        CrewConfigBuilder::default()
    }

    /// Defaults overlaid with environment variables
    ///
    /// Reads `CREW_JOB_TIMEOUT_SECS`, `CREW_PACING_DELAY_SECS`,
    /// `CREW_DESCRIPTOR_TTL_SECS` and `SERPER_API_KEY`. Load any `.env` file
    /// before calling this.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.job_timeout.is_zero() {
            return Err(CrewError::Config(
                "job_timeout must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 || self.chat_max_iterations == 0 {
            return Err(CrewError::Config(
                "iteration limits must be greater than 0".to_string(),
            ));
        }
        if self.search_rate_per_minute == 0 {
            return Err(CrewError::Config(
                "search_rate_per_minute must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Search scope for a single-kind run
    pub fn search_scope(&self, kind: Kind) -> &str {
        self.search_scopes
            .get(&kind)
            .map_or_else(|| default_search_scope(kind), String::as_str)
    }

    /// Iteration limit for jobs of a kind
    pub fn iterations_for(&self, kind: Kind) -> usize {
        if kind.is_chat() {
            self.chat_max_iterations
        } else {
            self.max_iterations
        }
    }

    /// Settings for the shared search and scrape handles
    pub fn tools_config(&self) -> ToolsConfig {
        ToolsConfig {
            serper_api_key: self.serper_api_key.clone(),
            search_requests_per_minute: self.search_rate_per_minute,
            search_results: self.search_results,
            scrape_max_chars: self.scrape_max_chars,
            ..ToolsConfig::default()
        }
    }
}

/// Builder for CrewConfig
#[derive(Debug, Default)]
pub struct CrewConfigBuilder {
    job_timeout: Option<Duration>,
    pacing_delay: Option<Duration>,
    search_scopes: HashMap<Kind, String>,
    batch_search_scope: Option<String>,
    max_iterations: Option<usize>,
    chat_max_iterations: Option<usize>,
    serper_api_key: Option<String>,
    scrape_max_chars: Option<usize>,
    search_results: Option<usize>,
    search_rate_per_minute: Option<u32>,
    descriptor_cache_ttl: Option<Duration>,
}

impl CrewConfigBuilder {
    pub fn job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = Some(timeout);
        self
    }

    pub fn pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = Some(delay);
        self
    }

    /// Override the search scope of one kind
    pub fn search_scope(mut self, kind: Kind, scope: impl Into<String>) -> Self {
        self.search_scopes.insert(kind, scope.into());
        self
    }

    pub fn batch_search_scope(mut self, scope: impl Into<String>) -> Self {
        self.batch_search_scope = Some(scope.into());
        self
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn chat_max_iterations(mut self, iterations: usize) -> Self {
        self.chat_max_iterations = Some(iterations);
        self
    }

    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        self.serper_api_key = Some(key.into());
        self
    }

    pub fn scrape_max_chars(mut self, chars: usize) -> Self {
        self.scrape_max_chars = Some(chars);
        self
    }

    pub fn search_results(mut self, results: usize) -> Self {
        self.search_results = Some(results);
        self
    }

    pub fn search_rate_per_minute(mut self, rate: u32) -> Self {
        self.search_rate_per_minute = Some(rate);
        self
    }

    pub fn descriptor_cache_ttl(mut self, ttl: Duration) -> Self {
        self.descriptor_cache_ttl = Some(ttl);
        self
    }

    /// Overlay values from the environment
    ///
    /// Unset variables leave the builder unchanged; unparsable ones are an error.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(secs) = env_parse::<u64>("CREW_JOB_TIMEOUT_SECS")? {
            self.job_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = env_parse::<f64>("CREW_PACING_DELAY_SECS")? {
            let delay = Duration::try_from_secs_f64(secs).map_err(|e| {
                CrewError::Config(format!("CREW_PACING_DELAY_SECS: {e}"))
            })?;
            self.pacing_delay = Some(delay);
        }
        if let Some(secs) = env_parse::<u64>("CREW_DESCRIPTOR_TTL_SECS")? {
            self.descriptor_cache_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(key) = env_parse::<String>("SERPER_API_KEY")? {
            self.serper_api_key = Some(key);
        }
        Ok(self)
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CrewConfig> {
        let defaults = CrewConfig::default();

        let mut search_scopes = defaults.search_scopes;
        search_scopes.extend(self.search_scopes);

        let config = CrewConfig {
            job_timeout: self.job_timeout.unwrap_or(defaults.job_timeout),
            pacing_delay: self.pacing_delay.unwrap_or(defaults.pacing_delay),
            search_scopes,
            batch_search_scope: self
                .batch_search_scope
                .unwrap_or(defaults.batch_search_scope),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            chat_max_iterations: self
                .chat_max_iterations
                .unwrap_or(defaults.chat_max_iterations),
            serper_api_key: self.serper_api_key.or(defaults.serper_api_key),
            scrape_max_chars: self.scrape_max_chars.unwrap_or(defaults.scrape_max_chars),
            search_results: self.search_results.unwrap_or(defaults.search_results),
            search_rate_per_minute: self
                .search_rate_per_minute
                .unwrap_or(defaults.search_rate_per_minute),
            descriptor_cache_ttl: self
                .descriptor_cache_ttl
                .unwrap_or(defaults.descriptor_cache_ttl),
        };

        config.validate()?;
        Ok(config)
    }
}
