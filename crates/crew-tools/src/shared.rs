//! Process-wide capability handles
//!
//! Search and scrape handles are expensive enough (HTTP client, rate limiter)
//! that every job should share one instance of each. [`SharedTools`] builds
//! each handle on first request and returns the same `Arc` afterwards.

use crate::{ScrapeWebsiteTool, SearchConfig, SerperSearchTool};
use crew_core::{Error, Result, Tool};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Settings for the shared handles
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Serper API key; search construction fails without it
    pub serper_api_key: Option<String>,
    /// Overrides the Serper endpoint
    pub search_endpoint: Option<String>,
    pub search_requests_per_minute: u32,
    /// Organic results returned per search
    pub search_results: usize,
    pub scrape_max_chars: usize,
    pub http_timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            serper_api_key: None,
            search_endpoint: None,
            search_requests_per_minute: 60,
            search_results: 10,
            scrape_max_chars: 8_000,
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Lazily built, shared capability handles
pub struct SharedTools {
    config: ToolsConfig,
    search: Mutex<Option<Arc<dyn Tool>>>,
    scrape: Mutex<Option<Arc<dyn Tool>>>,
}

impl SharedTools {
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            config,
            search: Mutex::new(None),
            scrape: Mutex::new(None),
        }
    }

    /// The web search handle
    ///
    /// A failed construction is not cached, so a later call may succeed.
    pub fn search(&self) -> Result<Arc<dyn Tool>> {
        let mut slot = self.search.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tool) = slot.as_ref() {
            return Ok(Arc::clone(tool));
        }

        let api_key = self
            .config
            .serper_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::ConstructionFailed("SERPER_API_KEY is not set".to_string()))?;

        let mut search_config = SearchConfig::new(api_key);
        search_config.requests_per_minute = self.config.search_requests_per_minute;
        search_config.num_results = self.config.search_results.max(1);
        search_config.timeout = self.config.http_timeout;
        if let Some(endpoint) = &self.config.search_endpoint {
            search_config.endpoint.clone_from(endpoint);
        }

        let tool: Arc<dyn Tool> = Arc::new(SerperSearchTool::new(search_config)?);
        info!(tool = tool.name(), "Built shared search handle");
        *slot = Some(Arc::clone(&tool));
        Ok(tool)
    }

    /// The website scrape handle
    pub fn scrape(&self) -> Result<Arc<dyn Tool>> {
        let mut slot = self.scrape.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tool) = slot.as_ref() {
            return Ok(Arc::clone(tool));
        }

        let tool: Arc<dyn Tool> = Arc::new(
            ScrapeWebsiteTool::new(self.config.http_timeout)?
                .with_max_chars(self.config.scrape_max_chars),
        );
        info!(tool = tool.name(), "Built shared scrape handle");
        *slot = Some(Arc::clone(&tool));
        Ok(tool)
    }

    /// Both handles, in the order jobs receive them
    pub fn analysis_tools(&self) -> Result<Vec<Arc<dyn Tool>>> {
        Ok(vec![self.search()?, self.scrape()?])
    }
}
