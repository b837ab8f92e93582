//! Web search through the Serper API

use async_trait::async_trait;
use crew_core::{Error, Result, Tool};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Settings for [`SerperSearchTool`]
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    /// Full search URL; overridable for tests
    pub endpoint: String,
    /// Organic results returned per query
    pub num_results: usize,
    /// Requests allowed per minute across all jobs
    pub requests_per_minute: u32,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: SERPER_ENDPOINT.to_string(),
            num_results: 10,
            requests_per_minute: 60,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(alias = "search_query")]
    query: String,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Searches the internet for a query and returns the top organic results
pub struct SerperSearchTool {
    client: reqwest::Client,
    config: SearchConfig,
    rate_limiter: SharedRateLimiter,
}

impl SerperSearchTool {
    pub fn new(config: SearchConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::ConstructionFailed(
                "search API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ConstructionFailed(format!("search HTTP client: {e}")))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| Error::ToolFailed(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ToolFailed(format!("search returned HTTP {status}")));
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| Error::ToolFailed(format!("invalid search response: {e}")))?;

        debug!(results = body.organic.len(), "Search completed");
        Ok(format_results(&body.organic, self.config.num_results))
    }
}

fn format_results(results: &[OrganicResult], limit: usize) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    results
        .iter()
        .take(limit)
        .map(|r| {
            format!(
                "Title: {}\nLink: {}\nSnippet: {}",
                r.title,
                r.link,
                r.snippet.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[async_trait]
impl Tool for SerperSearchTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: SearchParams = serde_json::from_value(params)
            .map_err(|e| Error::ToolFailed(format!("invalid search parameters: {e}")))?;
        if params.query.trim().is_empty() {
            return Err(Error::ToolFailed("search query is empty".to_string()));
        }

        self.search(&params.query).await.map(Value::String)
    }

    fn name(&self) -> &str {
        "search_internet"
    }

    fn description(&self) -> &str {
        "Search the internet for a query and return the top results with title, link and snippet."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                }
            },
            "required": ["query"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected() {
        let result = SerperSearchTool::new(SearchConfig::new("  "));
        assert!(matches!(result, Err(Error::ConstructionFailed(_))));
    }

    #[test]
    fn test_format_results_limits_and_joins() {
        let results = vec![
            OrganicResult {
                title: "Apple beats estimates".to_string(),
                link: "https://a.example".to_string(),
                snippet: Some("Strong quarter".to_string()),
            },
            OrganicResult {
                title: "Second".to_string(),
                link: "https://b.example".to_string(),
                snippet: None,
            },
        ];

        let text = format_results(&results, 1);
        assert_eq!(
            text,
            "Title: Apple beats estimates\nLink: https://a.example\nSnippet: Strong quarter"
        );
        assert_eq!(format_results(&[], 5), "No results found.");
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"organic":[{"title":"AAPL news","link":"https://n.example","snippet":"Up 3%"}]}"#,
            )
            .create_async()
            .await;

        let tool = SerperSearchTool::new(
            SearchConfig::new("test-key").with_endpoint(format!("{}/search", server.url())),
        )
        .unwrap();

        let out = tool.execute(json!({"query": "AAPL news"})).await.unwrap();
        mock.assert_async().await;
        assert!(out.as_str().unwrap().contains("Title: AAPL news"));
    }

    #[tokio::test]
    async fn test_http_error_is_tool_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(403)
            .create_async()
            .await;

        let tool = SerperSearchTool::new(
            SearchConfig::new("bad-key").with_endpoint(format!("{}/search", server.url())),
        )
        .unwrap();

        let err = tool.execute(json!({"query": "x"})).await.unwrap_err();
        assert!(matches!(err, Error::ToolFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_query_is_rejected() {
        let tool = SerperSearchTool::new(SearchConfig::new("k")).unwrap();
        assert!(tool.execute(json!({})).await.is_err());
        assert!(tool.execute(json!({"query": "  "})).await.is_err());
    }
}
