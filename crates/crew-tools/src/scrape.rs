//! Website text extraction

use async_trait::async_trait;
use crew_core::{Error, Result, Tool};
use scraper::Html;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const DEFAULT_MAX_CHARS: usize = 8_000;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-crew/0.1)";

/// Elements whose text never reaches the reader
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "svg"];

#[derive(Debug, Deserialize)]
struct ScrapeParams {
    #[serde(alias = "url")]
    website_url: String,
}

/// Fetches a web page and returns its visible text
pub struct ScrapeWebsiteTool {
    client: reqwest::Client,
    max_chars: usize,
}

impl ScrapeWebsiteTool {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ConstructionFailed(format!("scrape HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_chars: DEFAULT_MAX_CHARS,
        })
    }

    /// Cap on characters returned per page
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn scrape(&self, url: Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::ToolFailed(format!("fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ToolFailed(format!("{url} returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ToolFailed(format!("reading {url}: {e}")))?;

        let text = truncate_chars(&visible_text(&body), self.max_chars);
        debug!(chars = text.chars().count(), "Scraped page");
        Ok(text)
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::ToolFailed(format!("invalid url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::ToolFailed(format!("unsupported url scheme '{other}'"))),
    }
}

/// Text of the document outside scripts, styles and the head, whitespace collapsed
fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| e.name() == "head" || SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl Tool for ScrapeWebsiteTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: ScrapeParams = serde_json::from_value(params)
            .map_err(|e| Error::ToolFailed(format!("invalid scrape parameters: {e}")))?;
        let url = parse_url(&params.website_url)?;

        self.scrape(url).await.map(Value::String)
    }

    fn name(&self) -> &str {
        "scrape_website"
    }

    fn description(&self) -> &str {
        "Read the visible text content of a web page."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "website_url": {
                    "type": "string",
                    "description": "Full http(s) URL of the page to read"
                }
            },
            "required": ["website_url"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_scripts_and_head() {
        let html = r"<html><head><title>T</title><style>p{}</style></head>
            <body><h1>Apple   Inc.</h1><script>var x = 1;</script>
            <p>Shares rose <b>3%</b> today.</p></body></html>";

        assert_eq!(visible_text(html), "Apple Inc. Shares rose 3% today.");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://finance.yahoo.com/quote/AAPL").is_ok());
        assert!(parse_url("file:///etc/passwd").is_err());
        assert!(parse_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_scrape_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/quote")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><p>AAPL 189.50</p></body></html>")
            .create_async()
            .await;

        let tool = ScrapeWebsiteTool::new(Duration::from_secs(5)).unwrap();
        let out = tool
            .execute(json!({"website_url": format!("{}/quote", server.url())}))
            .await
            .unwrap();
        assert_eq!(out, json!("AAPL 189.50"));
    }
}
