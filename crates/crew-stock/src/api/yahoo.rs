//! Yahoo Finance descriptor lookups

use async_trait::async_trait;
use crew_core::{Descriptor, DescriptorProvider, Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-crew/0.1)";
const UNKNOWN: &str = "Unknown";

/// Reads name, sector, industry and market cap from the quote-summary endpoint
pub struct YahooDescriptorProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<SummaryError>,
}

#[derive(Debug, Deserialize)]
struct SummaryError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    short_name: Option<String>,
    long_name: Option<String>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

impl YahooDescriptorProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ConstructionFailed(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at another host, e.g. a test server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn unavailable(ticker: &str, reason: impl Into<String>) -> Error {
        Error::DescriptorUnavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn into_descriptor(ticker: &str, result: SummaryResult) -> Descriptor {
    let price = result.price.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    let name = non_blank(price.short_name)
        .or_else(|| non_blank(price.long_name))
        .unwrap_or_else(|| ticker.to_string());
    let sector = non_blank(profile.sector).unwrap_or_else(|| UNKNOWN.to_string());
    let industry = non_blank(profile.industry).unwrap_or_else(|| UNKNOWN.to_string());

    let descriptor = Descriptor::new(name, sector, industry);
    match price.market_cap.and_then(|m| m.raw) {
        Some(cap) if cap > 0.0 => descriptor.with_market_cap(cap),
        _ => descriptor,
    }
}

#[async_trait]
impl DescriptorProvider for YahooDescriptorProvider {
    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn lookup(&self, ticker: &str) -> Result<Descriptor> {
        let url = format!("{}/v10/finance/quoteSummary/{ticker}", self.base_url);
        debug!(%url, "Fetching descriptor");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", "price,assetProfile")])
            .send()
            .await
            .map_err(|e| Self::unavailable(ticker, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::unavailable(ticker, format!("HTTP {status}")));
        }

        let body: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(ticker, format!("invalid response: {e}")))?;

        if let Some(err) = body.quote_summary.error {
            let reason = err.description.unwrap_or_else(|| "unknown error".to_string());
            return Err(Self::unavailable(ticker, reason));
        }

        let result = body
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| Self::unavailable(ticker, "no result"))?;

        Ok(into_descriptor(ticker, result))
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
