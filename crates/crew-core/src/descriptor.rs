//! Instrument descriptors
//!
//! A descriptor is the short identity of a listed company (name, sector,
//! industry). It is prepended to chat context so the answering job knows what
//! the ticker refers to.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic identity of a listed instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Company name
    pub name: String,
    pub sector: String,
    pub industry: String,
    /// Market capitalisation in USD, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

impl Descriptor {
    pub fn new(
        name: impl Into<String>,
        sector: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sector: sector.into(),
            industry: industry.into(),
            market_cap: None,
        }
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    /// One-sentence description used as the first line of a chat context
    pub fn sentence(&self, ticker: &str) -> String {
        format!(
            "{} ({}) is in the {} sector and {} industry.",
            self.name, ticker, self.sector, self.industry
        )
    }

    /// Market cap in billions, e.g. `$2891.24B`, or `N/A`
    pub fn market_cap_display(&self) -> String {
        match self.market_cap {
            Some(cap) => format!("${:.2}B", cap / 1_000_000_000.0),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} / {} | Market cap: {}",
            self.name,
            self.sector,
            self.industry,
            self.market_cap_display()
        )
    }
}

/// Source of instrument descriptors
#[async_trait]
pub trait DescriptorProvider: Send + Sync {
    /// Look up the descriptor for a ticker
    async fn lookup(&self, ticker: &str) -> Result<Descriptor>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
