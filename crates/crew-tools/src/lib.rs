//! Capability handles for stock-crew
//!
//! Every analysis job gets the same two capabilities: a web search backed by
//! the Serper API and a website scraper. [`SharedTools`] builds each handle
//! at most once per process and hands out shared references.

pub mod scrape;
pub mod search;
pub mod shared;

pub use scrape::ScrapeWebsiteTool;
pub use search::{SearchConfig, SerperSearchTool};
pub use shared::{SharedTools, ToolsConfig};
