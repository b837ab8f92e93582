//! Chat context assembly from earlier analyses

use crate::engine::{BatchResult, ExecutionStatus};
use crew_core::{Descriptor, Kind};
use serde::{Deserialize, Serialize};

/// Text of the context when no analysis has been preloaded
pub const NO_PRELOADED_ANALYSIS: &str = "No preloaded analysis available.";

/// Analyses a caller already has for a ticker
///
/// Blank entries count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadedAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantitative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
}

impl PreloadedAnalysis {
    /// Preloaded text for a kind, if present and non-blank
    pub fn get(&self, kind: Kind) -> Option<&str> {
        let slot = match kind {
            Kind::Sentiment => &self.sentiment,
            Kind::Technical => &self.technical,
            Kind::Quantitative => &self.quantitative,
            Kind::Risk => &self.risk,
            Kind::Chat => return None,
        };
        slot.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Set the text for a kind; chat is ignored
    pub fn set(&mut self, kind: Kind, text: impl Into<String>) {
        let slot = match kind {
            Kind::Sentiment => &mut self.sentiment,
            Kind::Technical => &mut self.technical,
            Kind::Quantitative => &mut self.quantitative,
            Kind::Risk => &mut self.risk,
            Kind::Chat => return,
        };
        *slot = Some(text.into());
    }

    pub fn with(mut self, kind: Kind, text: impl Into<String>) -> Self {
        self.set(kind, text);
        self
    }

    pub fn is_empty(&self) -> bool {
        Kind::ANALYSES.iter().all(|&k| self.get(k).is_none())
    }
}

impl From<&BatchResult> for PreloadedAnalysis {
    /// Successful results only; placeholders are not useful context
    fn from(batch: &BatchResult) -> Self {
        batch
            .results
            .values()
            .filter(|r| r.status == ExecutionStatus::Ok)
            .fold(Self::default(), |acc, r| acc.with(r.kind, r.text.clone()))
    }
}

/// Build the chat context
///
/// Sections appear in the order sentiment, technical, quantitative, risk,
/// each as `HEADER:\n{text}`, separated by blank lines. The descriptor
/// sentence leads when available. With no sections the result is exactly
/// [`NO_PRELOADED_ANALYSIS`], descriptor or not.
pub fn assemble(
    preloaded: &PreloadedAnalysis,
    descriptor: Option<&Descriptor>,
    ticker: &str,
) -> String {
    let sections: Vec<String> = Kind::ANALYSES
        .iter()
        .filter_map(|&kind| {
            let text = preloaded.get(kind)?;
            let header = kind.section_header()?;
            Some(format!("{header}:\n{}", text.trim()))
        })
        .collect();

    if sections.is_empty() {
        return NO_PRELOADED_ANALYSIS.to_string();
    }

    descriptor
        .map(|d| d.sentence(ticker))
        .into_iter()
        .chain(sections)
        .collect::<Vec<_>>()
        .join("\n\n")
}
