//! The closed set of analysis kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis category a job belongs to
///
/// The set is closed: every kind has exactly one template, one label set and
/// one slot in the job registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// News and opinion sentiment
    Sentiment,
    /// Chart patterns and indicators
    Technical,
    /// Statistical and risk metrics
    Quantitative,
    /// Multi-category risk assessment
    Risk,
    /// Ad-hoc question answering over preloaded analyses
    Chat,
}

impl Kind {
    /// Number of kinds
    pub const COUNT: usize = 5;

    /// Every kind, in registry order
    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Sentiment,
        Kind::Technical,
        Kind::Quantitative,
        Kind::Risk,
        Kind::Chat,
    ];

    /// The analysis kinds a full batch runs, in execution order
    pub const ANALYSES: [Kind; 4] = [
        Kind::Sentiment,
        Kind::Technical,
        Kind::Quantitative,
        Kind::Risk,
    ];

    /// Stable index into per-kind tables
    pub const fn index(self) -> usize {
        match self {
            Kind::Sentiment => 0,
            Kind::Technical => 1,
            Kind::Quantitative => 2,
            Kind::Risk => 3,
            Kind::Chat => 4,
        }
    }

    /// Lowercase identifier used on the wire and on the command line
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Sentiment => "sentiment",
            Kind::Technical => "technical",
            Kind::Quantitative => "quantitative",
            Kind::Risk => "risk",
            Kind::Chat => "chat",
        }
    }

    /// User-facing label, used at the start of status messages
    pub const fn label(self) -> &'static str {
        match self {
            Kind::Sentiment => "Sentiment analysis",
            Kind::Technical => "Technical analysis",
            Kind::Quantitative => "Quantitative analysis",
            Kind::Risk => "Risk assessment",
            Kind::Chat => "Analysis",
        }
    }

    /// Lowercase label handed to the fallback factory
    pub const fn fallback_label(self) -> &'static str {
        match self {
            Kind::Sentiment => "sentiment analysis",
            Kind::Technical => "technical analysis",
            Kind::Quantitative => "quantitative analysis",
            Kind::Risk => "risk assessment",
            Kind::Chat => "chat analysis",
        }
    }

    /// Upper-case header introducing this kind's section in a chat context
    ///
    /// `None` for [`Kind::Chat`], which never contributes a section.
    pub const fn section_header(self) -> Option<&'static str> {
        match self {
            Kind::Sentiment => Some("SENTIMENT ANALYSIS"),
            Kind::Technical => Some("TECHNICAL ANALYSIS"),
            Kind::Quantitative => Some("QUANTITATIVE ANALYSIS"),
            Kind::Risk => Some("RISK ASSESSMENT"),
            Kind::Chat => None,
        }
    }

    /// Whether this is the question-answering kind
    pub const fn is_chat(self) -> bool {
        matches!(self, Kind::Chat)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown analysis kind '{0}' (expected one of: sentiment, technical, quantitative, risk, chat)")]
pub struct ParseKindError(pub String);

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiment" => Ok(Kind::Sentiment),
            "technical" => Ok(Kind::Technical),
            "quantitative" | "quant" => Ok(Kind::Quantitative),
            "risk" => Ok(Kind::Risk),
            "chat" => Ok(Kind::Chat),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}
