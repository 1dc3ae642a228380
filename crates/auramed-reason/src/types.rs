//! Reasoning types.

use auramed_core::triage::clamp_confidence;
use auramed_core::Disposition;
use serde::{Deserialize, Serialize};

/// Disposition, confidence and rationale proposed by a reasoning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionalDecision {
    pub disposition: Disposition,
    pub confidence: f64,
    pub rationale: String,
    /// Engine-proposed action. Never reaches the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ProvisionalDecision {
    pub fn new(disposition: Disposition, confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            disposition,
            confidence: clamp_confidence(confidence),
            rationale: rationale.into(),
            action: None,
        }
    }
}

/// What an engine produced: a typed result or free text for the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Structured(ProvisionalDecision),
    Text(String),
}

/// Which parser strategy produced a disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Explicit `STATUS: <token>` field.
    ExactFormat,
    /// Domain keyword scan.
    Keyword,
    /// Nothing matched.
    Default,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStrategy::ExactFormat => write!(f, "exact_format"),
            MatchStrategy::Keyword => write!(f, "keyword"),
            MatchStrategy::Default => write!(f, "default"),
        }
    }
}

/// Result of parsing an unstructured engine response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub decision: ProvisionalDecision,
    pub strategy: MatchStrategy,
}

/// A chat message sent to a remote engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}
