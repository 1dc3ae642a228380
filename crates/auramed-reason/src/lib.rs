//! AuraMed Reason: provisional assessment from embedding and vitals.
//!
//! Engines either produce a typed decision (`RuleBasedEngine`) or free text
//! (`HttpEngine`) that the multi-strategy `ResponseParser` normalizes.

pub mod config;
pub mod engine;
pub mod http;
pub mod parser;
pub mod prompt;
pub mod rules;
pub mod types;

pub use config::ReasoningConfig;
pub use engine::{Reasoner, ReasoningEngine};
pub use http::HttpEngine;
pub use parser::{ParserKeywords, ResponseParser};
pub use rules::RuleBasedEngine;
pub use types::*;

use std::sync::Arc;

use auramed_core::Result;

/// Create the configured reasoner.
///
/// Uses the remote engine when an endpoint is configured, otherwise the
/// rule-based engine.
pub fn create_reasoner(config: &ReasoningConfig) -> Result<Reasoner> {
    config.validate()?;

    let engine: Arc<dyn ReasoningEngine> = match config.remote_endpoint() {
        Some(endpoint) => {
            tracing::info!("Using remote reasoning engine at {}", endpoint);
            Arc::new(HttpEngine::new(config)?)
        }
        None => {
            tracing::info!("No reasoning endpoint configured. Using rule-based engine.");
            Arc::new(RuleBasedEngine)
        }
    };

    Reasoner::new(engine, &config.keywords)
}
