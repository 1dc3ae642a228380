//! Reasoning engine boundary.
//!
//! Engines either return a typed decision or free text. `Reasoner` owns the
//! parser and turns either form into a `ProvisionalDecision`.

use std::sync::Arc;

use auramed_audio::Embedding;
use auramed_core::{PatientVitals, Result};
use tracing::{debug, warn};

use crate::parser::{ParserKeywords, ResponseParser};
use crate::types::{EngineOutput, ProvisionalDecision};

/// Produces a provisional assessment from an embedding and vitals.
pub trait ReasoningEngine: Send + Sync {
    /// Fails with `Error::LowQuality` when the engine rejects the input as
    /// unusable; any other error is treated as an engine failure.
    fn generate(&self, embedding: &Embedding, vitals: &PatientVitals) -> Result<EngineOutput>;

    /// Short identifier for logs and status output.
    fn name(&self) -> &str;
}

/// Engine plus response parser.
pub struct Reasoner {
    engine: Arc<dyn ReasoningEngine>,
    parser: ResponseParser,
}

impl Reasoner {
    pub fn new(engine: Arc<dyn ReasoningEngine>, keywords: &ParserKeywords) -> Result<Self> {
        Ok(Self {
            engine,
            parser: ResponseParser::new(keywords)?,
        })
    }

    pub fn with_default_keywords(engine: Arc<dyn ReasoningEngine>) -> Result<Self> {
        Self::new(engine, &ParserKeywords::default())
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Run the engine and normalize its output.
    ///
    /// Engine-proposed actions are dropped; the action always comes from the
    /// protocol table.
    pub fn reason(&self, embedding: &Embedding, vitals: &PatientVitals) -> Result<ProvisionalDecision> {
        let mut decision = match self.engine.generate(embedding, vitals)? {
            EngineOutput::Structured(decision) => decision,
            EngineOutput::Text(text) => {
                let parsed = self.parser.parse(&text);
                debug!("{} text parsed via {}", self.engine.name(), parsed.strategy);
                parsed.decision
            }
        };

        if let Some(action) = decision.action.take() {
            warn!(
                "Discarding engine-proposed action from {}: {}",
                self.engine.name(),
                action
            );
        }
        Ok(decision)
    }
}
