//! Deterministic vitals-only engine.
//!
//! Used when no remote model is configured. Ignores the embedding.

use auramed_audio::Embedding;
use auramed_core::{Disposition, PatientVitals, Result};

use crate::engine::ReasoningEngine;
use crate::types::{EngineOutput, ProvisionalDecision};

pub struct RuleBasedEngine;

impl RuleBasedEngine {
    pub fn assess(vitals: &PatientVitals) -> ProvisionalDecision {
        if !vitals.signs().is_empty() {
            return ProvisionalDecision::new(
                Disposition::Emergency,
                1.0,
                "Danger signs present. Requires emergency referral.",
            );
        }

        if vitals.has_fast_breathing() {
            return ProvisionalDecision::new(
                Disposition::Pathological,
                0.85,
                format!(
                    "Fast breathing detected for age ({} >= {} breaths/min). Consistent with pneumonia.",
                    vitals.respiratory_rate(),
                    vitals.fast_breathing_threshold()
                ),
            );
        }

        ProvisionalDecision::new(
            Disposition::Normal,
            0.9,
            "No fast breathing or danger signs detected.",
        )
    }
}

impl ReasoningEngine for RuleBasedEngine {
    fn generate(&self, _embedding: &Embedding, vitals: &PatientVitals) -> Result<EngineOutput> {
        Ok(EngineOutput::Structured(Self::assess(vitals)))
    }

    fn name(&self) -> &str {
        "rules"
    }
}
