//! Orchestrator: sequences safety, encoding, reasoning, protocol and audit.
//!
//! Precedence is fixed: danger signs first, then input checks, then the
//! analytic path. Quality failures and danger signs always resolve to a
//! decision; only `InvalidInput`, `NotFound`, `EdgeConstraintViolation` and
//! `PipelineFailure` reach the caller.

use std::sync::Arc;

use auramed_audio::AudioEncoder;
use auramed_core::{
    Disposition, EdgeConfig, Error, MemoryProbe, PatientVitals, Result, TriageDecision,
};
use auramed_protocol::{ProtocolEngine, SafetyGuard};
use auramed_reason::Reasoner;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::audit::ResourceAuditor;
use crate::types::*;

/// Per-call stage cursor; every move is logged.
struct StageTracker {
    current: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: PipelineStage::Start,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!("Stage {} -> {}", self.current, next);
        self.current = next;
    }
}

/// Top-level triage entry point.
pub struct Orchestrator {
    config: EdgeConfig,
    encoder: Arc<dyn AudioEncoder>,
    reasoner: Reasoner,
    auditor: ResourceAuditor,
}

impl Orchestrator {
    pub fn new(config: EdgeConfig, encoder: Arc<dyn AudioEncoder>, reasoner: Reasoner) -> Self {
        let auditor = ResourceAuditor::new(&config);
        info!(
            "Orchestrator initialized: encoder={}, engine={}, ram_ceiling={}GB, latency_budget={}s",
            encoder.name(),
            reasoner.engine_name(),
            config.max_ram_gb,
            config.max_latency_sec
        );
        Self {
            config,
            encoder,
            reasoner,
            auditor,
        }
    }

    /// Replace the memory source used by the auditor.
    pub fn with_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.auditor = ResourceAuditor::with_probe(&self.config, probe);
        self
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Triage a recording against validated vitals.
    pub fn predict(&self, audio_ref: &str, vitals: &PatientVitals) -> Result<TriageDecision> {
        self.audited(|stages| {
            stages.advance(PipelineStage::Validating);
            self.run_pipeline(stages, audio_ref, vitals)
        })
    }

    /// Triage with an untyped vitals record, validated first.
    pub fn predict_json(
        &self,
        audio_ref: &str,
        vitals: &serde_json::Value,
    ) -> Result<TriageDecision> {
        self.audited(|stages| {
            stages.advance(PipelineStage::Validating);
            let vitals = PatientVitals::from_json(vitals)?;
            self.run_pipeline(stages, audio_ref, &vitals)
        })
    }

    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            encoder: self.encoder.name().to_string(),
            engine: self.reasoner.engine_name().to_string(),
            max_ram_gb: self.config.max_ram_gb,
            max_latency_sec: self.config.max_latency_sec,
            sample_rate: self.config.sample_rate,
            resident_ram_gb: self.auditor.current_ram_gb(),
        }
    }

    fn audited<F>(&self, f: F) -> Result<TriageDecision>
    where
        F: FnOnce(&mut StageTracker) -> Result<TriageDecision>,
    {
        let request_id = Uuid::new_v4();
        let span = info_span!("triage", request_id = %request_id);
        let _enter = span.enter();

        let mut stages = StageTracker::new();
        let guard = self.auditor.begin();
        let outcome = f(&mut stages);
        let result = guard.finalize(outcome);

        match &result {
            Ok(decision) => {
                stages.advance(PipelineStage::Audited);
                stages.advance(PipelineStage::Done);
                info!(
                    "Triage result: {} (confidence {:.2})",
                    decision.disposition, decision.confidence
                );
            }
            Err(e) => {
                let failed_at = stages.current;
                stages.advance(PipelineStage::Failed(e.kind()));
                warn!("Triage failed after {}: {}", failed_at, e);
            }
        }
        result
    }

    fn run_pipeline(
        &self,
        stages: &mut StageTracker,
        audio_ref: &str,
        vitals: &PatientVitals,
    ) -> Result<TriageDecision> {
        match SafetyGuard::check(vitals) {
            Ok(()) => stages.advance(PipelineStage::SafetyChecked),
            Err(Error::DangerSignDetected(message)) => {
                stages.advance(PipelineStage::ShortCircuitEmergency);
                return Ok(self.finish(
                    stages,
                    TriageDecision::new(Disposition::Emergency, 1.0, message),
                    vitals,
                ));
            }
            Err(e) => return Err(e),
        }

        if audio_ref.trim().is_empty() {
            return Err(Error::InvalidInput("audio reference is empty".into()));
        }
        if !self.encoder.resolve(audio_ref) {
            return Err(Error::NotFound(format!("Audio file not found: {}", audio_ref)));
        }
        stages.advance(PipelineStage::InputChecked);

        stages.advance(PipelineStage::Encoding);
        let embedding = match self.encoder.encode(audio_ref) {
            Ok(embedding) => embedding,
            Err(e) if e.is_low_quality() => return Ok(self.low_quality(stages, e, vitals)),
            Err(Error::NotFound(m)) => return Err(Error::NotFound(m)),
            Err(e) => {
                error!("Encoder {} failed on {}: {}", self.encoder.name(), audio_ref, e);
                return Err(Error::pipeline(PipelineStage::Encoding.to_string(), e));
            }
        };

        stages.advance(PipelineStage::Reasoning);
        let provisional = match self.reasoner.reason(&embedding, vitals) {
            Ok(provisional) => provisional,
            Err(e) if e.is_low_quality() => return Ok(self.low_quality(stages, e, vitals)),
            Err(e) => {
                error!(
                    "Reasoning engine {} failed (age={}m, rate={}): {}",
                    self.reasoner.engine_name(),
                    vitals.age_months(),
                    vitals.respiratory_rate(),
                    e
                );
                return Err(Error::pipeline(PipelineStage::Reasoning.to_string(), e));
            }
        };

        let decision = TriageDecision::new(
            provisional.disposition,
            provisional.confidence,
            provisional.rationale,
        );
        Ok(self.finish(stages, decision, vitals))
    }

    fn low_quality(
        &self,
        stages: &mut StageTracker,
        err: Error,
        vitals: &PatientVitals,
    ) -> TriageDecision {
        let detail = match err {
            Error::LowQuality(detail) => detail,
            other => other.to_string(),
        };
        warn!("Audio quality check failed: {}", detail);
        let rationale = format!(
            "Audio quality check failed: {}. Please re-record in a quieter environment.",
            detail
        );
        self.finish(
            stages,
            TriageDecision::new(Disposition::Inconclusive, 0.0, rationale),
            vitals,
        )
    }

    fn finish(
        &self,
        stages: &mut StageTracker,
        mut decision: TriageDecision,
        vitals: &PatientVitals,
    ) -> TriageDecision {
        ProtocolEngine::apply(&mut decision, vitals.age_months());
        stages.advance(PipelineStage::ProtocolApplied);
        decision
    }
}
