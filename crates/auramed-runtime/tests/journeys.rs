//! End-to-end triage journeys through the orchestrator.
//!
//! Collaborators are replaced by recording mocks so the precedence rules
//! (danger signs, input checks, quality, memory ceiling) can be observed
//! directly: which collaborator ran, and what the caller got back.

use std::sync::Arc;

use auramed_audio::wav::{sine_wave, write_wav};
use auramed_audio::{AudioEncoder, Embedding, FrameEnergyBackend, HearEncoder};
use auramed_core::triage::{STAT_FLOPS_G, STAT_LATENCY_SEC, STAT_MAX_ALLOWED_SEC, STAT_RAM_GB};
use auramed_core::{
    DangerSign, DangerSigns, Disposition, EdgeConfig, Error, FixedMemory, PatientVitals, Result,
};
use auramed_reason::{
    EngineOutput, ProvisionalDecision, Reasoner, ReasoningEngine, RuleBasedEngine,
};
use auramed_runtime::Orchestrator;
use ndarray::Array1;
use parking_lot::Mutex;

const EMERGENCY_ACTION: &str = "Emergency Danger Signs Detected. Immediate referral.";

#[derive(Clone)]
enum EncoderBehavior {
    Embed,
    LowQuality,
    Crash,
}

struct MockEncoder {
    behavior: EncoderBehavior,
    calls: Mutex<Vec<String>>,
}

impl MockEncoder {
    fn new(behavior: EncoderBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl AudioEncoder for MockEncoder {
    fn encode(&self, reference: &str) -> Result<Embedding> {
        self.calls.lock().push(reference.to_string());
        match self.behavior {
            EncoderBehavior::Embed => Ok(Embedding::new(Array1::from_elem(512, 0.1), 5)),
            EncoderBehavior::LowQuality => Err(Error::LowQuality(
                "Audio recording is too noisy or distorted".into(),
            )),
            EncoderBehavior::Crash => Err(Error::Audio("decoder crashed".into())),
        }
    }

    fn resolve(&self, reference: &str) -> bool {
        !reference.contains("missing")
    }

    fn name(&self) -> &str {
        "mock-encoder"
    }
}

enum EngineBehavior {
    Rules,
    Text(&'static str),
    ProposeAction,
    LowQuality,
    Fail,
}

struct MockEngine {
    behavior: EngineBehavior,
    calls: Mutex<usize>,
}

impl MockEngine {
    fn new(behavior: EngineBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(0),
        })
    }

    fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl ReasoningEngine for MockEngine {
    fn generate(&self, embedding: &Embedding, vitals: &PatientVitals) -> Result<EngineOutput> {
        *self.calls.lock() += 1;
        match &self.behavior {
            EngineBehavior::Rules => RuleBasedEngine.generate(embedding, vitals),
            EngineBehavior::Text(text) => Ok(EngineOutput::Text(text.to_string())),
            EngineBehavior::ProposeAction => {
                let mut decision =
                    ProvisionalDecision::new(Disposition::Normal, 0.9, "Lungs are clear.");
                decision.action = Some("Prescribe antibiotics".into());
                Ok(EngineOutput::Structured(decision))
            }
            EngineBehavior::LowQuality => {
                Err(Error::LowQuality("embedding carries no signal".into()))
            }
            EngineBehavior::Fail => Err(Error::Inference("model server unreachable".into())),
        }
    }

    fn name(&self) -> &str {
        "mock-engine"
    }
}

fn build(encoder: Arc<dyn AudioEncoder>, engine: Arc<MockEngine>, ram_gb: f64) -> Orchestrator {
    let reasoner = Reasoner::with_default_keywords(engine).unwrap();
    Orchestrator::new(EdgeConfig::default(), encoder, reasoner)
        .with_memory_probe(Arc::new(FixedMemory::from_gb(ram_gb)))
}

fn vitals(age: i64, rate: i64) -> PatientVitals {
    PatientVitals::new(age, rate, DangerSigns::none()).unwrap()
}

#[test]
fn test_every_danger_sign_forces_emergency_without_analysis() {
    for sign in DangerSign::ALL {
        let encoder = MockEncoder::new(EncoderBehavior::Embed);
        let engine = MockEngine::new(EngineBehavior::Rules);
        let orch = build(encoder.clone(), engine.clone(), 1.0);

        let patient = PatientVitals::new(24, 30, DangerSigns::none().with(sign)).unwrap();
        let decision = orch.predict("cough.wav", &patient).unwrap();

        assert_eq!(decision.disposition, Disposition::Emergency);
        assert_eq!(decision.confidence, 1.0);
        assert_eq!(decision.action.as_deref(), Some(EMERGENCY_ACTION));
        assert!(decision.rationale.contains(sign.label()));
        assert_eq!(encoder.call_count(), 0);
        assert_eq!(engine.call_count(), 0);
    }
}

#[test]
fn test_danger_signs_win_over_missing_audio() {
    let encoder = MockEncoder::new(EncoderBehavior::Embed);
    let orch = build(encoder, MockEngine::new(EngineBehavior::Rules), 1.0);
    let patient = PatientVitals::new(24, 30, DangerSigns::none().with(DangerSign::Lethargic)).unwrap();

    let decision = orch.predict("missing.wav", &patient).unwrap();
    assert_eq!(decision.disposition, Disposition::Emergency);
}

#[test]
fn test_pediatric_fast_breathing_gets_amoxicillin() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Rules),
        1.0,
    );
    for (age, rate) in [(0, 60), (7, 52), (24, 40), (120, 30), (227, 30)] {
        let decision = orch.predict("cough.wav", &vitals(age, rate)).unwrap();
        assert_eq!(decision.disposition, Disposition::Pathological, "age {}", age);
        assert!(decision.action.unwrap().contains("Amoxicillin"), "age {}", age);
    }
}

#[test]
fn test_adult_and_elderly_actions() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Rules),
        1.0,
    );

    let adult = orch.predict("cough.wav", &vitals(420, 24)).unwrap();
    let action = adult.action.unwrap();
    assert!(action.contains("clinical evaluation"));
    assert!(action.contains("bronchodilator"));

    let elderly = orch.predict("cough.wav", &vitals(900, 26)).unwrap();
    let action = elderly.action.unwrap();
    assert!(action.contains("COPD"));
    assert!(action.contains("oxygen"));
}

#[test]
fn test_near_silent_recording_is_inconclusive_and_skips_reasoning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silent.wav");
    let faint = sine_wave(300.0, 0.00007, 3.0, 16_000);
    assert!(faint.rms() < 0.0001);
    write_wav(&path, &faint).unwrap();

    let config = EdgeConfig::default();
    let encoder = Arc::new(HearEncoder::new(
        &config,
        Arc::new(FrameEnergyBackend::new(config.embedding_dim)),
    ));
    let engine = MockEngine::new(EngineBehavior::Rules);
    let orch = build(encoder, engine.clone(), 1.0);

    let decision = orch
        .predict(path.to_str().unwrap(), &vitals(12, 25))
        .unwrap();
    assert_eq!(decision.disposition, Disposition::Inconclusive);
    assert_eq!(decision.confidence, 0.0);
    assert!(decision.rationale.contains("quality"));
    assert!(decision.rationale.contains("too silent"));
    assert!(decision.action.unwrap().contains("re-record"));
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_encoder_quality_failure_is_absorbed() {
    let engine = MockEngine::new(EngineBehavior::Rules);
    let orch = build(MockEncoder::new(EncoderBehavior::LowQuality), engine.clone(), 1.0);

    let decision = orch.predict("cough.wav", &vitals(30, 30)).unwrap();
    assert_eq!(decision.disposition, Disposition::Inconclusive);
    assert!(decision.rationale.contains("too noisy"));
    assert!(decision.usage_stats.is_some());
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_engine_quality_failure_is_absorbed() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::LowQuality),
        1.0,
    );
    let decision = orch.predict("cough.wav", &vitals(30, 30)).unwrap();
    assert_eq!(decision.disposition, Disposition::Inconclusive);
    assert!(decision.rationale.contains("no signal"));
}

#[test]
fn test_engine_failure_surfaces_as_pipeline_failure() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Fail),
        1.0,
    );
    match orch.predict("cough.wav", &vitals(30, 30)) {
        Err(Error::PipelineFailure { stage, source }) => {
            assert_eq!(stage, "reasoning");
            assert!(matches!(*source, Error::Inference(_)));
        }
        other => panic!("expected pipeline failure, got {:?}", other),
    }
}

#[test]
fn test_encoder_crash_surfaces_as_pipeline_failure() {
    let engine = MockEngine::new(EngineBehavior::Rules);
    let orch = build(MockEncoder::new(EncoderBehavior::Crash), engine.clone(), 1.0);
    assert!(matches!(
        orch.predict("cough.wav", &vitals(30, 30)),
        Err(Error::PipelineFailure { ref stage, .. }) if stage == "encoding"
    ));
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_missing_and_empty_audio_references() {
    let encoder = MockEncoder::new(EncoderBehavior::Embed);
    let orch = build(encoder.clone(), MockEngine::new(EngineBehavior::Rules), 1.0);

    assert!(matches!(
        orch.predict("", &vitals(30, 30)),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        orch.predict("missing.wav", &vitals(30, 30)),
        Err(Error::NotFound(_))
    ));
    assert_eq!(encoder.call_count(), 0);
}

#[test]
fn test_engine_action_is_overridden_by_protocol() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::ProposeAction),
        1.0,
    );
    let decision = orch.predict("cough.wav", &vitals(30, 30)).unwrap();
    assert_eq!(
        decision.action.as_deref(),
        Some("Soothe throat, fluids, rest. No antibiotics needed.")
    );
}

#[test]
fn test_unstructured_engine_text_is_parsed() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Text(
            "REASONING: Coarse crackles heard.\nRECOMMENDATION: start cefalexin\nSTATUS: YELLOW\nCONFIDENCE: 0.8",
        )),
        1.0,
    );
    let decision = orch.predict("cough.wav", &vitals(30, 30)).unwrap();
    assert_eq!(decision.disposition, Disposition::Pathological);
    assert!((decision.confidence - 0.8).abs() < 1e-9);
    assert_eq!(decision.rationale, "Coarse crackles heard.");
    assert!(decision.action.unwrap().contains("Amoxicillin"));
}

#[test]
fn test_unparseable_engine_text_is_inconclusive() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Text("model produced nothing useful")),
        1.0,
    );
    let decision = orch.predict("cough.wav", &vitals(30, 30)).unwrap();
    assert_eq!(decision.disposition, Disposition::Inconclusive);
    assert_eq!(decision.confidence, 0.5);
}

#[test]
fn test_usage_stats_present_on_every_returned_decision() {
    let cases: Vec<(Arc<MockEncoder>, PatientVitals)> = vec![
        (MockEncoder::new(EncoderBehavior::Embed), vitals(7, 52)),
        (MockEncoder::new(EncoderBehavior::LowQuality), vitals(7, 52)),
        (
            MockEncoder::new(EncoderBehavior::Embed),
            PatientVitals::new(7, 52, DangerSigns::none().with(DangerSign::Convulsions)).unwrap(),
        ),
    ];
    for (encoder, patient) in cases {
        let orch = build(encoder, MockEngine::new(EngineBehavior::Rules), 1.0);
        let decision = orch.predict("cough.wav", &patient).unwrap();
        let stats = decision.usage_stats.expect("usage stats");
        for key in [STAT_LATENCY_SEC, STAT_MAX_ALLOWED_SEC, STAT_RAM_GB, STAT_FLOPS_G] {
            assert!(stats.contains_key(key), "missing {}", key);
        }
    }
}

#[test]
fn test_memory_ceiling_discards_completed_analysis() {
    let engine = MockEngine::new(EngineBehavior::Rules);
    let orch = build(MockEncoder::new(EncoderBehavior::Embed), engine.clone(), 6.0);
    assert!(matches!(
        orch.predict("cough.wav", &vitals(7, 52)),
        Err(Error::EdgeConstraintViolation(_))
    ));
    // Analysis ran to completion before the ceiling was enforced
    assert_eq!(engine.call_count(), 1);
}

#[test]
fn test_idempotent_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cough.wav");
    write_wav(&path, &sine_wave(420.0, 0.2, 4.0, 16_000)).unwrap();

    let config = EdgeConfig::default();
    let encoder = Arc::new(HearEncoder::new(
        &config,
        Arc::new(FrameEnergyBackend::new(config.embedding_dim)),
    ));
    let orch = build(encoder, MockEngine::new(EngineBehavior::Rules), 1.0);

    let first = orch.predict(path.to_str().unwrap(), &vitals(7, 52)).unwrap();
    let second = orch.predict(path.to_str().unwrap(), &vitals(7, 52)).unwrap();
    assert_eq!(first.disposition, second.disposition);
    assert_eq!(first.action, second.action);
    assert_eq!(first.rationale, second.rationale);
}

#[test]
fn test_concurrent_patients_share_one_orchestrator() {
    let orch = Arc::new(build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Rules),
        1.0,
    ));

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let orch = Arc::clone(&orch);
                scope.spawn(move || {
                    let rate = if i % 2 == 0 { 60 } else { 20 };
                    (rate, orch.predict("cough.wav", &vitals(24, rate)).unwrap())
                })
            })
            .collect();

        for handle in handles {
            let (rate, decision) = handle.join().unwrap();
            let expected = if rate >= 40 {
                Disposition::Pathological
            } else {
                Disposition::Normal
            };
            assert_eq!(decision.disposition, expected);
        }
    });
}

#[test]
fn test_scenario_pneumonia_infant() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Rules),
        1.0,
    );
    let decision = orch.predict("cough.wav", &vitals(7, 52)).unwrap();
    assert_eq!(decision.disposition, Disposition::Pathological);
    assert!(decision.action.unwrap().contains("Amoxicillin"));
}

#[test]
fn test_scenario_lethargic_toddler() {
    let encoder = MockEncoder::new(EncoderBehavior::Embed);
    let orch = build(encoder.clone(), MockEngine::new(EngineBehavior::Rules), 1.0);
    let patient = PatientVitals::from_json(&serde_json::json!({
        "age_months": 24,
        "respiratory_rate": 30,
        "lethargic": true,
    }))
    .unwrap();
    let decision = orch.predict("cough.wav", &patient).unwrap();
    assert_eq!(decision.disposition, Disposition::Emergency);
    assert_eq!(decision.action.as_deref(), Some(EMERGENCY_ACTION));
    assert_eq!(encoder.call_count(), 0);
}

#[test]
fn test_predict_json_band_boundaries() {
    let orch = build(
        MockEncoder::new(EncoderBehavior::Embed),
        MockEngine::new(EngineBehavior::Rules),
        1.0,
    );
    // At 12 months the child band threshold (40) applies, not 50
    let at_boundary = orch
        .predict_json("cough.wav", &serde_json::json!({"age_months": 12, "respiratory_rate": 45}))
        .unwrap();
    assert_eq!(at_boundary.disposition, Disposition::Pathological);

    let below = orch
        .predict_json("cough.wav", &serde_json::json!({"age_months": 11, "respiratory_rate": 45}))
        .unwrap();
    assert_eq!(below.disposition, Disposition::Normal);
}
