//! Demo journeys with synthetic recordings.

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use auramed_audio::wav::{sine_wave, write_wav, Waveform};
use auramed_core::{DangerSign, DangerSigns, Disposition, PatientVitals, Result, TriageDecision};
use auramed_runtime::{LatencyTracker, Orchestrator};
use tracing::info;

pub struct Journey {
    pub name: &'static str,
    pub audio: PathBuf,
    pub vitals: PatientVitals,
    pub expected: Disposition,
}

pub struct JourneyOutcome {
    pub name: &'static str,
    pub expected: Disposition,
    pub result: std::result::Result<TriageDecision, String>,
}

impl JourneyOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(d) if d.disposition == self.expected)
    }
}

/// Decaying 350 Hz bursts, two per second.
fn cough_bursts(duration_secs: f64, sample_rate: u32) -> Waveform {
    let n = (duration_secs * sample_rate as f64) as usize;
    let samples = (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let envelope = (-6.0 * (t % 0.5)).exp();
            0.3 * envelope * (2.0 * PI * 350.0 * t).sin()
        })
        .collect();
    Waveform::new(samples, sample_rate)
}

/// Write fixtures into `dir` and return the three journeys.
pub fn prepare(dir: &Path, sample_rate: u32) -> Result<Vec<Journey>> {
    let cough = dir.join("cough_sample.wav");
    write_wav(&cough, &cough_bursts(3.0, sample_rate))?;

    // RMS around 0.00005, below the silence floor
    let faint = dir.join("low_quality_sample.wav");
    write_wav(&faint, &sine_wave(300.0, 0.00007, 3.0, sample_rate))?;

    info!("Demo fixtures written to {}", dir.display());

    Ok(vec![
        Journey {
            name: "Journey 1: Clinical Success (Pneumonia)",
            audio: cough.clone(),
            vitals: PatientVitals::new(7, 52, DangerSigns::none())?,
            expected: Disposition::Pathological,
        },
        Journey {
            name: "Journey 2: Emergency Override (Lethargy)",
            audio: cough,
            vitals: PatientVitals::new(
                24,
                30,
                DangerSigns::none()
                    .with(DangerSign::General)
                    .with(DangerSign::Lethargic),
            )?,
            expected: Disposition::Emergency,
        },
        Journey {
            name: "Journey 3: Inconclusive (Low Quality Audio)",
            audio: faint,
            vitals: PatientVitals::new(12, 25, DangerSigns::none())?,
            expected: Disposition::Inconclusive,
        },
    ])
}

pub fn run(
    orchestrator: &Orchestrator,
    journeys: &[Journey],
    tracker: &mut LatencyTracker,
) -> Vec<JourneyOutcome> {
    journeys
        .iter()
        .map(|journey| {
            let result = orchestrator.predict(&journey.audio.to_string_lossy(), &journey.vitals);
            if let Ok(decision) = &result {
                tracker.record(journey.name, decision);
            }
            JourneyOutcome {
                name: journey.name,
                expected: journey.expected,
                result: result.map_err(|e| e.to_string()),
            }
        })
        .collect()
}

pub fn print_decision(decision: &TriageDecision) {
    println!(
        "Status:      {} ({})",
        decision.disposition.triage_color(),
        decision.disposition
    );
    println!("Confidence:  {:.2}", decision.confidence);
    println!("Rationale:   {}", decision.rationale);
    if let Some(action) = &decision.action {
        println!("Action:      {}", action);
    }
    if let Some(stats) = &decision.usage_stats {
        for (key, value) in stats.iter() {
            println!("  {:<16} {}", key, value);
        }
    }
}

pub fn print_report(outcomes: &[JourneyOutcome], tracker: &LatencyTracker) {
    println!("=== AuraMed Demo Journeys ===");
    for outcome in outcomes {
        println!();
        println!("--- {} ---", outcome.name);
        match &outcome.result {
            Ok(decision) => print_decision(decision),
            Err(e) => println!("Error:       {}", e),
        }
        println!(
            "Expected:    {} -> {}",
            outcome.expected,
            if outcome.passed() { "PASS" } else { "FAIL" }
        );
    }
    println!();
    print!("{}", tracker.render_table());
}
