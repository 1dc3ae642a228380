//! HeAR-style recording encoder.
//!
//! Pipeline: load → quality gate → normalize duration → segment →
//! per-segment embed → mean.

use std::path::Path;
use std::sync::Arc;

use auramed_core::{EdgeConfig, Error, Result};
use ndarray::Array1;
use tracing::{debug, info};

use crate::encoder::{AudioEncoder, Embedding, SegmentBackend};
use crate::quality::QualityGate;
use crate::wav::{load_wav, Waveform};

/// Recording encoder backed by a `SegmentBackend`.
pub struct HearEncoder {
    backend: Arc<dyn SegmentBackend>,
    gate: QualityGate,
    sample_rate: u32,
    max_duration_sec: f64,
    segment_duration_sec: f64,
    name: String,
}

impl HearEncoder {
    pub fn new(config: &EdgeConfig, backend: Arc<dyn SegmentBackend>) -> Self {
        let name = format!("hear/{}", backend.name());
        Self {
            backend,
            gate: QualityGate::from_config(config),
            sample_rate: config.sample_rate,
            max_duration_sec: config.max_audio_duration_sec,
            segment_duration_sec: config.segment_duration_sec,
            name,
        }
    }

    /// Gate and embed an already-decoded waveform.
    pub fn encode_waveform(&self, waveform: Waveform) -> Result<Embedding> {
        let report = self.gate.check(&waveform)?;
        debug!(
            "Quality gate passed: duration={:.2}s rms={:.5}",
            report.duration_sec, report.rms
        );

        let normalized = waveform.normalize_duration(self.max_duration_sec);
        let segments = normalized.segments(self.segment_duration_sec);
        if segments.is_empty() {
            return Err(Error::Audio("recording produced no segments".into()));
        }

        let dim = self.backend.dimension();
        let mut sum = Array1::<f32>::zeros(dim);
        for segment in &segments {
            let embedding = self.backend.embed_segment(segment, normalized.sample_rate())?;
            if embedding.len() != dim {
                return Err(Error::Audio(format!(
                    "backend {} returned dim {} (expected {})",
                    self.backend.name(),
                    embedding.len(),
                    dim
                )));
            }
            sum += &embedding;
        }

        let count = segments.len();
        let mean = sum / count as f32;
        info!("Encoded {} segments into {}-dim embedding", count, dim);
        Ok(Embedding::new(mean, count))
    }
}

impl AudioEncoder for HearEncoder {
    fn encode(&self, reference: &str) -> Result<Embedding> {
        let waveform = load_wav(Path::new(reference), self.sample_rate)?;
        self.encode_waveform(waveform)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
