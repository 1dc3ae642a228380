//! Acoustic encoder traits and the default segment backend.
//!
//! `AudioEncoder` is the boundary the orchestrator talks to: a recording
//! reference in, a fixed-size embedding out. `SegmentBackend` is the
//! per-segment model behind the reference `HearEncoder`:
//! - `FrameEnergyBackend`: deterministic frame energy / zero-crossing features
//! - `OnnxHearBackend`: ONNX Runtime model (requires the `onnx` feature)

use std::path::Path;

use auramed_core::{Error, Result};
use ndarray::Array1;

/// Fixed-size acoustic embedding of one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// Float32 embedding vector.
    pub vector: Array1<f32>,
    /// Number of segments averaged into the vector.
    pub segments: usize,
}

impl Embedding {
    pub fn new(vector: Array1<f32>, segments: usize) -> Self {
        Self { vector, segments }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn l2_norm(&self) -> f32 {
        self.vector.dot(&self.vector).sqrt()
    }

    pub fn mean(&self) -> f32 {
        if self.vector.is_empty() {
            return 0.0;
        }
        self.vector.sum() / self.vector.len() as f32
    }
}

/// Converts a recording reference into an embedding.
pub trait AudioEncoder: Send + Sync {
    /// Encode a recording.
    ///
    /// Fails with `Error::LowQuality` when the recording fails the quality
    /// gate and `Error::NotFound` when the reference cannot be resolved.
    fn encode(&self, reference: &str) -> Result<Embedding>;

    /// Whether `reference` points at something this encoder can read.
    fn resolve(&self, reference: &str) -> bool {
        Path::new(reference).is_file()
    }

    /// Short identifier for logs and status output.
    fn name(&self) -> &str;
}

/// Per-segment embedding model.
pub trait SegmentBackend: Send + Sync {
    /// Embed one fixed-length segment.
    fn embed_segment(&self, segment: &[f32], sample_rate: u32) -> Result<Array1<f32>>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

/// Deterministic, content-derived features for devices without a model.
///
/// The first half of the vector holds per-frame RMS energy, the second half
/// per-frame zero-crossing rate, over equal-width frames of the segment.
pub struct FrameEnergyBackend {
    dim: usize,
}

impl FrameEnergyBackend {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl SegmentBackend for FrameEnergyBackend {
    fn embed_segment(&self, segment: &[f32], _sample_rate: u32) -> Result<Array1<f32>> {
        if segment.is_empty() {
            return Err(Error::Audio("cannot embed an empty segment".into()));
        }

        let energy_bins = self.dim / 2;
        let zcr_bins = self.dim - energy_bins;
        let mut features = Array1::<f32>::zeros(self.dim);

        for (bin, frame) in frames(segment, energy_bins).enumerate() {
            features[bin] = crate::wav::rms(frame) as f32;
        }
        for (bin, frame) in frames(segment, zcr_bins).enumerate() {
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            features[energy_bins + bin] = crossings as f32 / frame.len().max(1) as f32;
        }

        Ok(features)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "frame-energy"
    }
}

/// Split `samples` into `bins` contiguous frames of near-equal width.
fn frames(samples: &[f32], bins: usize) -> impl Iterator<Item = &[f32]> {
    let len = samples.len();
    (0..bins).map(move |b| {
        let start = b * len / bins.max(1);
        let end = ((b + 1) * len / bins.max(1)).max(start + 1).min(len);
        &samples[start.min(len.saturating_sub(1))..end]
    })
}
