//! AuraMed Audio: WAV loading, quality gate, acoustic embeddings.
//!
//! Provides the `AudioEncoder` trait the orchestrator depends on and the
//! reference `HearEncoder`. When the `onnx` feature is enabled and a model
//! file is present, segments are embedded by `OnnxHearBackend`; otherwise
//! `FrameEnergyBackend` produces deterministic content-derived features.

pub mod encoder;
pub mod hear;
pub mod onnx_backend;
pub mod quality;
pub mod wav;

pub use encoder::{AudioEncoder, Embedding, FrameEnergyBackend, SegmentBackend};
pub use hear::HearEncoder;
pub use quality::{QualityGate, QualityReport};
pub use wav::{load_wav, write_wav, Waveform};

#[cfg(feature = "onnx")]
pub use onnx_backend::OnnxHearBackend;

use std::path::Path;
use std::sync::Arc;

use auramed_core::EdgeConfig;

/// Create the best available encoder for the given model directory.
///
/// Tries ONNX first (if feature enabled and model file present),
/// falls back to FrameEnergyBackend.
pub fn create_encoder(config: &EdgeConfig, model_dir: Option<&Path>) -> Arc<dyn AudioEncoder> {
    #[cfg(feature = "onnx")]
    {
        if let Some(dir) = model_dir {
            match OnnxHearBackend::load(dir) {
                Ok(backend) => {
                    tracing::info!("Using ONNX HeAR backend (dim={})", backend.dimension());
                    return Arc::new(HearEncoder::new(config, Arc::new(backend)));
                }
                Err(e) => {
                    tracing::warn!("ONNX backend unavailable: {}. Falling back to frame features.", e);
                }
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        tracing::info!("ONNX feature disabled. Using frame-energy features.");
    }

    Arc::new(HearEncoder::new(
        config,
        Arc::new(FrameEnergyBackend::new(config.embedding_dim)),
    ))
}
