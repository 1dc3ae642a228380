//! ONNX-based segment backend for an exported HeAR model.
//!
//! Loads `model.onnx` taking a `[1, samples]` float32 waveform segment and
//! producing a `[1, dim]` embedding. Requires the `onnx` feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;
    use std::sync::Arc;

    use auramed_core::{Error, Result};
    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tracing::{info, warn};

    use crate::encoder::SegmentBackend;

    /// Default embedding dimension of the HeAR encoder.
    const DEFAULT_DIM: usize = 512;

    /// ONNX segment backend.
    pub struct OnnxHearBackend {
        session: Arc<Mutex<Session>>,
        dimension: usize,
    }

    impl OnnxHearBackend {
        /// Load an ONNX model from the given directory.
        ///
        /// Expects `model_dir/model.onnx`.
        pub fn load(model_dir: &Path) -> std::result::Result<Self, String> {
            let model_path = model_dir.join("model.onnx");
            if !model_path.exists() {
                return Err(format!("Model not found: {}", model_path.display()));
            }

            // With load-dynamic feature, ORT_DYLIB_PATH env var must point to libonnxruntime.so
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| format!("Failed to create session builder: {}", e))?
                .with_intra_threads(2)
                .map_err(|e| format!("Failed to set threads: {}", e))?
                .commit_from_file(&model_path)
                .map_err(|e| format!("Failed to load ONNX model: {}", e))?;

            info!(
                "ONNX HeAR backend loaded: dim={}, model={}",
                DEFAULT_DIM,
                model_path.display()
            );

            Ok(Self {
                session: Arc::new(Mutex::new(session)),
                dimension: DEFAULT_DIM,
            })
        }
    }

    impl SegmentBackend for OnnxHearBackend {
        fn embed_segment(&self, segment: &[f32], _sample_rate: u32) -> Result<Array1<f32>> {
            let input = Tensor::from_array(([1usize, segment.len()], segment.to_vec()))
                .map_err(|e| Error::Inference(format!("Failed to create input tensor: {}", e)))?;

            let mut session = self.session.lock();
            let outputs = session.run(ort::inputs![input]).map_err(|e| {
                warn!("ONNX inference failed: {}", e);
                Error::Inference(format!("ONNX inference failed: {}", e))
            })?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("Failed to extract output: {}", e)))?;

            let dims: Vec<i64> = shape.iter().copied().collect();
            match dims.as_slice() {
                [1, dim] if *dim as usize == self.dimension => {
                    Ok(Array1::from_vec(data[..self.dimension].to_vec()))
                }
                other => Err(Error::Inference(format!(
                    "Unexpected output shape: {:?}",
                    other
                ))),
            }
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "onnx"
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxHearBackend;
