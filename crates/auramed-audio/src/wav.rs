//! WAV decoding and waveform utilities.
//!
//! Recordings are decoded with `hound`, downmixed to mono, normalized to
//! [-1, 1] and linearly resampled to the pipeline sample rate.

use std::path::Path;

use auramed_core::{Error, Result};
use tracing::debug;

/// Mono PCM waveform in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Root mean square amplitude; 0 for an empty waveform.
    pub fn rms(&self) -> f64 {
        rms(&self.samples)
    }

    /// Truncate or zero-pad to exactly `target_secs`.
    pub fn normalize_duration(mut self, target_secs: f64) -> Self {
        let target = (target_secs * self.sample_rate as f64) as usize;
        self.samples.resize(target, 0.0);
        self
    }

    /// Split into fixed-length segments; the final segment is zero-padded.
    pub fn segments(&self, segment_secs: f64) -> Vec<Vec<f32>> {
        let chunk = ((segment_secs * self.sample_rate as f64) as usize).max(1);
        self.samples
            .chunks(chunk)
            .map(|c| {
                let mut segment = c.to_vec();
                segment.resize(chunk, 0.0);
                segment
            })
            .collect()
    }
}

pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Decode a WAV file into a mono waveform at `target_rate`.
pub fn load_wav(path: &Path, target_rate: u32) -> Result<Waveform> {
    if !path.is_file() {
        return Err(Error::NotFound(format!(
            "Audio file not found: {}",
            path.display()
        )));
    }

    let mut reader = hound::WavReader::open(path)
        .map_err(|e| Error::Audio(format!("Failed to open {}: {}", path.display(), e)))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Audio(format!("Failed to decode samples: {}", e)))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::Audio(format!("Failed to decode samples: {}", e)))?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    let samples = resample_linear(&mono, spec.sample_rate, target_rate);
    debug!(
        "Loaded {}: {} Hz x{} -> {} samples at {} Hz",
        path.display(),
        spec.sample_rate,
        channels,
        samples.len(),
        target_rate
    );

    Ok(Waveform::new(samples, target_rate))
}

/// Write a mono 32-bit float WAV file.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| Error::Audio(format!("Failed to create {}: {}", path.display(), e)))?;
    for &sample in &waveform.samples {
        writer
            .write_sample(sample)
            .map_err(|e| Error::Audio(format!("Failed to write sample: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| Error::Audio(format!("Failed to finalize {}: {}", path.display(), e)))?;
    Ok(())
}

/// Linear-interpolation resampler.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).round() as usize;
    let last = samples.len() - 1;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] * (1.0 - frac) + samples[next] * frac
        })
        .collect()
}

/// Sine tone, used for fixtures and demo recordings.
pub fn sine_wave(freq_hz: f32, amplitude: f32, duration_secs: f64, sample_rate: u32) -> Waveform {
    let n = (duration_secs * sample_rate as f64) as usize;
    let samples = (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * freq_hz * t).sin()
        })
        .collect();
    Waveform::new(samples, sample_rate)
}
