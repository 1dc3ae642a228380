//! Recording quality gate: duration and RMS bounds.

use auramed_core::{EdgeConfig, Error, Result};

use crate::wav::Waveform;

/// Measurements taken while gating a recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    pub duration_sec: f64,
    pub rms: f64,
}

/// Rejects recordings that are too short, too loud or too quiet.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    min_duration_sec: f64,
    rms_upper: f64,
    rms_lower: f64,
}

impl QualityGate {
    pub fn new(min_duration_sec: f64, rms_lower: f64, rms_upper: f64) -> Self {
        Self {
            min_duration_sec,
            rms_upper,
            rms_lower,
        }
    }

    pub fn from_config(config: &EdgeConfig) -> Self {
        Self::new(
            config.min_audio_duration_sec,
            config.noise_rms_lower,
            config.noise_rms_upper,
        )
    }

    /// Duration is checked first, then the noise ceiling, then the silence floor.
    pub fn check(&self, waveform: &Waveform) -> Result<QualityReport> {
        let duration_sec = waveform.duration_secs();
        if duration_sec < self.min_duration_sec {
            return Err(Error::LowQuality(format!(
                "Audio recording is too short (minimum {} second required)",
                self.min_duration_sec
            )));
        }

        let rms = waveform.rms();
        if rms > self.rms_upper {
            return Err(Error::LowQuality(
                "Audio recording is too noisy or distorted".into(),
            ));
        }
        if rms < self.rms_lower {
            return Err(Error::LowQuality(
                "Audio recording contains no clear signal (too silent)".into(),
            ));
        }

        Ok(QualityReport { duration_sec, rms })
    }
}
