//! Edge deployment configuration.
//!
//! Fixed at process start and passed explicitly into constructors. Values
//! come from an optional JSON file, then `AURAMED_*` environment overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const DEFAULT_MAX_RAM_GB: f64 = 4.0;
pub const DEFAULT_MAX_LATENCY_SEC: f64 = 10.0;
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_MIN_AUDIO_DURATION_SEC: f64 = 1.0;
pub const DEFAULT_MAX_AUDIO_DURATION_SEC: f64 = 10.0;
pub const DEFAULT_NOISE_RMS_UPPER: f64 = 0.5;
pub const DEFAULT_NOISE_RMS_LOWER: f64 = 0.001;
pub const DEFAULT_SEGMENT_DURATION_SEC: f64 = 2.0;
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// Resource ceilings and audio acceptance bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Hard peak-memory ceiling in GB.
    pub max_ram_gb: f64,
    /// Advisory latency budget in seconds.
    pub max_latency_sec: f64,
    /// Target sample rate for loaded audio.
    pub sample_rate: u32,
    /// Recordings shorter than this are rejected as low quality.
    pub min_audio_duration_sec: f64,
    /// Recordings are truncated or zero-padded to this length.
    pub max_audio_duration_sec: f64,
    /// RMS above this is treated as noise or clipping.
    pub noise_rms_upper: f64,
    /// RMS below this is treated as silence.
    pub noise_rms_lower: f64,
    /// Length of each encoder segment in seconds.
    pub segment_duration_sec: f64,
    /// Acoustic embedding dimension.
    pub embedding_dim: usize,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            max_ram_gb: DEFAULT_MAX_RAM_GB,
            max_latency_sec: DEFAULT_MAX_LATENCY_SEC,
            sample_rate: DEFAULT_SAMPLE_RATE,
            min_audio_duration_sec: DEFAULT_MIN_AUDIO_DURATION_SEC,
            max_audio_duration_sec: DEFAULT_MAX_AUDIO_DURATION_SEC,
            noise_rms_upper: DEFAULT_NOISE_RMS_UPPER,
            noise_rms_lower: DEFAULT_NOISE_RMS_LOWER,
            segment_duration_sec: DEFAULT_SEGMENT_DURATION_SEC,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl EdgeConfig {
    /// Load config from an optional JSON file, then apply environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                let parsed: EdgeConfig = serde_json::from_str(&raw)?;
                info!("Loaded edge config from {}", path.display());
                parsed
            }
            _ => EdgeConfig::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `AURAMED_*` environment variables.
    fn apply_env(&mut self) -> Result<()> {
        override_from_env("AURAMED_MAX_RAM_GB", &mut self.max_ram_gb)?;
        override_from_env("AURAMED_MAX_LATENCY_SEC", &mut self.max_latency_sec)?;
        override_from_env("AURAMED_SAMPLE_RATE", &mut self.sample_rate)?;
        override_from_env("AURAMED_MIN_AUDIO_SEC", &mut self.min_audio_duration_sec)?;
        override_from_env("AURAMED_MAX_AUDIO_SEC", &mut self.max_audio_duration_sec)?;
        override_from_env("AURAMED_NOISE_RMS_UPPER", &mut self.noise_rms_upper)?;
        override_from_env("AURAMED_NOISE_RMS_LOWER", &mut self.noise_rms_lower)?;
        Ok(())
    }

    /// Reject configurations that cannot describe a usable edge device.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_ram_gb > 0.0) {
            return Err(Error::Config("max_ram_gb must be positive".into()));
        }
        if !(self.max_latency_sec > 0.0) {
            return Err(Error::Config("max_latency_sec must be positive".into()));
        }
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be non-zero".into()));
        }
        if self.min_audio_duration_sec < 0.0
            || self.max_audio_duration_sec < self.min_audio_duration_sec
        {
            return Err(Error::Config(format!(
                "audio duration bounds invalid: min={} max={}",
                self.min_audio_duration_sec, self.max_audio_duration_sec
            )));
        }
        if self.noise_rms_lower < 0.0 || self.noise_rms_lower >= self.noise_rms_upper {
            return Err(Error::Config(format!(
                "noise RMS bounds invalid: lower={} upper={}",
                self.noise_rms_lower, self.noise_rms_upper
            )));
        }
        if !(self.segment_duration_sec > 0.0) {
            return Err(Error::Config("segment_duration_sec must be positive".into()));
        }
        if self.embedding_dim == 0 {
            return Err(Error::Config("embedding_dim must be non-zero".into()));
        }
        Ok(())
    }
}

fn override_from_env<T: std::str::FromStr>(key: &str, slot: &mut T) -> Result<()> {
    if let Ok(raw) = std::env::var(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid value: {:?}", key, raw)))?;
        debug!("Config override {}={}", key, raw.trim());
    }
    Ok(())
}
