//! Runtime types.

use serde::Serialize;

/// Orchestration stage. `Failed` is reachable from any other stage and
/// carries the error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Start,
    Validating,
    SafetyChecked,
    /// Danger signs present; encoder and engine are skipped.
    ShortCircuitEmergency,
    InputChecked,
    Encoding,
    Reasoning,
    ProtocolApplied,
    Audited,
    Done,
    Failed(&'static str),
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Validating => "validating",
            Self::SafetyChecked => "safety_checked",
            Self::ShortCircuitEmergency => "short_circuit_emergency",
            Self::InputChecked => "input_checked",
            Self::Encoding => "encoding",
            Self::Reasoning => "reasoning",
            Self::ProtocolApplied => "protocol_applied",
            Self::Audited => "audited",
            Self::Done => "done",
            Self::Failed(kind) => return write!(f, "failed({})", kind),
        };
        write!(f, "{}", name)
    }
}

/// Runtime status information.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub encoder: String,
    pub engine: String,
    #[serde(rename = "maxRamGb")]
    pub max_ram_gb: f64,
    #[serde(rename = "maxLatencySec")]
    pub max_latency_sec: f64,
    #[serde(rename = "sampleRate")]
    pub sample_rate: u32,
    #[serde(rename = "residentRamGb")]
    pub resident_ram_gb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_stage_shows_kind() {
        assert_eq!(PipelineStage::Failed("not_found").to_string(), "failed(not_found)");
        assert_eq!(PipelineStage::Reasoning.to_string(), "reasoning");
    }
}
