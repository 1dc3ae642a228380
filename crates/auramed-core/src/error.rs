//! Error types for AuraMed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed vitals or a missing audio reference.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio reference could not be resolved.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Emergency danger signs present. Always absorbed into an emergency decision.
    #[error("{0}")]
    DangerSignDetected(String),

    /// Recording unusable for analysis. Always absorbed into an inconclusive decision.
    #[error("Low quality audio: {0}")]
    LowQuality(String),

    /// The call exceeded the edge memory ceiling.
    #[error("Edge constraint violation: {0}")]
    EdgeConstraintViolation(String),

    /// Unexpected failure inside the pipeline, wrapping the original cause.
    #[error("Pipeline failure during {stage}: {source}")]
    PipelineFailure {
        stage: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an error as a pipeline failure at the given stage.
    pub fn pipeline(stage: impl Into<String>, source: Error) -> Self {
        Error::PipelineFailure {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Variant name in snake_case, for stage logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::NotFound(_) => "not_found",
            Error::DangerSignDetected(_) => "danger_sign_detected",
            Error::LowQuality(_) => "low_quality",
            Error::EdgeConstraintViolation(_) => "edge_constraint_violation",
            Error::PipelineFailure { .. } => "pipeline_failure",
            Error::Audio(_) => "audio",
            Error::Inference(_) => "inference",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Config(_) => "config",
            Error::Internal(_) => "internal",
        }
    }

    /// Whether the error is a recording-quality signal rather than a fault.
    pub fn is_low_quality(&self) -> bool {
        matches!(self, Error::LowQuality(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_pipeline_failure_keeps_cause() {
        let err = Error::pipeline("reasoning", Error::Inference("model crashed".into()));
        assert!(err.to_string().contains("reasoning"));
        assert!(err.to_string().contains("model crashed"));
        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "Inference error: model crashed");
    }

    #[test]
    fn test_danger_sign_message_is_verbatim() {
        let err = Error::DangerSignDetected("Emergency Danger Signs Detected: Lethargic".into());
        assert_eq!(err.to_string(), "Emergency Danger Signs Detected: Lethargic");
        assert!(!err.is_low_quality());
        assert!(Error::LowQuality("silent".into()).is_low_quality());
    }

    #[test]
    fn test_kind_names_the_variant() {
        assert_eq!(Error::NotFound("x".into()).kind(), "not_found");
        let err = Error::pipeline("encoding", Error::Audio("truncated".into()));
        assert_eq!(err.kind(), "pipeline_failure");
    }
}
