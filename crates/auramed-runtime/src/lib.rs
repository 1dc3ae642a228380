//! Runtime orchestrator: triage sequencing, resource audit, telemetry.
//!
//! `Orchestrator::predict` is the single entry point: it runs the safety
//! guard, audio encoder, reasoning engine and protocol table in order
//! inside a `ResourceAuditor` window.

pub mod audit;
pub mod metrics;
pub mod orchestrator;
pub mod telemetry;
pub mod types;

pub use audit::{AuditGuard, AuditReport, ResourceAuditor};
pub use metrics::{ConfusionMatrix, ValidationReport};
pub use orchestrator::Orchestrator;
pub use telemetry::LatencyTracker;
pub use types::*;
