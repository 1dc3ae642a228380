//! AuraMed Core: vitals, triage decision types, edge configuration, errors.

pub mod config;
pub mod error;
pub mod resources;
pub mod triage;
pub mod vitals;

pub use config::EdgeConfig;
pub use error::{Error, Result};
pub use resources::{FixedMemory, MemoryProbe, ProcessMemory};
pub use triage::{Disposition, TriageDecision, UsageStats};
pub use vitals::{AgeGroup, ClinicalProtocol, DangerSign, DangerSigns, PatientVitals, VitalsInput};
