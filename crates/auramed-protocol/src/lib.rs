//! Clinical protocol layer: danger-sign override and action tables.
//!
//! `SafetyGuard` is the first decision point of every triage call.
//! `ProtocolEngine` is the sole source of action text; it overwrites
//! whatever an upstream engine proposed.

pub mod actions;
pub mod safety;

pub use actions::ProtocolEngine;
pub use safety::SafetyGuard;
