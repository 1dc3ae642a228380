//! Triage dispositions and the decision returned to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Clinical disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// No treatment needed (GREEN).
    Normal,
    /// Treatable respiratory pathology (YELLOW).
    Pathological,
    /// Urgent referral (RED).
    Emergency,
    /// Analysis could not reach a conclusion.
    Inconclusive,
}

impl Disposition {
    pub const ALL: [Disposition; 4] = [
        Disposition::Normal,
        Disposition::Pathological,
        Disposition::Emergency,
        Disposition::Inconclusive,
    ];

    /// Override precedence: emergency > pathological > inconclusive > normal.
    pub fn severity_rank(&self) -> u8 {
        match self {
            Disposition::Normal => 0,
            Disposition::Inconclusive => 1,
            Disposition::Pathological => 2,
            Disposition::Emergency => 3,
        }
    }

    /// Traffic-light code used on clinic-facing displays.
    pub fn triage_color(&self) -> &'static str {
        match self {
            Disposition::Normal => "GREEN",
            Disposition::Pathological => "YELLOW",
            Disposition::Emergency => "RED",
            Disposition::Inconclusive => "INCONCLUSIVE",
        }
    }

    /// Parse a status token, accepting both symbolic names and triage colors.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "NORMAL" | "GREEN" => Some(Disposition::Normal),
            "PATHOLOGICAL" | "YELLOW" => Some(Disposition::Pathological),
            "EMERGENCY" | "RED" => Some(Disposition::Emergency),
            "INCONCLUSIVE" => Some(Disposition::Inconclusive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Pathological => write!(f, "pathological"),
            Self::Emergency => write!(f, "emergency"),
            Self::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

pub const STAT_LATENCY_SEC: &str = "latency_sec";
pub const STAT_RAM_GB: &str = "ram_gb";
pub const STAT_FLOPS_G: &str = "flops_g";
pub const STAT_MAX_ALLOWED_SEC: &str = "max_allowed_sec";

/// Resource usage attached to a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageStats(BTreeMap<String, f64>);

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: UsageStats) {
        self.0.extend(other.0);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn latency_sec(&self) -> Option<f64> {
        self.get(STAT_LATENCY_SEC)
    }

    pub fn ram_gb(&self) -> Option<f64> {
        self.get(STAT_RAM_GB)
    }
}

/// Final, auditable triage outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub disposition: Disposition,
    /// In [0, 1].
    pub confidence: f64,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_stats: Option<UsageStats>,
}

impl TriageDecision {
    pub fn new(disposition: Disposition, confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            disposition,
            confidence: clamp_confidence(confidence),
            rationale: rationale.into(),
            action: None,
            usage_stats: None,
        }
    }

    /// Merge usage stats into whatever is already attached.
    pub fn attach_usage(&mut self, stats: UsageStats) {
        match self.usage_stats.as_mut() {
            Some(existing) => existing.merge(stats),
            None => self.usage_stats = Some(stats),
        }
    }
}

/// Clamp into [0, 1]; NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
