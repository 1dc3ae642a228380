//! Per-scenario latency and memory log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use auramed_core::{Disposition, TriageDecision};

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub scenario: String,
    pub latency_sec: f64,
    pub ram_gb: f64,
    pub disposition: Disposition,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyTracker {
    records: Vec<LatencyRecord>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision; missing usage stats count as zero.
    pub fn record(&mut self, scenario: impl Into<String>, decision: &TriageDecision) {
        let stats = decision.usage_stats.as_ref();
        self.records.push(LatencyRecord {
            scenario: scenario.into(),
            latency_sec: stats.and_then(|s| s.latency_sec()).unwrap_or(0.0),
            ram_gb: stats.and_then(|s| s.ram_gb()).unwrap_or(0.0),
            disposition: decision.disposition,
            timestamp: Utc::now(),
        });
    }

    pub fn records(&self) -> &[LatencyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn mean_latency_sec(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.records.iter().map(|r| r.latency_sec).sum::<f64>() / self.records.len() as f64
    }

    pub fn max_latency_sec(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.latency_sec)
            .fold(0.0, f64::max)
    }

    pub fn peak_ram_gb(&self) -> f64 {
        self.records.iter().map(|r| r.ram_gb).fold(0.0, f64::max)
    }

    /// Fixed-width text table, one row per record plus a summary line.
    pub fn render_table(&self) -> String {
        let mut out = format!(
            "{:<32} {:>12} {:>9} {:<13} {}\n",
            "scenario", "latency (s)", "ram (GB)", "disposition", "timestamp"
        );
        out.push_str(&"-".repeat(92));
        out.push('\n');
        for r in &self.records {
            out.push_str(&format!(
                "{:<32} {:>12.3} {:>9.2} {:<13} {}\n",
                r.scenario,
                r.latency_sec,
                r.ram_gb,
                r.disposition.to_string(),
                r.timestamp.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        out.push_str(&format!(
            "{} runs, mean latency {:.3}s, max latency {:.3}s, peak RAM {:.2}GB\n",
            self.len(),
            self.mean_latency_sec(),
            self.max_latency_sec(),
            self.peak_ram_gb()
        ));
        out
    }
}
