//! Resource auditing around a single triage call.
//!
//! `ResourceAuditor::begin` samples memory and a monotonic clock; the
//! returned `AuditGuard` samples again on `finalize` and enforces the
//! memory ceiling. A guard dropped without `finalize` still logs its
//! telemetry.

use std::sync::Arc;
use std::time::Instant;

use auramed_core::triage::{STAT_FLOPS_G, STAT_LATENCY_SEC, STAT_MAX_ALLOWED_SEC, STAT_RAM_GB};
use auramed_core::{EdgeConfig, Error, MemoryProbe, ProcessMemory, Result, TriageDecision, UsageStats};
use serde::Serialize;
use tracing::{info, warn};

/// Giga-FLOPs charged per second of wall-clock latency.
pub const FLOPS_G_PER_SEC: f64 = 0.5;

/// Measurements taken over one audited call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuditReport {
    pub latency_sec: f64,
    pub peak_ram_gb: f64,
    pub flops_g: f64,
}

impl AuditReport {
    /// Usage-stats entries, rounded for reporting.
    pub fn usage_stats(&self, max_allowed_sec: f64) -> UsageStats {
        let mut stats = UsageStats::new();
        stats.insert(STAT_LATENCY_SEC, round_to(self.latency_sec, 3));
        stats.insert(STAT_RAM_GB, round_to(self.peak_ram_gb, 2));
        stats.insert(STAT_FLOPS_G, round_to(self.flops_g, 2));
        stats.insert(STAT_MAX_ALLOWED_SEC, max_allowed_sec);
        stats
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub struct ResourceAuditor {
    max_ram_gb: f64,
    max_latency_sec: f64,
    probe: Arc<dyn MemoryProbe>,
}

impl ResourceAuditor {
    pub fn new(config: &EdgeConfig) -> Self {
        Self::with_probe(config, Arc::new(ProcessMemory))
    }

    pub fn with_probe(config: &EdgeConfig, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            max_ram_gb: config.max_ram_gb,
            max_latency_sec: config.max_latency_sec,
            probe,
        }
    }

    pub fn max_ram_gb(&self) -> f64 {
        self.max_ram_gb
    }

    pub fn current_ram_gb(&self) -> f64 {
        self.probe.resident_gb()
    }

    pub fn begin(&self) -> AuditGuard<'_> {
        AuditGuard {
            auditor: self,
            started: Instant::now(),
            entry_ram_gb: self.probe.resident_gb(),
            finalized: false,
        }
    }

    /// Scoped form: audit `f` and finalize on its outcome.
    pub fn run<F>(&self, f: F) -> Result<TriageDecision>
    where
        F: FnOnce() -> Result<TriageDecision>,
    {
        let guard = self.begin();
        let outcome = f();
        guard.finalize(outcome)
    }
}

/// Open measurement window over one call.
pub struct AuditGuard<'a> {
    auditor: &'a ResourceAuditor,
    started: Instant,
    entry_ram_gb: f64,
    finalized: bool,
}

impl AuditGuard<'_> {
    fn measure(&self) -> AuditReport {
        let latency_sec = self.started.elapsed().as_secs_f64();
        let exit_ram_gb = self.auditor.probe.resident_gb();
        AuditReport {
            latency_sec,
            peak_ram_gb: self.entry_ram_gb.max(exit_ram_gb),
            flops_g: latency_sec * FLOPS_G_PER_SEC,
        }
    }

    /// Close the window and apply the resource policy to `outcome`.
    ///
    /// A memory-ceiling breach replaces the outcome, successful or not.
    /// Otherwise usage stats are merged into a successful decision and
    /// errors pass through unchanged.
    pub fn finalize(mut self, outcome: Result<TriageDecision>) -> Result<TriageDecision> {
        self.finalized = true;
        let report = self.measure();
        let auditor = self.auditor;

        if report.peak_ram_gb > auditor.max_ram_gb {
            let message = format!(
                "Peak RAM {:.2} GB exceeds limit of {} GB.",
                report.peak_ram_gb, auditor.max_ram_gb
            );
            warn!("Edge constraint violation: {}", message);
            return Err(Error::EdgeConstraintViolation(message));
        }

        info!(
            "Audit: latency={:.3}s ram={:.2}GB flops={:.2}G",
            report.latency_sec, report.peak_ram_gb, report.flops_g
        );

        if report.latency_sec > auditor.max_latency_sec {
            warn!(
                "Latency ({:.2}s) exceeded threshold ({}s)",
                report.latency_sec, auditor.max_latency_sec
            );
        }

        outcome.map(|mut decision| {
            decision.attach_usage(report.usage_stats(auditor.max_latency_sec));
            decision
        })
    }
}

impl Drop for AuditGuard<'_> {
    fn drop(&mut self) {
        if !self.finalized {
            let report = self.measure();
            warn!(
                "Audit window closed without finalize: latency={:.3}s ram={:.2}GB",
                report.latency_sec, report.peak_ram_gb
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auramed_core::{Disposition, FixedMemory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn auditor(ram_gb: f64) -> ResourceAuditor {
        ResourceAuditor::with_probe(&EdgeConfig::default(), Arc::new(FixedMemory::from_gb(ram_gb)))
    }

    fn decision() -> TriageDecision {
        TriageDecision::new(Disposition::Normal, 0.9, "clear")
    }

    #[test]
    fn test_stats_attached_on_success() {
        let result = auditor(1.0).run(|| Ok(decision())).unwrap();
        let stats = result.usage_stats.unwrap();
        for key in [STAT_LATENCY_SEC, STAT_RAM_GB, STAT_FLOPS_G, STAT_MAX_ALLOWED_SEC] {
            assert!(stats.contains_key(key), "missing {}", key);
        }
        assert_eq!(stats.ram_gb(), Some(1.0));
        assert_eq!(stats.get(STAT_MAX_ALLOWED_SEC), Some(10.0));
    }

    #[test]
    fn test_stats_merge_with_existing() {
        let result = auditor(1.0)
            .run(|| {
                let mut d = decision();
                let mut stats = UsageStats::new();
                stats.insert("segments", 5.0);
                d.attach_usage(stats);
                Ok(d)
            })
            .unwrap();
        let stats = result.usage_stats.unwrap();
        assert_eq!(stats.get("segments"), Some(5.0));
        assert!(stats.contains_key(STAT_LATENCY_SEC));
    }

    #[test]
    fn test_memory_ceiling_replaces_success() {
        let err = auditor(4.5).run(|| Ok(decision())).unwrap_err();
        assert!(matches!(err, Error::EdgeConstraintViolation(_)));
    }

    #[test]
    fn test_memory_ceiling_replaces_error() {
        let err = auditor(5.0)
            .run(|| Err(Error::InvalidInput("bad".into())))
            .unwrap_err();
        assert!(matches!(err, Error::EdgeConstraintViolation(_)));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = auditor(1.0)
            .run(|| Err(Error::NotFound("cough.wav".into())))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_ceiling_is_strict() {
        assert!(auditor(4.0).run(|| Ok(decision())).is_ok());
    }

    #[test]
    fn test_flops_proportional_to_latency() {
        let report = AuditReport {
            latency_sec: 2.0,
            peak_ram_gb: 1.234,
            flops_g: 2.0 * FLOPS_G_PER_SEC,
        };
        let stats = report.usage_stats(10.0);
        assert_eq!(stats.get(STAT_FLOPS_G), Some(1.0));
        assert_eq!(stats.get(STAT_RAM_GB), Some(1.23));
    }

    /// Counts samples so window closing can be observed.
    struct CountingProbe(AtomicUsize);

    impl MemoryProbe for CountingProbe {
        fn resident_bytes(&self) -> u64 {
            self.0.fetch_add(1, Ordering::SeqCst);
            1024
        }
    }

    fn counting() -> (Arc<CountingProbe>, ResourceAuditor) {
        let probe = Arc::new(CountingProbe(AtomicUsize::new(0)));
        let auditor = ResourceAuditor::with_probe(&EdgeConfig::default(), probe.clone());
        (probe, auditor)
    }

    #[test]
    fn test_guard_dropped_without_finalize_still_measures() {
        let (probe, auditor) = counting();
        let guard = auditor.begin();
        assert_eq!(probe.0.load(Ordering::SeqCst), 1);
        drop(guard);
        assert_eq!(probe.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_finalized_guard_measures_once() {
        let (probe, auditor) = counting();
        let guard = auditor.begin();
        assert!(guard.finalize(Ok(decision())).is_ok());
        // entry sample plus the finalize sample; Drop adds nothing
        assert_eq!(probe.0.load(Ordering::SeqCst), 2);
    }
}
