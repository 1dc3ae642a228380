//! Process memory probing for edge budget enforcement.

use serde::Serialize;

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Source of resident-memory readings.
///
/// The auditor samples through this trait so memory ceilings can be
/// exercised deterministically.
pub trait MemoryProbe: Send + Sync {
    /// Current resident set size of the process in bytes.
    fn resident_bytes(&self) -> u64;

    /// Current resident set size in GB.
    fn resident_gb(&self) -> f64 {
        self.resident_bytes() as f64 / BYTES_PER_GB
    }
}

/// Reads the resident set size of the current process from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessMemory;

impl MemoryProbe for ProcessMemory {
    fn resident_bytes(&self) -> u64 {
        Self::get_resident_bytes()
    }
}

impl ProcessMemory {
    fn get_resident_bytes() -> u64 {
        #[cfg(target_os = "linux")]
        {
            use std::fs;
            if let Ok(status) = fs::read_to_string("/proc/self/status") {
                for line in status.lines() {
                    if line.starts_with("VmRSS:") {
                        if let Some(kb_str) = line.split_whitespace().nth(1) {
                            if let Ok(kb) = kb_str.parse::<u64>() {
                                return kb * 1024;
                            }
                        }
                    }
                }
            }
            0
        }
        #[cfg(target_os = "macos")]
        {
            use std::process::Command;
            let pid = std::process::id().to_string();
            if let Ok(output) = Command::new("ps").args(["-o", "rss=", "-p", &pid]).output() {
                if let Ok(s) = String::from_utf8(output.stdout) {
                    if let Ok(kb) = s.trim().parse::<u64>() {
                        return kb * 1024;
                    }
                }
            }
            0
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            0
        }
    }
}

/// Fixed reading, for simulations and tests.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FixedMemory(pub u64);

impl FixedMemory {
    pub fn from_gb(gb: f64) -> Self {
        Self((gb * BYTES_PER_GB) as u64)
    }
}

impl MemoryProbe for FixedMemory {
    fn resident_bytes(&self) -> u64 {
        self.0
    }
}
