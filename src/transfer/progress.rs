//! Transfer progress tracking

use std::fmt;
use std::time::{Duration, Instant};

/// Bytes between two progress reports
pub const REPORT_INTERVAL: u64 = 1024 * 1024;

/// Running byte count and throughput of one data transfer
#[derive(Debug, Clone)]
pub struct TransferProgress {
    bytes: u64,
    started: Instant,
    next_report: u64,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self {
            bytes: 0,
            started: Instant::now(),
            next_report: REPORT_INTERVAL,
        }
    }

    /// Count `bytes` more, returning true when another report is due
    pub fn record(&mut self, bytes: u64) -> bool {
        self.bytes += bytes;
        if self.bytes < self.next_report {
            return false;
        }
        while self.next_report <= self.bytes {
            self.next_report += REPORT_INTERVAL;
        }
        true
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Average rate in bytes per second since the transfer started
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {:.1}s ({}/s)",
            human_bytes(self.bytes),
            self.elapsed().as_secs_f64(),
            human_bytes(self.rate() as u64)
        )
    }
}

/// Render a byte count with a binary unit, e.g. `1.5 KiB`
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
