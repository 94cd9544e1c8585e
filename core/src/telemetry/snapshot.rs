//! telemetry/snapshot.rs
//! Immutable record of a finished decryption.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// Which path produced the plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecryptPath {
    Accelerated,
    Software,
}

impl fmt::Display for DecryptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptPath::Accelerated => f.write_str("accelerated"),
            DecryptPath::Software => f.write_str("software"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub path: DecryptPath,
    pub counters: TelemetryCounters,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(path: DecryptPath, counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_ciphertext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            path,
            counters: counters.clone(),
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Invariants every finished snapshot satisfies.
    pub fn sanity_check(&self) -> bool {
        self.counters.bytes_plaintext + self.counters.bytes_padding <= self.counters.bytes_ciphertext
            && self.stage_times.total() <= self.elapsed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
