//! telemetry/counters.rs
//! Mutable counters collected while a decryption runs.

use serde::{Deserialize, Serialize};

use crate::constants::BLOCK_LEN;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub chunks: u64,
    pub blocks: u64,
    pub bytes_ciphertext: u64,
    pub bytes_plaintext: u64,
    pub bytes_padding: u64,
    pub fallbacks: u64,
}

impl TelemetryCounters {
    /// Record one scheduler chunk of `ct_len` ciphertext bytes.
    pub fn add_chunk(&mut self, ct_len: usize) {
        self.chunks += 1;
        self.blocks += (ct_len / BLOCK_LEN) as u64;
        self.bytes_ciphertext += ct_len as u64;
    }

    /// Record the final unpadded output.
    pub fn add_output(&mut self, padded_len: usize, plaintext_len: usize) {
        self.bytes_plaintext += plaintext_len as u64;
        self.bytes_padding += padded_len.saturating_sub(plaintext_len) as u64;
    }

    /// Record an accelerated-path failure that was recovered.
    pub fn add_fallback(&mut self) {
        self.fallbacks += 1;
    }
}
