//! scheduler/task.rs
//! Shared per-call task state and the single completion point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::debug;

use crate::crypto::{check_ciphertext_len, Iv, Key128};
use crate::telemetry::{DecryptPath, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{DecryptError, DecryptResult, DoneCallback};

/// Validated inputs for one decryption. The key and IV are copies; the
/// ciphertext is a shared, cheaply cloned view.
#[derive(Clone, Debug)]
pub struct DecryptRequest {
    pub ciphertext: Bytes,
    pub key: Key128,
    pub iv: Iv,
}

impl DecryptRequest {
    pub fn new(ciphertext: impl Into<Bytes>, key: &[u8], iv: &[u32]) -> Result<Self, DecryptError> {
        let ciphertext = ciphertext.into();
        check_ciphertext_len(ciphertext.len())?;
        Ok(Self {
            ciphertext,
            key: Key128::from_slice(key)?,
            iv: Iv::from_words(iv)?,
        })
    }
}

#[derive(Default)]
struct TaskState {
    cancelled: AtomicBool,
    finished: AtomicBool,
    telemetry: Mutex<Option<TelemetrySnapshot>>,
}

/// Caller-side view of one decryption.
#[derive(Clone, Default)]
pub struct DecryptHandle {
    state: Arc<TaskState>,
}

impl DecryptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative cancellation, observed at the next tick boundary.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// True once the completion callback has been invoked.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst)
    }

    /// Snapshot of the finished task, `None` while still running.
    pub fn telemetry(&self) -> Option<TelemetrySnapshot> {
        self.state.telemetry.lock().ok().and_then(|slot| slot.clone())
    }

    pub(crate) fn completion(&self, on_done: DoneCallback) -> Completion {
        Completion {
            handle: self.clone(),
            on_done,
        }
    }
}

/// Owns the callback; consuming it is the only way to deliver a result.
pub(crate) struct Completion {
    handle: DecryptHandle,
    on_done: DoneCallback,
}

impl Completion {
    pub fn handle(&self) -> &DecryptHandle {
        &self.handle
    }

    pub fn complete(
        self,
        path: DecryptPath,
        counters: &TelemetryCounters,
        mut timer: TelemetryTimer,
        result: DecryptResult,
    ) {
        timer.finish();
        let snapshot = TelemetrySnapshot::from(path, counters, &timer);
        debug!(
            "[TASK] {} path finished: ok={} chunks={} bytes={} elapsed={:?}",
            path,
            result.is_ok(),
            counters.chunks,
            counters.bytes_ciphertext,
            snapshot.elapsed
        );

        if let Ok(mut slot) = self.handle.state.telemetry.lock() {
            *slot = Some(snapshot);
        }
        self.handle.state.finished.store(true, Ordering::SeqCst);
        (self.on_done)(result);
    }
}
