//! dispatch/strategy.rs
//! The two interchangeable decryption strategies.
//!
//! Both take a validated request and resolve the task's `Completion`
//! exactly once on the host stream. The accelerated strategy completes
//! after a single deferred resolution; the software strategy after one
//! tick per chunk.
//!
//! Platform calls run on one `PlatformWorker` thread per dispatcher, fed
//! through a crossbeam channel in submission order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam::channel::{unbounded, Sender};
use log::{debug, warn};

use crate::scheduler::chunked;
use crate::scheduler::stream::StreamHandle;
use crate::scheduler::task::{Completion, DecryptRequest};
use crate::dispatch::platform::{PlatformCipher, PlatformError};
use crate::telemetry::{DecryptPath, Stage, TelemetryCounters, TelemetryTimer};
use crate::types::DecryptError;

pub(crate) trait Decryptor: Send + Sync {
    fn path(&self) -> DecryptPath;

    fn decrypt(
        &self,
        stream: &StreamHandle,
        request: DecryptRequest,
        completion: Completion,
        counters: TelemetryCounters,
        timer: TelemetryTimer,
    );
}

/// Block cipher core + CBC chainer + unpadding, via the chunked scheduler.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SoftwareDecryptor {
    pub chunk_words: usize,
}

impl Decryptor for SoftwareDecryptor {
    fn path(&self) -> DecryptPath {
        DecryptPath::Software
    }

    fn decrypt(
        &self,
        stream: &StreamHandle,
        request: DecryptRequest,
        completion: Completion,
        counters: TelemetryCounters,
        timer: TelemetryTimer,
    ) {
        chunked::start(stream, request, self.chunk_words, completion, counters, timer);
    }
}

type PlatformJob = Box<dyn FnOnce() + Send + 'static>;

/// Long-lived thread running platform calls. Exits once every sender is gone.
pub(crate) struct PlatformWorker {
    tx: Sender<PlatformJob>,
}

impl PlatformWorker {
    pub fn spawn(name: &'static str) -> Self {
        let (tx, rx) = unbounded::<PlatformJob>();
        thread::spawn(move || {
            debug!("[PLATFORM] {} worker started", name);
            while let Ok(job) = rx.recv() {
                job();
            }
            debug!("[PLATFORM] {} worker stopped", name);
        });
        Self { tx }
    }

    /// Queue `job`; runs it on the calling thread if the worker is gone.
    pub fn submit(&self, job: PlatformJob) {
        if let Err(e) = self.tx.send(job) {
            warn!("[PLATFORM] worker unavailable, running inline");
            (e.into_inner())();
        }
    }
}

/// Platform primitive on the shared worker; any failure hands the same
/// request to `fallback`.
pub(crate) struct AcceleratedDecryptor {
    pub platform: Arc<dyn PlatformCipher>,
    pub worker: Arc<PlatformWorker>,
    pub fallback: Arc<dyn Decryptor>,
}

impl Decryptor for AcceleratedDecryptor {
    fn path(&self) -> DecryptPath {
        DecryptPath::Accelerated
    }

    fn decrypt(
        &self,
        stream: &StreamHandle,
        request: DecryptRequest,
        completion: Completion,
        counters: TelemetryCounters,
        timer: TelemetryTimer,
    ) {
        let deferred = stream.defer();
        let platform = Arc::clone(&self.platform);
        let fallback = Arc::clone(&self.fallback);

        self.worker.submit(Box::new(move || {
            let mut counters = counters;
            let mut timer = timer;
            let t = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                platform.decrypt_cbc(&request.key, &request.iv, &request.ciphertext)
            }))
            .unwrap_or(Err(PlatformError::Panicked));
            timer.add_stage_time(Stage::Platform, t.elapsed());

            match outcome {
                Ok(plaintext) => {
                    debug!("[PLATFORM] {} decrypted {} bytes", platform.name(), request.ciphertext.len());
                    deferred.resolve(move |_| {
                        if completion.handle().is_cancelled() {
                            completion.complete(DecryptPath::Accelerated, &counters, timer, Err(DecryptError::Cancelled));
                            return;
                        }
                        counters.add_chunk(request.ciphertext.len());
                        counters.add_output(request.ciphertext.len(), plaintext.len());
                        completion.complete(DecryptPath::Accelerated, &counters, timer, Ok(plaintext));
                    });
                }
                Err(e) => {
                    warn!("[PLATFORM] {} failed ({}), falling back to {}", platform.name(), e, fallback.path());
                    counters.add_fallback();
                    deferred.resolve(move |s| {
                        fallback.decrypt(s, request, completion, counters, timer);
                    });
                }
            }
        }));
    }
}
