//! dispatch/core.rs
//! Public entry point: strategy selection with fallback on failure.

use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use log::debug;

use crate::config::DecrypterConfig;
use crate::dispatch::platform::{HardwareCbc, NoAcceleration, PlatformCipher};
use crate::dispatch::strategy::{AcceleratedDecryptor, Decryptor, PlatformWorker, SoftwareDecryptor};
use crate::scheduler::chunked::fail_later;
use crate::scheduler::stream::StreamHandle;
use crate::scheduler::task::{DecryptHandle, DecryptRequest};
use crate::telemetry::{Stage, TelemetryCounters, TelemetryTimer};
use crate::types::{DecryptError, DecryptResult};

pub struct Dispatcher {
    platform: Arc<dyn PlatformCipher>,
    config: DecrypterConfig,
    software: Arc<SoftwareDecryptor>,
    // Started on the first accelerated call.
    worker: OnceLock<Arc<PlatformWorker>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        let config = DecrypterConfig::default();
        Self {
            platform: Arc::new(HardwareCbc),
            software: Arc::new(SoftwareDecryptor { chunk_words: config.chunk_words() }),
            config,
            worker: OnceLock::new(),
        }
    }
}

impl Dispatcher {
    /// Hardware AES when the CPU offers it, software otherwise.
    pub fn new(config: DecrypterConfig) -> Result<Self, DecryptError> {
        Self::with_platform(Arc::new(HardwareCbc), config)
    }

    pub fn with_platform(
        platform: Arc<dyn PlatformCipher>,
        config: DecrypterConfig,
    ) -> Result<Self, DecryptError> {
        config.validate()?;
        let software = Arc::new(SoftwareDecryptor { chunk_words: config.chunk_words() });
        Ok(Self { platform, config, software, worker: OnceLock::new() })
    }

    pub fn software_only(config: DecrypterConfig) -> Result<Self, DecryptError> {
        Self::with_platform(Arc::new(NoAcceleration), config)
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform.name()
    }

    /// Decrypt `ciphertext`, invoking `on_done` exactly once from a later
    /// tick of `stream`, whichever path runs.
    pub fn decrypt<F>(
        &self,
        stream: &StreamHandle,
        ciphertext: impl Into<Bytes>,
        key: &[u8],
        iv: &[u32],
        on_done: F,
    ) -> DecryptHandle
    where
        F: FnOnce(DecryptResult) + Send + 'static,
    {
        let handle = DecryptHandle::new();
        let completion = handle.completion(Box::new(on_done));
        let mut timer = TelemetryTimer::new();

        let request = match timer.time(Stage::Validate, || DecryptRequest::new(ciphertext, key, iv)) {
            Ok(request) => request,
            Err(e) => {
                fail_later(stream, completion, timer, e);
                return handle;
            }
        };

        let strategy = self.select();
        debug!(
            "[DISPATCH] {} bytes via {} path (platform: {})",
            request.ciphertext.len(),
            strategy.path(),
            self.platform.name()
        );
        strategy.decrypt(stream, request, completion, TelemetryCounters::default(), timer);
        handle
    }

    fn select(&self) -> Arc<dyn Decryptor> {
        if self.config.prefer_accelerated() && self.platform.is_available() {
            let worker = self
                .worker
                .get_or_init(|| Arc::new(PlatformWorker::spawn(self.platform.name())));
            Arc::new(AcceleratedDecryptor {
                platform: Arc::clone(&self.platform),
                worker: Arc::clone(worker),
                fallback: self.software.clone(),
            })
        } else {
            self.software.clone()
        }
    }
}

static DEFAULT_DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

/// Decrypt with the process-wide default dispatcher (hardware if present,
/// 8000-word chunks).
pub fn decrypt<F>(
    stream: &StreamHandle,
    ciphertext: impl Into<Bytes>,
    key: &[u8],
    iv: &[u32],
    on_done: F,
) -> DecryptHandle
where
    F: FnOnce(DecryptResult) + Send + 'static,
{
    DEFAULT_DISPATCHER
        .get_or_init(Dispatcher::default)
        .decrypt(stream, ciphertext, key, iv, on_done)
}
