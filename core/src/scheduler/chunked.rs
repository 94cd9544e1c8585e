//! scheduler/chunked.rs
//! Software decryption split into one chunk per stream tick.
//!
//! - Chunk 0 is seeded with the IV; chunk k with the last ciphertext
//!   block of chunk k-1. Output is identical for any chunk size.
//! - Chunks run strictly in order: each tick queues the next.
//! - The tick that decrypts the last chunk also unpads and completes.

use std::time::Instant;

use bytes::Bytes;
use log::debug;

use crate::config::validate_chunk_words;
use crate::constants::DEFAULT_CHUNK_WORDS;
use crate::crypto::{decrypt_blocks, expand_key, unpad_vec, ChainState, KeySchedule};
use crate::scheduler::stream::StreamHandle;
use crate::scheduler::task::{Completion, DecryptHandle, DecryptRequest};
use crate::telemetry::{DecryptPath, Stage, TelemetryCounters, TelemetryTimer};
use crate::types::{DecryptError, DecryptResult};

/// Always-software decrypter, started on construction.
pub struct Decrypter {
    handle: DecryptHandle,
}

impl Decrypter {
    /// Default step, in 32-bit words.
    pub const STEP: usize = DEFAULT_CHUNK_WORDS;

    pub fn new<F>(
        stream: &StreamHandle,
        ciphertext: impl Into<Bytes>,
        key: &[u8],
        iv: &[u32],
        done: F,
    ) -> Self
    where
        F: FnOnce(DecryptResult) + Send + 'static,
    {
        Self::with_chunk_words(stream, ciphertext, key, iv, Self::STEP, done)
    }

    pub fn with_chunk_words<F>(
        stream: &StreamHandle,
        ciphertext: impl Into<Bytes>,
        key: &[u8],
        iv: &[u32],
        chunk_words: usize,
        done: F,
    ) -> Self
    where
        F: FnOnce(DecryptResult) + Send + 'static,
    {
        let handle = DecryptHandle::new();
        let completion = handle.completion(Box::new(done));
        let mut timer = TelemetryTimer::new();

        let request = timer.time(Stage::Validate, || {
            validate_chunk_words(chunk_words)?;
            DecryptRequest::new(ciphertext, key, iv)
        });

        match request {
            Ok(request) => start(
                stream,
                request,
                chunk_words,
                completion,
                TelemetryCounters::default(),
                timer,
            ),
            Err(e) => fail_later(stream, completion, timer, e),
        }

        Self { handle }
    }

    pub fn handle(&self) -> &DecryptHandle {
        &self.handle
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Deliver a validation error on the next tick, so completion stays asynchronous.
pub(crate) fn fail_later(
    stream: &StreamHandle,
    completion: Completion,
    timer: TelemetryTimer,
    error: DecryptError,
) {
    debug!("[DECRYPTER] rejecting input: {}", error);
    stream.push(move |_| {
        completion.complete(DecryptPath::Software, &TelemetryCounters::default(), timer, Err(error));
    });
}

/// Queue the first chunk of a validated request.
pub(crate) fn start(
    stream: &StreamHandle,
    request: DecryptRequest,
    chunk_words: usize,
    completion: Completion,
    counters: TelemetryCounters,
    mut timer: TelemetryTimer,
) {
    let schedule = timer.time(Stage::KeyExpansion, || expand_key(&request.key));
    let len = request.ciphertext.len();
    let chunk_len = chunk_words * 4;
    debug!(
        "[DECRYPTER] scheduling {} bytes in {} chunk(s) of {} bytes",
        len,
        len.div_ceil(chunk_len),
        chunk_len
    );

    let task = ChunkTask {
        chain: ChainState::from(request.iv),
        output: vec![0u8; len],
        request,
        schedule,
        offset: 0,
        chunk_len,
        completion,
        counters,
        timer,
    };
    stream.push(move |s| task.step(s));
}

struct ChunkTask {
    request: DecryptRequest,
    schedule: KeySchedule,
    chain: ChainState,
    output: Vec<u8>,
    offset: usize,
    chunk_len: usize,
    completion: Completion,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl ChunkTask {
    fn step(mut self, stream: &StreamHandle) {
        if self.completion.handle().is_cancelled() {
            debug!("[DECRYPTER] cancelled at offset {}", self.offset);
            let Self { completion, counters, timer, .. } = self;
            completion.complete(DecryptPath::Software, &counters, timer, Err(DecryptError::Cancelled));
            return;
        }

        let total = self.request.ciphertext.len();
        let start = self.offset;
        let end = (start + self.chunk_len).min(total);

        let t = Instant::now();
        let chained = decrypt_blocks(
            &self.schedule,
            &self.request.ciphertext[start..end],
            self.chain,
            &mut self.output[start..end],
        );
        self.timer.add_stage_time(Stage::Decrypt, t.elapsed());
        self.chain = match chained {
            Ok(chain) => chain,
            Err(e) => {
                let Self { completion, counters, timer, .. } = self;
                completion.complete(DecryptPath::Software, &counters, timer, Err(e));
                return;
            }
        };
        self.counters.add_chunk(end - start);

        debug!(
            "[DECRYPTER] chunk {} decrypted ({}..{} of {})",
            self.counters.chunks - 1,
            start,
            end,
            total
        );

        self.offset = end;
        if self.offset < total {
            stream.push(move |s| self.step(s));
        } else {
            self.finish();
        }
    }

    fn finish(self) {
        let Self { output, completion, mut counters, mut timer, .. } = self;
        let padded_len = output.len();

        let result = timer.time(Stage::Unpad, || unpad_vec(output));
        if let Ok(plaintext) = &result {
            counters.add_output(padded_len, plaintext.len());
        }
        completion.complete(DecryptPath::Software, &counters, timer, result);
    }
}
