//! scheduler/stream.rs
//! Cooperative job queue standing in for a host event loop.
//!
//! - One job runs per tick, in FIFO order, on whichever thread drives the stream.
//! - Jobs and worker threads schedule follow-up work through a `StreamHandle`.
//! - A `Deferred` reserves a slot for a completion that arrives later from
//!   another thread; the stream is not idle while one is outstanding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};

use crate::constants::DEFAULT_TICK_DELAY_MS;

/// A unit of work executed in one tick.
pub type Job = Box<dyn FnOnce(&StreamHandle) + Send + 'static>;

/// Cloneable, thread-safe scheduling handle.
#[derive(Clone)]
pub struct StreamHandle {
    tx: Sender<Job>,
    // Jobs queued or running, plus unresolved deferrals.
    pending: Arc<AtomicUsize>,
}

impl StreamHandle {
    /// Queue `job` for a later tick.
    pub fn push<F>(&self, job: F)
    where
        F: FnOnce(&StreamHandle) + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(Box::new(job)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!("[STREAM] push after stream shutdown, job dropped");
        }
    }

    /// Reserve a completion that will be queued later, possibly from another thread.
    pub fn defer(&self) -> Deferred {
        self.pending.fetch_add(1, Ordering::SeqCst);
        Deferred {
            tx: self.tx.clone(),
            pending: Arc::clone(&self.pending),
            resolved: false,
        }
    }

    /// Jobs queued or in flight, including unresolved deferrals.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Single-shot promise: resolving queues its continuation on the stream.
pub struct Deferred {
    tx: Sender<Job>,
    pending: Arc<AtomicUsize>,
    resolved: bool,
}

impl Deferred {
    pub fn resolve<F>(mut self, job: F)
    where
        F: FnOnce(&StreamHandle) + Send + 'static,
    {
        self.resolved = true;
        // The reservation taken in `defer` now accounts for the queued job.
        if self.tx.send(Box::new(job)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!("[STREAM] deferred resolved after stream shutdown");
        }
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        if !self.resolved {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// The host side of the queue: owns the receiver and drives ticks.
pub struct AsyncStream {
    handle: StreamHandle,
    rx: Receiver<Job>,
    delay: Duration,
}

impl Default for AsyncStream {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncStream {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(DEFAULT_TICK_DELAY_MS))
    }

    pub fn with_delay(delay: Duration) -> Self {
        let (tx, rx) = unbounded::<Job>();
        Self {
            handle: StreamHandle {
                tx,
                pending: Arc::new(AtomicUsize::new(0)),
            },
            rx,
            delay,
        }
    }

    pub fn handle(&self) -> StreamHandle {
        self.handle.clone()
    }

    pub fn push<F>(&self, job: F)
    where
        F: FnOnce(&StreamHandle) + Send + 'static,
    {
        self.handle.push(job);
    }

    pub fn pending(&self) -> usize {
        self.handle.pending()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Run exactly one ready job. Returns `false` when none was queued.
    pub fn tick(&self) -> bool {
        match self.rx.try_recv() {
            Ok(job) => {
                self.run(job);
                true
            }
            Err(_) => false,
        }
    }

    /// Run up to `n` ready jobs, returning how many ran.
    pub fn tick_n(&self, n: usize) -> usize {
        (0..n).take_while(|_| self.tick()).count()
    }

    /// Block until a job is ready (or `timeout` passes) and run it.
    pub fn tick_blocking(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                self.run(job);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Drive ticks, sleeping `delay` between them, until nothing is pending.
    /// Returns the number of ticks executed.
    pub fn run_until_idle(&self) -> usize {
        let wait = self.delay.max(Duration::from_millis(1));
        let mut ticks = 0;
        while !self.is_idle() {
            if self.tick_blocking(wait) {
                ticks += 1;
                if !self.delay.is_zero() {
                    thread::sleep(self.delay);
                }
            }
        }
        debug!("[STREAM] idle after {} ticks", ticks);
        ticks
    }

    fn run(&self, job: Job) {
        job(&self.handle);
        self.handle.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn tick_without_jobs_is_noop() {
        let stream = AsyncStream::new();
        assert!(!stream.tick());
        assert!(stream.is_idle());
    }

    #[test]
    fn deferred_keeps_stream_busy_until_resolved() {
        let stream = AsyncStream::with_delay(Duration::ZERO);
        let deferred = stream.handle().defer();
        assert_eq!(stream.pending(), 1);
        assert!(!stream.tick());

        let hit = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&hit);
        deferred.resolve(move |_| *flag.lock().unwrap() = true);

        assert!(stream.tick());
        assert!(*hit.lock().unwrap());
        assert!(stream.is_idle());
    }

    #[test]
    fn dropped_deferred_releases_reservation() {
        let stream = AsyncStream::new();
        drop(stream.handle().defer());
        assert!(stream.is_idle());
    }

    #[test]
    fn run_until_idle_waits_for_worker_thread() {
        let stream = AsyncStream::with_delay(Duration::ZERO);
        let deferred = stream.handle().defer();
        let out = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&out);

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            deferred.resolve(move |h| {
                sink.lock().unwrap().push(1);
                let sink = Arc::clone(&sink);
                h.push(move |_| sink.lock().unwrap().push(2));
            });
        });

        assert_eq!(stream.run_until_idle(), 2);
        assert_eq!(*out.lock().unwrap(), vec![1, 2]);
    }
}
