//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for one decryption.
//!
//! Counters are mutated only by the task that owns them and converted into a
//! `TelemetrySnapshot` when the task completes.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
