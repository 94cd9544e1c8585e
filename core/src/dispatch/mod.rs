//! Accelerated-first dispatch with transparent software fallback.
//!
//! The caller sees one contract: inputs in, `Result<Vec<u8>, DecryptError>`
//! delivered once on the host stream. Platform failures stay internal.

pub mod platform;
pub mod core;
pub(crate) mod strategy;

pub use platform::{HardwareCbc, NoAcceleration, PlatformCipher, PlatformError};
pub use self::core::{decrypt, Dispatcher};
