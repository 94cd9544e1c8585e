//! decrypter-core
//!
//! AES-128-CBC decryption with PKCS#7 unpadding behind one callback
//! contract, using a platform cipher when present and a chunked,
//! cooperatively scheduled software cipher otherwise.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod material;

pub mod crypto;
pub mod telemetry;

// Execution layers
pub mod scheduler;
pub mod dispatch;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::DecrypterConfig;
    pub use crate::crypto::{Iv, Key128};
    pub use crate::dispatch::{decrypt, Dispatcher, PlatformCipher, PlatformError};
    pub use crate::scheduler::{AsyncStream, DecryptHandle, Decrypter, StreamHandle};
    pub use crate::telemetry::{DecryptPath, TelemetrySnapshot};
    pub use crate::types::{DecryptError, DecryptResult};
}
