//! dispatch/platform.rs
//! Injected platform cipher capability.
//!
//! The dispatcher only ever talks to a `PlatformCipher`; nothing global is
//! installed or patched. Availability is asked on every call.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use thiserror::Error;

use crate::crypto::{Iv, Key128};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Runtime AES instruction probe.
fn cpu_has_aes() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        std::is_x86_feature_detected!("aes")
    }
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("aes")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}

/// Accelerated-path failure. Always recovered by falling back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("platform cipher unavailable")]
    Unavailable,

    #[error("platform cipher rejected input: {0}")]
    Rejected(String),

    #[error("platform cipher panicked")]
    Panicked,
}

/// Capability descriptor for an AES-128-CBC primitive.
pub trait PlatformCipher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checked per call; must not report a primitive it cannot run.
    fn is_available(&self) -> bool;

    /// Decrypt and strip PKCS#7 padding in one step.
    fn decrypt_cbc(&self, key: &Key128, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>, PlatformError>;
}

/// RustCrypto `cbc` over `aes`, offered only when the CPU reports AES instructions.
#[derive(Debug, Default, Clone, Copy)]
pub struct HardwareCbc;

impl PlatformCipher for HardwareCbc {
    fn name(&self) -> &'static str {
        "aes-cbc (hardware)"
    }

    fn is_available(&self) -> bool {
        cpu_has_aes()
    }

    fn decrypt_cbc(&self, key: &Key128, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>, PlatformError> {
        if !self.is_available() {
            return Err(PlatformError::Unavailable);
        }

        let iv_bytes = iv.to_be_bytes();
        let cipher = Aes128CbcDec::new(key.as_bytes().into(), (&iv_bytes).into());
        let mut buf = ciphertext.to_vec();
        let len = cipher
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map_err(|e| PlatformError::Rejected(e.to_string()))?
            .len();
        buf.truncate(len);
        Ok(buf)
    }
}

/// A host without any accelerated primitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAcceleration;

impl PlatformCipher for NoAcceleration {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn decrypt_cbc(&self, _key: &Key128, _iv: &Iv, _ciphertext: &[u8]) -> Result<Vec<u8>, PlatformError> {
        Err(PlatformError::Unavailable)
    }
}
