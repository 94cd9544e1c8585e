use thiserror::Error;

/// Unified decryption error surfaced through the completion callback.
/// - Accelerated-path failures never appear here; they are absorbed by the fallback.
/// - Messages aim to be stable and contextual for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptError {
    /// Ciphertext is empty or not a multiple of the 16-byte block size.
    #[error("invalid ciphertext length: {len} bytes is not a positive multiple of 16")]
    InvalidLength { len: usize },

    /// Final block does not carry well-formed PKCS#7 padding.
    #[error("invalid PKCS#7 padding: trailing byte 0x{value:02x}")]
    InvalidPadding { value: u8 },

    /// Key or IV of the wrong size.
    #[error("invalid {what}: expected={expected}, actual={actual}")]
    InvalidKeyMaterial {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Malformed key/IV text (hex parsing at the interface boundary).
    #[error("invalid {what} encoding: {reason}")]
    InvalidEncoding { what: &'static str, reason: String },

    /// Output buffer length differs from the ciphertext it receives.
    #[error("output buffer of {output} bytes does not match {input} bytes of ciphertext")]
    BufferMismatch { input: usize, output: usize },

    /// Rejected engine configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The task was cancelled between ticks.
    #[error("decryption cancelled")]
    Cancelled,
}

/// Result delivered exactly once to the caller.
pub type DecryptResult = Result<Vec<u8>, DecryptError>;

/// Completion callback: the `(error, plaintext)` contract.
pub type DoneCallback = Box<dyn FnOnce(DecryptResult) + Send + 'static>;
