use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::constants::{BLOCK_LEN, IV_WORDS, KEY_LEN_16};
use crate::types::DecryptError;

/// AES-128 key material, copied out of the caller's buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Key128([u8; KEY_LEN_16]);

impl Key128 {
    pub fn from_slice(key: &[u8]) -> Result<Self, DecryptError> {
        let bytes: [u8; KEY_LEN_16] = key.try_into().map_err(|_| DecryptError::InvalidKeyMaterial {
            what: "key",
            expected: KEY_LEN_16,
            actual: key.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN_16] {
        &self.0
    }

    /// The key as four big-endian words.
    pub fn words(&self) -> [u32; 4] {
        let mut words = [0u32; 4];
        BigEndian::read_u32_into(&self.0, &mut words);
        words
    }
}

impl From<[u8; KEY_LEN_16]> for Key128 {
    fn from(bytes: [u8; KEY_LEN_16]) -> Self {
        Self(bytes)
    }
}

// Never print key bytes.
impl fmt::Debug for Key128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key128(..)")
    }
}

/// Initialization vector as four host-order words.
///
/// Word `i` holds IV bytes `4i..4i+4` read big-endian, so
/// `Iv::from_be_bytes(b).to_be_bytes() == b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Iv([u32; IV_WORDS]);

impl Iv {
    pub fn from_words(words: &[u32]) -> Result<Self, DecryptError> {
        let words: [u32; IV_WORDS] = words.try_into().map_err(|_| DecryptError::InvalidKeyMaterial {
            what: "iv",
            expected: IV_WORDS,
            actual: words.len(),
        })?;
        Ok(Self(words))
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, DecryptError> {
        if bytes.len() != BLOCK_LEN {
            return Err(DecryptError::InvalidKeyMaterial {
                what: "iv",
                expected: BLOCK_LEN,
                actual: bytes.len(),
            });
        }
        let mut words = [0u32; IV_WORDS];
        BigEndian::read_u32_into(bytes, &mut words);
        Ok(Self(words))
    }

    pub fn words(&self) -> [u32; IV_WORDS] {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; BLOCK_LEN] {
        let mut bytes = [0u8; BLOCK_LEN];
        BigEndian::write_u32_into(&self.0, &mut bytes);
        bytes
    }
}

impl From<[u32; IV_WORDS]> for Iv {
    fn from(words: [u32; IV_WORDS]) -> Self {
        Self(words)
    }
}

/// Reject ciphertext that is empty or not block aligned.
pub fn check_ciphertext_len(len: usize) -> Result<(), DecryptError> {
    if len == 0 || len % BLOCK_LEN != 0 {
        return Err(DecryptError::InvalidLength { len });
    }
    Ok(())
}
