use serde::{Deserialize, Serialize};

use crate::constants::{BLOCK_WORDS, DEFAULT_CHUNK_WORDS, MAX_CHUNK_WORDS};
use crate::types::DecryptError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecrypterConfig {
    /// Words of ciphertext decrypted per scheduler tick.
    /// - `None` → `DEFAULT_CHUNK_WORDS` (8000 words, 32000 bytes).
    /// - Must be a positive multiple of 4 (whole blocks).
    #[serde(default)]
    pub chunk_words: Option<usize>,

    /// Whether to try the platform cipher before the software path.
    /// - `None` or `Some(true)` → accelerated first (production default).
    /// - `Some(false)` → always run the chunked software path.
    #[serde(default)]
    pub prefer_accelerated: Option<bool>,
}

impl Default for DecrypterConfig {
    fn default() -> Self {
        Self {
            chunk_words: Some(DEFAULT_CHUNK_WORDS),
            prefer_accelerated: Some(true),
        }
    }
}

impl DecrypterConfig {
    pub fn new(chunk_words: Option<usize>, prefer_accelerated: Option<bool>) -> Self {
        Self {
            chunk_words: chunk_words.or(Some(DEFAULT_CHUNK_WORDS)),
            prefer_accelerated: prefer_accelerated.or(Some(true)),
        }
    }

    pub fn software_only() -> Self {
        Self { chunk_words: Some(DEFAULT_CHUNK_WORDS), prefer_accelerated: Some(false) }
    }

    pub fn from_json(json: &str) -> Result<Self, DecryptError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DecryptError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn chunk_words(&self) -> usize {
        self.chunk_words.unwrap_or(DEFAULT_CHUNK_WORDS)
    }

    pub fn prefer_accelerated(&self) -> bool {
        self.prefer_accelerated.unwrap_or(true)
    }

    pub fn validate(&self) -> Result<(), DecryptError> {
        validate_chunk_words(self.chunk_words())
    }
}

pub fn validate_chunk_words(words: usize) -> Result<(), DecryptError> {
    if words == 0 || words % BLOCK_WORDS != 0 {
        return Err(DecryptError::InvalidConfig(format!(
            "chunk_words must be a positive multiple of {BLOCK_WORDS}, got {words}"
        )));
    }
    if words > MAX_CHUNK_WORDS {
        return Err(DecryptError::InvalidConfig(format!(
            "chunk_words {words} exceeds maximum {MAX_CHUNK_WORDS}"
        )));
    }
    Ok(())
}
