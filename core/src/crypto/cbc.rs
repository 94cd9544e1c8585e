//! crypto/cbc.rs
//! CBC chaining over the block cipher core.
//!
//! Ciphertext is read as big-endian words, decrypted, XORed with the
//! running chain value and written back big-endian. The chain value for
//! the next block is always the current block's ciphertext words.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::{BLOCK_LEN, BLOCK_WORDS};
use crate::crypto::block::{decrypt_block, expand_key, KeySchedule};
use crate::crypto::types::{check_ciphertext_len, Iv, Key128};
use crate::types::DecryptError;

/// Rolling CBC chain value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainState([u32; BLOCK_WORDS]);

impl ChainState {
    pub fn words(&self) -> [u32; BLOCK_WORDS] {
        self.0
    }
}

impl From<Iv> for ChainState {
    fn from(iv: Iv) -> Self {
        Self(iv.words())
    }
}

/// Decrypt whole blocks from `ciphertext` into `out`, starting from `chain`.
///
/// Both slices must have the same block-aligned length. Returns the chain
/// value for the block that follows.
pub fn decrypt_blocks(
    schedule: &KeySchedule,
    ciphertext: &[u8],
    chain: ChainState,
    out: &mut [u8],
) -> Result<ChainState, DecryptError> {
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(DecryptError::InvalidLength { len: ciphertext.len() });
    }
    if out.len() != ciphertext.len() {
        return Err(DecryptError::BufferMismatch {
            input: ciphertext.len(),
            output: out.len(),
        });
    }

    let mut init = chain.0;
    let mut encrypted = [0u32; BLOCK_WORDS];
    let mut decrypted = [0u32; BLOCK_WORDS];

    for (src, dst) in ciphertext.chunks_exact(BLOCK_LEN).zip(out.chunks_exact_mut(BLOCK_LEN)) {
        BigEndian::read_u32_into(src, &mut encrypted);

        let block = decrypt_block(schedule, encrypted);
        for i in 0..BLOCK_WORDS {
            decrypted[i] = block[i] ^ init[i];
        }
        BigEndian::write_u32_into(&decrypted, dst);

        init = encrypted;
    }

    Ok(ChainState(init))
}

/// Decrypt a full ciphertext in one pass. Padding is left in place.
pub fn decrypt(ciphertext: &[u8], key: &Key128, iv: &Iv) -> Result<Vec<u8>, DecryptError> {
    check_ciphertext_len(ciphertext.len())?;
    let schedule = expand_key(key);
    let mut out = vec![0u8; ciphertext.len()];
    decrypt_blocks(&schedule, ciphertext, ChainState::from(*iv), &mut out)?;
    Ok(out)
}
