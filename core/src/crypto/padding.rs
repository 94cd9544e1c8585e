//! crypto/padding.rs
//! Strict PKCS#7 unpadding for a 16-byte block cipher.

use crate::constants::BLOCK_LEN;
use crate::types::DecryptError;

/// Length of the unpadded message inside `padded`.
///
/// The final byte `N` must be in `1..=16`, no larger than the buffer, and
/// the last `N` bytes must all equal `N`.
pub fn unpadded_len(padded: &[u8]) -> Result<usize, DecryptError> {
    let value = *padded.last().ok_or(DecryptError::InvalidLength { len: 0 })?;
    let n = value as usize;

    if n == 0 || n > BLOCK_LEN || n > padded.len() {
        return Err(DecryptError::InvalidPadding { value });
    }
    if padded[padded.len() - n..].iter().any(|&b| b != value) {
        return Err(DecryptError::InvalidPadding { value });
    }

    Ok(padded.len() - n)
}

/// Borrow the message without its padding.
pub fn unpad(padded: &[u8]) -> Result<&[u8], DecryptError> {
    let len = unpadded_len(padded)?;
    Ok(&padded[..len])
}

/// Owned variant: truncates the buffer it was given.
pub fn unpad_vec(mut padded: Vec<u8>) -> Result<Vec<u8>, DecryptError> {
    let len = unpadded_len(&padded)?;
    padded.truncate(len);
    Ok(padded)
}
