//! Key and IV acquisition from hex text, as accepted on the command line.
//!
//! Format: optional `0x`/`0X` prefix, then exactly 32 hex digits.
//! Surrounding whitespace (e.g. a trailing newline from a file) is ignored.

use crate::constants::BLOCK_LEN;
use crate::crypto::{Iv, Key128};
use crate::types::DecryptError;

fn decode_128(what: &'static str, text: &str) -> Result<[u8; BLOCK_LEN], DecryptError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != BLOCK_LEN * 2 {
        return Err(DecryptError::InvalidEncoding {
            what,
            reason: format!("expected 32 hex characters, got {}", digits.len()),
        });
    }

    let mut out = [0u8; BLOCK_LEN];
    hex::decode_to_slice(digits, &mut out).map_err(|e| DecryptError::InvalidEncoding {
        what,
        reason: e.to_string(),
    })?;
    Ok(out)
}

/// 128-bit key from hex.
pub fn parse_key(text: &str) -> Result<Key128, DecryptError> {
    decode_128("key", text).map(Key128::from)
}

/// IV from hex, as four big-endian words.
pub fn parse_iv(text: &str) -> Result<Iv, DecryptError> {
    let bytes = decode_128("iv", text)?;
    Iv::from_be_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_iv_into_words() {
        let iv = parse_iv("0x00000001000000020000000300000004\n").unwrap();
        assert_eq!(iv.words(), [1, 2, 3, 4]);
    }

    #[test]
    fn parses_key_bytes_in_order() {
        let key = parse_key("000102030405060708090a0b0c0d0e0f").unwrap();
        assert_eq!(key.as_bytes()[0], 0x00);
        assert_eq!(key.as_bytes()[15], 0x0f);
    }

    #[test]
    fn rejects_short_and_non_hex() {
        assert!(matches!(parse_key("abcd"), Err(DecryptError::InvalidEncoding { what: "key", .. })));
        assert!(matches!(
            parse_iv("zz0102030405060708090a0b0c0d0e0f"),
            Err(DecryptError::InvalidEncoding { what: "iv", .. })
        ));
    }
}
