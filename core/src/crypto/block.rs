//! crypto/block.rs
//! AES-128 key expansion and single-block inverse cipher.
//!
//! Design notes:
//! - Blocks are four words, each word big-endian over one state column.
//! - Decryption uses the equivalent inverse cipher (FIPS-197 5.3.5): each
//!   middle round is InvShiftRows, InvSubBytes, InvMixColumns, AddRoundKey,
//!   with InvMixColumns folded into the middle round keys at expansion time.
//! - Pure: no state survives a call.

use crate::constants::{BLOCK_WORDS, ROUNDS, SCHEDULE_WORDS};
use crate::crypto::tables::{INV_SBOX, RCON, SBOX, TD0};
use crate::crypto::types::Key128;

/// Expanded round keys for one decryption call.
#[derive(Clone)]
pub struct KeySchedule {
    /// FIPS-197 `w[0..44]`, round 0 first.
    forward: [u32; SCHEDULE_WORDS],
    /// Decryption round keys, last forward round first, middle rounds mixed.
    inverse: [u32; SCHEDULE_WORDS],
}

impl KeySchedule {
    /// Forward round key `round` (0..=10).
    pub fn round_key(&self, round: usize) -> &[u32] {
        &self.forward[round * BLOCK_WORDS..(round + 1) * BLOCK_WORDS]
    }

    pub fn words(&self) -> &[u32; SCHEDULE_WORDS] {
        &self.forward
    }
}

#[inline(always)]
fn sub_word(w: u32) -> u32 {
    (SBOX[(w >> 24) as usize] as u32) << 24
        | (SBOX[(w >> 16 & 0xff) as usize] as u32) << 16
        | (SBOX[(w >> 8 & 0xff) as usize] as u32) << 8
        | SBOX[(w & 0xff) as usize] as u32
}

/// InvMixColumns on one column word. `TD0` already applies InvSubBytes,
/// so each byte goes through the forward S-box first to cancel it.
#[inline(always)]
fn inv_mix_column(w: u32) -> u32 {
    TD0[SBOX[(w >> 24) as usize] as usize]
        ^ TD0[SBOX[(w >> 16 & 0xff) as usize] as usize].rotate_right(8)
        ^ TD0[SBOX[(w >> 8 & 0xff) as usize] as usize].rotate_right(16)
        ^ TD0[SBOX[(w & 0xff) as usize] as usize].rotate_right(24)
}

/// Expand a 128-bit key into 11 round keys.
pub fn expand_key(key: &Key128) -> KeySchedule {
    let mut forward = [0u32; SCHEDULE_WORDS];
    forward[..BLOCK_WORDS].copy_from_slice(&key.words());

    for i in BLOCK_WORDS..SCHEDULE_WORDS {
        let mut temp = forward[i - 1];
        if i % BLOCK_WORDS == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ (RCON[i / BLOCK_WORDS - 1] as u32) << 24;
        }
        forward[i] = forward[i - BLOCK_WORDS] ^ temp;
    }

    let mut inverse = [0u32; SCHEDULE_WORDS];
    for round in 0..=ROUNDS {
        let src = (ROUNDS - round) * BLOCK_WORDS;
        let dst = round * BLOCK_WORDS;
        for col in 0..BLOCK_WORDS {
            let w = forward[src + col];
            inverse[dst + col] = if round == 0 || round == ROUNDS { w } else { inv_mix_column(w) };
        }
    }

    KeySchedule { forward, inverse }
}

/// One state column of a middle inverse round. `a..d` are the source
/// columns for rows 0..3 after InvShiftRows.
#[inline(always)]
fn inv_round_column(a: u32, b: u32, c: u32, d: u32, key: u32) -> u32 {
    TD0[(a >> 24) as usize]
        ^ TD0[(b >> 16 & 0xff) as usize].rotate_right(8)
        ^ TD0[(c >> 8 & 0xff) as usize].rotate_right(16)
        ^ TD0[(d & 0xff) as usize].rotate_right(24)
        ^ key
}

/// Final round column: no InvMixColumns.
#[inline(always)]
fn inv_final_column(a: u32, b: u32, c: u32, d: u32, key: u32) -> u32 {
    ((INV_SBOX[(a >> 24) as usize] as u32) << 24
        | (INV_SBOX[(b >> 16 & 0xff) as usize] as u32) << 16
        | (INV_SBOX[(c >> 8 & 0xff) as usize] as u32) << 8
        | INV_SBOX[(d & 0xff) as usize] as u32)
        ^ key
}

/// Decrypt one 4-word block.
pub fn decrypt_block(schedule: &KeySchedule, block: [u32; 4]) -> [u32; 4] {
    let rk = &schedule.inverse;

    let mut s0 = block[0] ^ rk[0];
    let mut s1 = block[1] ^ rk[1];
    let mut s2 = block[2] ^ rk[2];
    let mut s3 = block[3] ^ rk[3];

    for round in 1..ROUNDS {
        let k = round * BLOCK_WORDS;
        let t0 = inv_round_column(s0, s3, s2, s1, rk[k]);
        let t1 = inv_round_column(s1, s0, s3, s2, rk[k + 1]);
        let t2 = inv_round_column(s2, s1, s0, s3, rk[k + 2]);
        let t3 = inv_round_column(s3, s2, s1, s0, rk[k + 3]);
        s0 = t0;
        s1 = t1;
        s2 = t2;
        s3 = t3;
    }

    let k = ROUNDS * BLOCK_WORDS;
    [
        inv_final_column(s0, s3, s2, s1, rk[k]),
        inv_final_column(s1, s0, s3, s2, rk[k + 1]),
        inv_final_column(s2, s1, s0, s3, rk[k + 2]),
        inv_final_column(s3, s2, s1, s0, rk[k + 3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(hex_str: &str) -> [u32; 4] {
        let bytes = hex::decode(hex_str).unwrap();
        let mut out = [0u32; 4];
        for (i, w) in out.iter_mut().enumerate() {
            *w = u32::from_be_bytes(bytes[i * 4..i * 4 + 4].try_into().unwrap());
        }
        out
    }

    fn key(hex_str: &str) -> Key128 {
        Key128::from_slice(&hex::decode(hex_str).unwrap()).unwrap()
    }

    #[test]
    fn key_expansion_matches_fips_197_appendix_a1() {
        let schedule = expand_key(&key("2b7e151628aed2a6abf7158809cf4f3c"));
        let w = schedule.words();
        assert_eq!(w[4], 0xa0fafe17);
        assert_eq!(w[5], 0x88542cb1);
        assert_eq!(w[40], 0xd014f9a8);
        assert_eq!(w[43], 0xb6630ca6);
        assert_eq!(schedule.round_key(10), &[0xd014f9a8, 0xc9ee2589, 0xe13f0cc8, 0xb6630ca6]);
    }

    #[test]
    fn decrypts_fips_197_appendix_c1_vector() {
        let schedule = expand_key(&key("000102030405060708090a0b0c0d0e0f"));
        let out = decrypt_block(&schedule, words("69c4e0d86a7b0430d8cdb78070b4c55a"));
        assert_eq!(out, words("00112233445566778899aabbccddeeff"));
    }

    #[test]
    fn decrypts_fips_197_appendix_b_vector() {
        let schedule = expand_key(&key("2b7e151628aed2a6abf7158809cf4f3c"));
        let out = decrypt_block(&schedule, words("3925841d02dc09fbdc118597196a0b32"));
        assert_eq!(out, words("3243f6a8885a308d313198a2e0370734"));
    }

    #[test]
    fn inverse_schedule_ends_with_round_zero() {
        let k = key("2b7e151628aed2a6abf7158809cf4f3c");
        let schedule = expand_key(&k);
        assert_eq!(&schedule.inverse[40..44], &k.words());
        assert_eq!(&schedule.inverse[0..4], schedule.round_key(10));
    }

    #[test]
    fn same_input_same_output() {
        let schedule = expand_key(&key("000102030405060708090a0b0c0d0e0f"));
        let block = words("69c4e0d86a7b0430d8cdb78070b4c55a");
        assert_eq!(decrypt_block(&schedule, block), decrypt_block(&schedule, block));
    }
}
