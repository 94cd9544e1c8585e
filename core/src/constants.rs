/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

/// Words per AES block.
pub const BLOCK_WORDS: usize = BLOCK_LEN / 4;

/// AES-128 key length in bytes.
pub const KEY_LEN_16: usize = 16;

/// IV length in 32-bit words.
pub const IV_WORDS: usize = 4;

/// AES-128 round count.
pub const ROUNDS: usize = 10;

/// Expanded key schedule length in words (11 round keys of 4 words).
pub const SCHEDULE_WORDS: usize = BLOCK_WORDS * (ROUNDS + 1);

/// Default scheduler step, in 32-bit words (32000 bytes per tick).
pub const DEFAULT_CHUNK_WORDS: usize = 8000;

/// Upper bound on a configured step (4 MiB per tick).
pub const MAX_CHUNK_WORDS: usize = 1024 * 1024;

/// Host timer delay inserted between scheduler ticks.
pub const DEFAULT_TICK_DELAY_MS: u64 = 1;
