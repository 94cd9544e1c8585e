pub mod tables;
pub mod types;
pub mod block;
pub mod cbc;
pub mod padding;

pub use types::*;
pub use block::{decrypt_block, expand_key, KeySchedule};
pub use cbc::{decrypt, decrypt_blocks, ChainState};
pub use padding::{unpad, unpad_vec, unpadded_len};
