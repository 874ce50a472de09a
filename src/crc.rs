// gptbemak/src/crc.rs

//! CRC32 (IEEE 802.3, reflected polynomial `0xEDB88320`) used by GPT.
//!
//! `crc32fast` keeps its lookup tables as compile-time constants, so there is
//! no lazily built state to guard.

use crc32fast::Hasher;

/// CRC32 of `bytes` with initial register and final XOR `0xFFFFFFFF`.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// CRC32 of `bytes` as if the four bytes at `field_offset` were zero.
///
/// GPT checksums its header with the checksum field itself cleared.
pub fn crc32_with_zeroed_field(bytes: &[u8], field_offset: usize) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&bytes[..field_offset]);
    hasher.update(&[0; 4]);
    hasher.update(&bytes[field_offset + 4..]);
    hasher.finalize()
}
