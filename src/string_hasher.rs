//! 32-bit hash codes with the top bits reserved for caller flags.

use crate::rapidhash;

/// Number of high bits of a hash code left free for flags.
pub const FLAG_COUNT: u32 = 8;

/// Mask selecting the usable low bits of a hash code.
pub const HASH_MASK: u64 = (1 << (32 - FLAG_COUNT)) - 1;

/// Substitute for a masked hash of zero. Zero means "hash not computed
/// yet" to callers that cache codes; bit 23 still collapses to zero once a
/// table masks the high bits away.
pub const ZERO_SUBSTITUTE: u32 = 0x8000_0000 >> FLAG_COUNT;

/// Keeps the low 24 bits of `hash` and never returns 0.
#[inline]
pub fn mask_top_8_bits(hash: u64) -> u32 {
    match (hash & HASH_MASK) as u32 {
        0 => ZERO_SUBSTITUTE,
        code => code,
    }
}

/// RapidHash of `data` under `seed`, masked to a flag-safe code.
#[inline]
pub fn compute_hash_and_mask_top_8_bits(data: &[u8], seed: u64) -> u32 {
    mask_top_8_bits(rapidhash::hash(data, seed))
}
