//! RapidHash: the 64-bit mixing hash behind every hash code in this crate.
//!
//! The algorithm is fixed and reproduced bit-for-bit; the secrets and the
//! default seed are compile-time constants. Nothing here is randomized per
//! process, so the output is stable across runs and platforms but offers no
//! protection against deliberately colliding input. Callers that need
//! flood resistance should pick their own seed.

use core::hash::{BuildHasher, Hasher};

/// Default seed.
pub const SEED: u64 = 0xbdd8_9aa9_8270_4029;

/// The three mixing secrets.
pub const SECRET: [u64; 3] = [
    0x2d35_8dcc_aa6c_78a5,
    0x8bb8_4b93_962e_acc9,
    0x4b33_a62e_d433_d4a3,
];

/// Full 64x64 -> 128-bit product, returned as `(lo, hi)`.
#[inline(always)]
pub fn mul128(a: u64, b: u64) -> (u64, u64) {
    let r = (a as u128) * (b as u128);
    (r as u64, (r >> 64) as u64)
}

/// Folds the 128-bit product of `a` and `b` into 64 bits by XOR-ing its halves.
#[inline(always)]
pub fn mix(a: u64, b: u64) -> u64 {
    let (lo, hi) = mul128(a, b);
    lo ^ hi
}

#[inline(always)]
fn read_u32(data: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(word) as u64
}

#[inline(always)]
fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(word)
}

/// Hashes `data` with `seed`.
///
/// Identical `(data, seed)` pairs always produce the same value.
pub fn hash(data: &[u8], seed: u64) -> u64 {
    let len = data.len();
    let len64 = len as u64;
    let mut seed = seed ^ mix(seed ^ SECRET[0], SECRET[1]) ^ len64;

    let (mut a, mut b);
    if len <= 16 {
        if len >= 4 {
            a = (read_u32(data, 0) << 32) | read_u32(data, len - 4);
            // Second window: offset 4 for 8..=16 bytes, 0 below that.
            let delta = (len & 24) >> (len >> 3);
            b = (read_u32(data, delta) << 32) | read_u32(data, len - 4 - delta);
        } else if len > 0 {
            a = ((data[0] as u64) << 56) | ((data[len >> 1] as u64) << 32) | data[len - 1] as u64;
            b = 0;
        } else {
            a = 0;
            b = 0;
        }
    } else {
        let mut i = len;
        if i > 48 {
            let mut see1 = seed;
            let mut see2 = seed;
            while i >= 48 {
                let p = len - i;
                seed = mix(
                    read_u64(data, p) ^ SECRET[0],
                    read_u64(data, p + 8) ^ seed,
                );
                see1 = mix(
                    read_u64(data, p + 16) ^ SECRET[1],
                    read_u64(data, p + 24) ^ see1,
                );
                see2 = mix(
                    read_u64(data, p + 32) ^ SECRET[2],
                    read_u64(data, p + 40) ^ see2,
                );
                i -= 48;
            }
            seed ^= see1 ^ see2;
        }

        if i > 16 {
            let p = len - i;
            seed = mix(
                read_u64(data, p) ^ SECRET[2],
                read_u64(data, p + 8) ^ seed ^ SECRET[1],
            );
            if i > 32 {
                seed = mix(
                    read_u64(data, p + 16) ^ SECRET[2],
                    read_u64(data, p + 24) ^ seed,
                );
            }
        }

        a = read_u64(data, len - 16);
        b = read_u64(data, len - 8);
    }

    a ^= SECRET[1];
    b ^= seed;
    let (lo, hi) = mul128(a, b);
    mix(lo ^ SECRET[0] ^ len64, hi ^ SECRET[1])
}

/// [`hash`] with the default [`SEED`].
#[inline]
pub fn hash_with_default_seed(data: &[u8]) -> u64 {
    hash(data, SEED)
}

/// `core::hash::Hasher` adapter over [`hash`].
///
/// RapidHash is not a streaming algorithm (the input length feeds the very
/// first step), so written bytes are buffered and hashed on `finish`.
#[derive(Clone, Debug)]
pub struct RapidHasher {
    seed: u64,
    buf: Vec<u8>,
}

impl RapidHasher {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            buf: Vec::new(),
        }
    }
}

impl Default for RapidHasher {
    fn default() -> Self {
        Self::with_seed(SEED)
    }
}

impl Hasher for RapidHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        hash(&self.buf, self.seed)
    }
}

/// Builds [`RapidHasher`]s sharing one seed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RapidBuildHasher {
    seed: u64,
}

impl RapidBuildHasher {
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for RapidBuildHasher {
    fn default() -> Self {
        Self::with_seed(SEED)
    }
}

impl BuildHasher for RapidBuildHasher {
    type Hasher = RapidHasher;

    fn build_hasher(&self) -> Self::Hasher {
        RapidHasher::with_seed(self.seed)
    }
}
