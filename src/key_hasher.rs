//! Per-key-type hashing capability consumed by [`HashMap`](crate::HashMap).
//!
//! A table never inspects key types at runtime: the hasher type parameter
//! decides both the 32-bit hash code and key equality. Implementations must
//! keep the two consistent (`equal(a, b)` implies `hash(a) == hash(b)`), and
//! when a table is queried through `K: Borrow<Q>`, hashing `Q` must agree with
//! hashing the stored `K`.
//!
//! Every code produced by the hashers in this module has its top 8 bits
//! clear and is never zero (see [`mask_top_8_bits`]).

use crate::case_fold;
use crate::rapidhash::{self, RapidBuildHasher};
use crate::string_hasher::{compute_hash_and_mask_top_8_bits, mask_top_8_bits};
use core::hash::{BuildHasher, Hash};

pub trait KeyHasher<K: ?Sized> {
    /// Hash code of `key`.
    fn hash(&self, key: &K) -> u32;

    /// Key equality as seen by the table.
    fn equal(&self, a: &K, b: &K) -> bool;
}

/// Case-insensitive hashing for text keys.
///
/// Works for anything that is `AsRef<str>`, so a `HashMap<String, _>` can be
/// queried with `&str` and both hash identically.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CaseFoldingHasher {
    seed: u64,
}

impl CaseFoldingHasher {
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for CaseFoldingHasher {
    fn default() -> Self {
        Self::with_seed(rapidhash::SEED)
    }
}

impl<S: AsRef<str> + ?Sized> KeyHasher<S> for CaseFoldingHasher {
    #[inline]
    fn hash(&self, key: &S) -> u32 {
        let folded = case_fold::fold(key.as_ref());
        compute_hash_and_mask_top_8_bits(folded.as_bytes(), self.seed)
    }

    #[inline]
    fn equal(&self, a: &S, b: &S) -> bool {
        case_fold::eq_folded(a.as_ref(), b.as_ref())
    }
}

/// Exact (case-sensitive) hashing over the raw bytes of a key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BytesHasher {
    seed: u64,
}

impl BytesHasher {
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for BytesHasher {
    fn default() -> Self {
        Self::with_seed(rapidhash::SEED)
    }
}

impl<B: AsRef<[u8]> + ?Sized> KeyHasher<B> for BytesHasher {
    #[inline]
    fn hash(&self, key: &B) -> u32 {
        compute_hash_and_mask_top_8_bits(key.as_ref(), self.seed)
    }

    #[inline]
    fn equal(&self, a: &B, b: &B) -> bool {
        a.as_ref() == b.as_ref()
    }
}

/// Hashing for primitive integers: RapidHash over the little-endian bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IntHasher {
    seed: u64,
}

impl IntHasher {
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for IntHasher {
    fn default() -> Self {
        Self::with_seed(rapidhash::SEED)
    }
}

macro_rules! int_key_hasher {
    ($($t:ty),* $(,)?) => {
        $(
            impl KeyHasher<$t> for IntHasher {
                #[inline]
                fn hash(&self, key: &$t) -> u32 {
                    compute_hash_and_mask_top_8_bits(&key.to_le_bytes(), self.seed)
                }

                #[inline]
                fn equal(&self, a: &$t, b: &$t) -> bool {
                    a == b
                }
            }
        )*
    };
}

int_key_hasher!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Adapter for any `Hash + Eq` key through a standard `BuildHasher`; the
/// 64-bit result is masked the same way as every other code.
#[derive(Clone, Debug, Default)]
pub struct StdHasher<S = RapidBuildHasher> {
    build: S,
}

impl<S> StdHasher<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }

    pub fn build_hasher(&self) -> &S {
        &self.build
    }
}

impl<K, S> KeyHasher<K> for StdHasher<S>
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        mask_top_8_bits(self.build.hash_one(key))
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
