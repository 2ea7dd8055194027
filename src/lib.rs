//! casefold-hashmap: an open-addressed hash map with RapidHash-based,
//! case-insensitive string hashing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: reproduce a browser engine's hash map behavior exactly: the
//!   same 64-bit hash, the same 24-bit codes, the same probe order and the
//!   same growth points.
//! - Layers:
//!   - `rapidhash`: the 64-bit mixing hash over bytes plus a seed.
//!   - `string_hasher`: masks a 64-bit hash down to a 32-bit code with the
//!     top 8 bits free for caller flags and zero never produced.
//!   - `case_fold` + `KeyHasher`: a statically chosen hashing capability
//!     per key type; text keys fold case before hashing and comparing.
//!   - `HashMap<K, V, H>`: the bucket array, triangular probing, growth,
//!     tombstone deletion and bucket-order iteration.
//!
//! Constraints
//! - Capacity is a power of two, starts at 8 and only grows (or resets to 8
//!   on `clear`).
//! - Growth happens before an insert whenever `(len + 1) * 2 >= capacity`,
//!   so the load factor stays under 50%.
//! - Hash codes are recomputed on every rebuild; nothing caches them.
//! - No runtime type inspection: a table without a `KeyHasher` for its key
//!   type does not compile, so there is no silent zero-hash fallback.
//!
//! Deletion
//! - Removing a key leaves a tombstone. Lookups skip tombstones, so keys
//!   that were displaced past a deleted bucket stay reachable. Inserts reuse
//!   the first tombstone on their probe path. When tombstones alone would
//!   break the load limit, the table is rebuilt at its current capacity.
//!
//! Notes and non-goals
//! - Single owner: mutation needs `&mut self`, so mutation during iteration
//!   is rejected at compile time. No internal locking.
//! - Secrets and the default seed are compile-time constants. Hashers carry
//!   a seed so callers that need a private seed can supply one; this is not
//!   a substitute for a keyed hash under hostile input.
//! - Iteration follows raw bucket order, not insertion order.
//!
//! Logging
//! - Growth, tombstone purges and shrinking clears are reported through the
//!   `log` facade at trace level. Lookups never log.

pub mod case_fold;
pub mod hash_map;
mod hash_map_proptest;
pub mod key_hasher;
pub mod rapidhash;
pub mod string_hasher;

// Public surface
pub use hash_map::{HashMap, TryReserveError, INITIAL_CAPACITY};
pub use key_hasher::{BytesHasher, CaseFoldingHasher, IntHasher, KeyHasher, StdHasher};
pub use rapidhash::{RapidBuildHasher, RapidHasher};
