//! HashMap: open addressing with triangular probing over a power-of-two
//! bucket array.
//!
//! Layout and policy
//! - Buckets are `Empty`, `Deleted` (tombstone) or `Full(key, value)`.
//! - `index(code) = code & (capacity - 1)`; the i-th probe step adds `i` to
//!   the previous index, which visits every bucket of a power-of-two table
//!   within `capacity` steps.
//! - Before any insertion, the table doubles when `(len + 1) * 2 >= capacity`.
//!   If only tombstones would cross that line, it is rebuilt at the same
//!   capacity instead. Either way at least half the buckets stay `Empty`, so
//!   every probe terminates.
//! - Rebuilding re-inserts every pair through the insert path, so hash codes
//!   are recomputed against the new mask. Nothing caches codes.
//! - Deletion leaves a tombstone that lookups skip; tombstones are reclaimed
//!   by rebuilds and by `clear`.

use crate::key_hasher::{CaseFoldingHasher, KeyHasher};
use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem;

/// Capacity of a new or cleared table.
pub const INITIAL_CAPACITY: usize = 8;

/// A table grows before its load factor would reach `1 / MAX_LOAD`.
const MAX_LOAD: usize = 2;

#[derive(Clone, Debug)]
enum Bucket<K, V> {
    Empty,
    Deleted,
    Full(K, V),
}

enum Probe {
    /// Matching key at this index.
    Found(usize),
    /// Key absent; first reusable bucket on its probe path.
    Vacant(usize),
    /// Every bucket visited without a match or a reusable bucket.
    Exhausted,
}

/// Error returned by [`HashMap::try_reserve`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TryReserveError {
    /// The required capacity does not fit in `usize`.
    CapacityOverflow,
    /// The allocator could not provide a bucket array of `capacity` slots.
    AllocError { capacity: usize },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("capacity overflow while reserving hash table buckets")
            }
            TryReserveError::AllocError { capacity } => {
                write!(f, "failed to allocate a hash table of {capacity} buckets")
            }
        }
    }
}

impl std::error::Error for TryReserveError {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("hash table capacity overflow")
}

/// Smallest valid capacity that holds `len` entries without growing.
fn capacity_for(len: usize) -> Option<usize> {
    let cap = len
        .checked_mul(MAX_LOAD)?
        .checked_add(1)?
        .checked_next_power_of_two()?;
    Some(cap.max(INITIAL_CAPACITY))
}

fn allocate<K, V>(capacity: usize) -> Box<[Bucket<K, V>]> {
    debug_assert!(capacity.is_power_of_two() && capacity >= INITIAL_CAPACITY);
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || Bucket::Empty);
    buckets.into_boxed_slice()
}

fn try_allocate<K, V>(capacity: usize) -> Result<Box<[Bucket<K, V>]>, TryReserveError> {
    debug_assert!(capacity.is_power_of_two() && capacity >= INITIAL_CAPACITY);
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| TryReserveError::AllocError { capacity })?;
    buckets.resize_with(capacity, || Bucket::Empty);
    Ok(buckets.into_boxed_slice())
}

/// Open-addressed hash map keyed through a [`KeyHasher`].
///
/// The default hasher folds case, so `HashMap<String, V>` treats `"Key"` and
/// `"key"` as the same key. Use [`HashMap::with_hasher`] with another
/// [`KeyHasher`] for other key types.
pub struct HashMap<K, V, H = CaseFoldingHasher> {
    buckets: Box<[Bucket<K, V>]>,
    len: usize,
    deleted: usize,
    hasher: H,
    #[cfg(test)]
    rebuilds: usize,
}

impl<K, V> HashMap<K, V> {
    /// Empty map with the case-folding hasher and 8 buckets.
    pub fn new() -> Self {
        Self::with_hasher(CaseFoldingHasher::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, CaseFoldingHasher::default())
    }
}

impl<K, V, H: Default> Default for HashMap<K, V, H> {
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, H> HashMap<K, V, H> {
    fn from_buckets(buckets: Box<[Bucket<K, V>]>, hasher: H) -> Self {
        Self {
            buckets,
            len: 0,
            deleted: 0,
            hasher,
            #[cfg(test)]
            rebuilds: 0,
        }
    }

    pub fn with_hasher(hasher: H) -> Self {
        Self::from_buckets(allocate(INITIAL_CAPACITY), hasher)
    }

    /// Empty map able to hold `capacity` entries before it first grows.
    ///
    /// # Panics
    ///
    /// Panics if the required bucket count overflows `usize`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        let buckets = capacity_for(capacity).unwrap_or_else(|| capacity_overflow());
        Self::from_buckets(allocate(buckets), hasher)
    }

    /// Number of entries (the table's size).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets; always a power of two and at least 8.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Drops every entry and returns to 8 empty buckets.
    pub fn clear(&mut self) {
        if self.capacity() != INITIAL_CAPACITY {
            log::trace!(
                "Clearing hash table, shrinking {} buckets to {INITIAL_CAPACITY}",
                self.capacity()
            );
        }
        self.buckets = allocate(INITIAL_CAPACITY);
        self.len = 0;
        self.deleted = 0;
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            remaining: self.len,
        }
    }

    /// Entries in bucket order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Takes every entry out in bucket order and returns the table to 8
    /// empty buckets. The table is cleared even if the iterator is dropped
    /// early; unyielded pairs are dropped with it.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        let buckets = mem::replace(&mut self.buckets, allocate(INITIAL_CAPACITY));
        let remaining = mem::replace(&mut self.len, 0);
        self.deleted = 0;
        Drain {
            inner: IntoIter {
                buckets: buckets.into_vec().into_iter(),
                remaining,
            },
            _map: PhantomData,
        }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for bucket in self.buckets.iter_mut() {
            let keep = match bucket {
                Bucket::Full(k, v) => f(&*k, v),
                _ => continue,
            };
            if !keep {
                *bucket = Bucket::Deleted;
                self.len -= 1;
                self.deleted += 1;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.deleted
    }

    #[inline]
    fn index(&self, code: u32) -> usize {
        debug_assert!(self.capacity().is_power_of_two());
        code as usize & (self.capacity() - 1)
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    /// Walks the probe path of `key`. Tombstones never end a probe; the
    /// first one seen is reported as the vacancy so inserts reuse it.
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        let mask = self.capacity() - 1;
        let mut idx = self.index(<H as KeyHasher<Q>>::hash(&self.hasher, key));
        let mut tombstone = None;

        for step in 1..=self.capacity() {
            match &self.buckets[idx] {
                Bucket::Empty => return Probe::Vacant(tombstone.unwrap_or(idx)),
                Bucket::Deleted => {
                    tombstone.get_or_insert(idx);
                }
                Bucket::Full(k, _) => {
                    if <H as KeyHasher<Q>>::equal(&self.hasher, k.borrow(), key) {
                        return Probe::Found(idx);
                    }
                }
            }
            idx = (idx + step) & mask;
        }

        match tombstone {
            Some(idx) => Probe::Vacant(idx),
            None => Probe::Exhausted,
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        match self.probe(key) {
            Probe::Found(idx) => Some(idx),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Grows (or purges tombstones) so one more entry fits under the load
    /// limit.
    ///
    /// A same-capacity purge only runs while live entries fill less than a
    /// quarter of the buckets, so at least a quarter of the table must turn
    /// into tombstones before the next one. Above that the table doubles.
    fn reserve_one(&mut self) {
        let cap = self.capacity();
        let live_over_limit = (self.len + 1) * MAX_LOAD >= cap;
        let used_over_limit = (self.len + self.deleted + 1) * MAX_LOAD >= cap;
        if !live_over_limit && !used_over_limit {
            return;
        }
        if !live_over_limit && (self.len + 1) * MAX_LOAD * 2 < cap {
            log::trace!(
                "Purging {} tombstones from hash table of {cap} buckets",
                self.deleted
            );
            self.rebuild(allocate(cap));
        } else {
            let new_cap = cap.checked_mul(2).unwrap_or_else(|| capacity_overflow());
            log::trace!(
                "Growing hash table from {cap} to {new_cap} buckets ({} entries, {} tombstones)",
                self.len,
                self.deleted
            );
            self.rebuild(allocate(new_cap));
        }
    }

    /// Installs `buckets` and re-inserts every live pair of the old array.
    fn rebuild(&mut self, buckets: Box<[Bucket<K, V>]>) {
        let old = mem::replace(&mut self.buckets, buckets);
        self.len = 0;
        self.deleted = 0;
        #[cfg(test)]
        {
            self.rebuilds += 1;
        }
        for bucket in old.into_vec() {
            if let Bucket::Full(k, v) = bucket {
                self.insert_no_grow(k, v);
            }
        }
    }

    fn insert_no_grow(&mut self, key: K, value: V) -> Option<V> {
        match self.probe(&key) {
            Probe::Found(idx) => match &mut self.buckets[idx] {
                Bucket::Full(_, v) => Some(mem::replace(v, value)),
                _ => unreachable!("probe reported a match on a non-full bucket"),
            },
            Probe::Vacant(idx) => {
                if matches!(self.buckets[idx], Bucket::Deleted) {
                    self.deleted -= 1;
                }
                self.buckets[idx] = Bucket::Full(key, value);
                self.len += 1;
                None
            }
            Probe::Exhausted => unreachable!("load limit keeps half the buckets empty"),
        }
    }

    /// Inserts or updates `key`, returning the previous value if any.
    ///
    /// On update the stored key is kept and only the value is replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.reserve_one();
        self.insert_no_grow(key, value)
    }

    /// Inserts or updates `key`; the table's `set` operation.
    #[inline]
    pub fn set(&mut self, key: K, value: V) {
        let _ = self.insert(key, value);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Looks up `key`, returning the value (or `V::default()`) and whether
    /// the key was present.
    pub fn get_or_default<Q>(&self, key: &Q) -> (V, bool)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
        V: Clone + Default,
    {
        match self.get(key) {
            Some(v) => (v.clone(), true),
            None => (V::default(), false),
        }
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        let idx = self.find(key)?;
        match &self.buckets[idx] {
            Bucket::Full(k, v) => Some((k, v)),
            _ => None,
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        let idx = self.find(key)?;
        match &mut self.buckets[idx] {
            Bucket::Full(_, v) => Some(v),
            _ => None,
        }
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        self.find(key).is_some()
    }

    /// Removes `key`, leaving a tombstone, and returns the stored pair.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        let idx = self.find(key)?;
        match mem::replace(&mut self.buckets[idx], Bucket::Deleted) {
            Bucket::Full(k, v) => {
                self.len -= 1;
                self.deleted += 1;
                Some((k, v))
            }
            other => {
                self.buckets[idx] = other;
                None
            }
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`; returns whether it was present.
    #[inline]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        self.remove_entry(key).is_some()
    }

    /// Makes room for `additional` more entries without growing.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        let cap = self
            .len
            .checked_add(additional)
            .and_then(capacity_for)
            .unwrap_or_else(|| capacity_overflow());
        if cap > self.capacity() {
            log::trace!(
                "Reserving {additional} entries, growing hash table from {} to {cap} buckets",
                self.capacity()
            );
            self.rebuild(allocate(cap));
        }
    }

    /// Fallible [`HashMap::reserve`]; the table is unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let cap = self
            .len
            .checked_add(additional)
            .and_then(capacity_for)
            .ok_or(TryReserveError::CapacityOverflow)?;
        if cap > self.capacity() {
            log::trace!(
                "Reserving {additional} entries, growing hash table from {} to {cap} buckets",
                self.capacity()
            );
            let buckets = try_allocate(cap)?;
            self.rebuild(buckets);
        }
        Ok(())
    }
}

impl<K, V, H> Clone for HashMap<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Clone,
{
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            deleted: self.deleted,
            hasher: self.hasher.clone(),
            #[cfg(test)]
            rebuilds: 0,
        }
    }
}

impl<K, V, H> fmt::Debug for HashMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H> PartialEq for HashMap<K, V, H>
where
    V: PartialEq,
    H: KeyHasher<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, H> Eq for HashMap<K, V, H>
where
    V: Eq,
    H: KeyHasher<K>,
{
}

impl<K, V, H> Extend<(K, V)> for HashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, H> FromIterator<(K, V)> for HashMap<K, V, H>
where
    H: KeyHasher<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Borrowing iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Bucket<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            buckets: self.buckets.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for bucket in self.buckets.by_ref() {
            if let Bucket::Full(k, v) = bucket {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in bucket order.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Bucket<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for bucket in self.buckets.by_ref() {
            if let Bucket::Full(k, v) = bucket {
                self.remaining -= 1;
                return Some((&*k, v));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)` in bucket order.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Bucket<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for bucket in self.buckets.by_ref() {
            if let Bucket::Full(k, v) = bucket {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Draining iterator returned by [`HashMap::drain`].
pub struct Drain<'a, K, V> {
    inner: IntoIter<K, V>,
    _map: PhantomData<&'a mut ()>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<'a, K, V, H> IntoIterator for &'a HashMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H> IntoIterator for &'a mut HashMap<K, V, H> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, H> IntoIterator for HashMap<K, V, H> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            buckets: self.buckets.into_vec().into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_hasher::{BytesHasher, IntHasher};
    use test_log::test;

    /// Invariant: the key lands on `index(hash)` in an otherwise empty table.
    #[test]
    fn index_masks_hash_code() {
        let mut m: HashMap<&str, i32> = HashMap::new();
        m.set("c", 1);
        // "c" hashes to 0x662178, so bucket 0 of 8.
        assert!(matches!(m.buckets[0], Bucket::Full("c", 1)));
        assert_eq!(m.index(0x0066_2178), 0);
        assert_eq!(m.index(0x00ad_425f), 7);
    }

    /// Invariant: a colliding key is placed one triangular step further.
    #[test]
    fn collision_takes_next_probe_step() {
        let mut m: HashMap<&str, i32> = HashMap::new();
        // "c" and "e" both start at bucket 0 of 8.
        m.set("c", 1);
        m.set("e", 2);
        assert!(matches!(m.buckets[0], Bucket::Full("c", 1)));
        assert!(matches!(m.buckets[1], Bucket::Full("e", 2)));
    }

    /// Invariant: deletion leaves a tombstone; the next insert on the same
    /// probe path reuses it.
    #[test]
    fn tombstone_reused_by_insert() {
        let mut m: HashMap<&str, i32> = HashMap::new();
        m.set("c", 1);
        m.set("e", 2);
        assert!(m.delete("c"));
        assert!(matches!(m.buckets[0], Bucket::Deleted));
        assert_eq!(m.deleted, 1);

        // "e" is found past the tombstone and updated in place.
        m.set("e", 3);
        assert!(matches!(m.buckets[1], Bucket::Full("e", 3)));
        assert!(matches!(m.buckets[0], Bucket::Deleted));

        // "c" comes back into the tombstone, not past "e".
        m.set("c", 4);
        assert!(matches!(m.buckets[0], Bucket::Full("c", 4)));
        assert_eq!(m.deleted, 0);
        assert_eq!(m.len(), 2);
    }

    /// Invariant: when tombstones alone would exceed the load limit, the
    /// table is rebuilt at its current capacity.
    #[test]
    fn tombstones_purged_without_growth() {
        let mut m: HashMap<u32, u32, IntHasher> = HashMap::default();
        for i in 0..3 {
            m.set(i, i);
        }
        for i in 0..3 {
            assert!(m.delete(&i));
        }
        assert_eq!(m.deleted, 3);
        assert_eq!(m.capacity(), 8);

        m.set(100, 1);
        assert_eq!(m.capacity(), 8);
        assert_eq!(m.deleted, 0);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(&100), Some(&1));
    }

    /// Invariant: growth is decided before probing, even for an update.
    #[test]
    fn update_at_threshold_still_grows() {
        let mut m: HashMap<&str, i32> = HashMap::new();
        m.set("a", 1);
        m.set("b", 2);
        m.set("c", 3);
        assert_eq!(m.capacity(), 8);
        m.set("a", 10);
        assert_eq!(m.capacity(), 16);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get("a"), Some(&10));
    }

    /// Invariant: steady delete+insert churn just under the growth line
    /// rebuilds the table a bounded number of times, not once per pair.
    #[test]
    fn churn_near_load_limit_rebuilds_rarely() {
        let mut m: HashMap<u32, u32, IntHasher> = HashMap::default();
        for i in 0..510 {
            m.set(i, i);
        }
        assert_eq!(m.capacity(), 1024);

        let before = m.rebuilds;
        let mut next = 510;
        for i in 0..1000 {
            assert!(m.delete(&i));
            m.set(next, next);
            next += 1;
        }
        let rebuilds = m.rebuilds - before;
        assert!(rebuilds <= 4, "{rebuilds} rebuilds over 1000 delete+insert pairs");
        assert_eq!(m.len(), 510);
        assert!(m.capacity() <= 2048);
        assert!((m.len() + m.deleted) * 2 < m.capacity());
        for k in 1000..next {
            assert_eq!(m.get(&k), Some(&k));
        }
    }

    /// Invariant: with few live entries, tombstones are purged in place and
    /// the table keeps its capacity.
    #[test]
    fn sparse_table_purges_in_place() {
        let mut m: HashMap<u32, u32, IntHasher> =
            HashMap::with_capacity_and_hasher(100, IntHasher::default());
        assert_eq!(m.capacity(), 256);
        for i in 0..10_000 {
            m.set(i, i);
            assert!(m.delete(&i));
        }
        assert_eq!(m.capacity(), 256);
        assert!(m.is_empty());
    }

    #[test]
    fn capacity_for_respects_load_limit() {
        assert_eq!(capacity_for(0), Some(8));
        assert_eq!(capacity_for(3), Some(8));
        assert_eq!(capacity_for(4), Some(16));
        assert_eq!(capacity_for(7), Some(16));
        assert_eq!(capacity_for(8), Some(32));
        assert_eq!(capacity_for(usize::MAX), None);
    }

    #[test]
    fn with_capacity_avoids_growth() {
        let mut m: HashMap<u64, u64, IntHasher> =
            HashMap::with_capacity_and_hasher(100, IntHasher::default());
        let cap = m.capacity();
        assert_eq!(cap, 256);
        for i in 0..100 {
            m.set(i, i * 2);
        }
        assert_eq!(m.capacity(), cap);
        assert_eq!(m.len(), 100);
    }

    #[test]
    fn reserve_grows_once() {
        let mut m: HashMap<Vec<u8>, usize, BytesHasher> = HashMap::default();
        m.set(b"x".to_vec(), 0);
        m.reserve(20);
        assert_eq!(m.capacity(), 64);
        assert_eq!(m.get(b"x".as_slice()), Some(&0));
        for i in 1..=20usize {
            m.set(i.to_le_bytes().to_vec(), i);
        }
        assert_eq!(m.capacity(), 64);

        // Already enough room: no change.
        m.reserve(1);
        assert_eq!(m.capacity(), 64);
    }

    #[test]
    fn try_reserve_reports_overflow() {
        let mut m: HashMap<String, i32> = HashMap::new();
        m.set("k".to_string(), 1);
        assert_eq!(
            m.try_reserve(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
        assert_eq!(m.capacity(), 8);
        assert_eq!(m.len(), 1);

        assert_eq!(m.try_reserve(10), Ok(()));
        assert_eq!(m.capacity(), 32);
        assert_eq!(m.get("K"), Some(&1));
    }

    #[test]
    fn try_reserve_error_display() {
        assert_eq!(
            TryReserveError::AllocError { capacity: 64 }.to_string(),
            "failed to allocate a hash table of 64 buckets"
        );
    }

    /// Invariant: a probe over a table with no empty bucket terminates.
    #[test]
    fn exhausted_probe_terminates() {
        let mut m: HashMap<u32, u32, IntHasher> = HashMap::default();
        m.set(1, 1);
        // Corrupt the table so nothing is empty.
        for bucket in m.buckets.iter_mut() {
            if matches!(bucket, Bucket::Empty) {
                *bucket = Bucket::Full(u32::MAX, 0);
            }
        }
        assert!(matches!(m.probe(&2u32), Probe::Exhausted));
        assert!(!m.contains(&2));
        assert!(m.contains(&1));
    }

    #[test]
    fn retain_leaves_tombstones() {
        let mut m: HashMap<u32, u32, IntHasher> = (0..6).map(|i| (i, i)).collect();
        let cap = m.capacity();
        m.retain(|k, v| {
            *v += 1;
            k % 2 == 0
        });
        assert_eq!(m.len(), 3);
        assert_eq!(m.deleted, 3);
        assert_eq!(m.capacity(), cap);
        assert_eq!(m.get(&2), Some(&3));
        assert_eq!(m.get(&3), None);
    }
}
