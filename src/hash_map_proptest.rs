#![cfg(test)]

// Property tests for HashMap kept inside the crate so they can observe
// tombstone bookkeeping.

use crate::hash_map::{HashMap, INITIAL_CAPACITY};
use crate::key_hasher::KeyHasher;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap as StdHashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Insert(usize, i32),
    Get(usize),
    Contains(String),
    Delete(usize),
    Remove(usize),
    Mutate(usize, i32),
    Retain(i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-zA-Z]{0,4}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s.to_uppercase()),
                "[a-zA-Z]{0,4}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => idx.clone().prop_map(OpI::Delete),
            1 => idx.clone().prop_map(OpI::Remove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => any::<i32>().prop_map(OpI::Retain),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_invariants<K, V, H>(sut: &HashMap<K, V, H>) -> Result<(), TestCaseError> {
    let cap = sut.capacity();
    prop_assert!(cap.is_power_of_two());
    prop_assert!(cap >= INITIAL_CAPACITY);
    prop_assert!(sut.len() * 2 < cap, "len {} cap {}", sut.len(), cap);
    prop_assert!((sut.len() + sut.tombstones()) * 2 < cap);
    prop_assert_eq!(sut.iter().count(), sut.len());
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap keyed
// by the lowercased text.
// Invariants exercised across random operation sequences:
// - `set`/`insert` update in place for case variants of a present key.
// - `get`/`contains` parity with the model, including after deletions.
// - `delete`/`remove` report presence exactly like the model.
// - `iter` yields each live entry once; the folded key set equals the model's.
// - Capacity stays a power of two >= 8 with the load factor under 50%.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: HashMap<String, i32> = HashMap::new();
        let mut model: StdHashMap<String, i32> = StdHashMap::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    sut.set(pool[i].clone(), v);
                    model.insert(pool[i].to_lowercase(), v);
                }
                OpI::Insert(i, v) => {
                    let prev = sut.insert(pool[i].clone(), v);
                    let mprev = model.insert(pool[i].to_lowercase(), v);
                    prop_assert_eq!(prev, mprev);
                }
                OpI::Get(i) => {
                    prop_assert_eq!(sut.get(pool[i].as_str()), model.get(&pool[i].to_lowercase()));
                    let (v, found) = sut.get_or_default(pool[i].as_str());
                    let expected = model.get(&pool[i].to_lowercase());
                    prop_assert_eq!(found, expected.is_some());
                    prop_assert_eq!(v, expected.copied().unwrap_or_default());
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains(s.as_str()), model.contains_key(&s.to_lowercase()));
                }
                OpI::Delete(i) => {
                    let deleted = sut.delete(pool[i].as_str());
                    prop_assert_eq!(deleted, model.remove(&pool[i].to_lowercase()).is_some());
                }
                OpI::Remove(i) => {
                    let removed = sut.remove(pool[i].to_uppercase().as_str());
                    prop_assert_eq!(removed, model.remove(&pool[i].to_lowercase()));
                }
                OpI::Mutate(i, d) => {
                    if let Some(v) = sut.get_mut(pool[i].as_str()) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(&pool[i].to_lowercase()) {
                        *v = v.wrapping_add(d);
                    }
                }
                OpI::Retain(pivot) => {
                    sut.retain(|_, v| *v >= pivot);
                    model.retain(|_, v| *v >= pivot);
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), INITIAL_CAPACITY);
                }
                OpI::Iterate => {
                    let s: BTreeMap<String, i32> =
                        sut.iter().map(|(k, v)| (k.to_lowercase(), *v)).collect();
                    let m: BTreeMap<String, i32> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(s, m);
                }
            }

            check_invariants(&sut)?;
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Every key hashes to the same code, so each one sits on the probe path of
// all keys inserted before it.
#[derive(Clone, Default)]
struct ConstHasher;

impl KeyHasher<u16> for ConstHasher {
    fn hash(&self, _key: &u16) -> u32 {
        1
    }
    fn equal(&self, a: &u16, b: &u16) -> bool {
        a == b
    }
}

// Property: under total collision, deleting any subset of keys never hides
// the remaining ones (tombstones keep probe paths intact).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_deletes_keep_colliding_keys_reachable(
        keys in proptest::collection::btree_set(any::<u16>(), 1..40),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..40),
    ) {
        let keys: Vec<u16> = keys.into_iter().collect();
        let mut sut: HashMap<u16, u16, ConstHasher> = HashMap::default();
        for &k in &keys {
            sut.set(k, k.wrapping_mul(3));
        }

        let mut gone = BTreeSet::new();
        for pick in picks {
            let k = *pick.get(&keys);
            prop_assert_eq!(sut.delete(&k), gone.insert(k));
            check_invariants(&sut)?;
            for &other in &keys {
                if gone.contains(&other) {
                    prop_assert!(!sut.contains(&other));
                } else {
                    prop_assert_eq!(sut.get(&other), Some(&other.wrapping_mul(3)));
                }
            }
        }

        // Re-inserting deleted keys reuses tombstones and keeps every key unique.
        for &k in &gone {
            sut.set(k, 0);
        }
        prop_assert_eq!(sut.len(), keys.len());
        let seen: BTreeSet<u16> = sut.keys().copied().collect();
        prop_assert_eq!(seen.len(), keys.len());
        check_invariants(&sut)?;
    }
}
