// HashMap property tests over the public API.
//
// Property 1: integer keys behave exactly like std's HashMap.
//  - Model: std::collections::HashMap<u32, u64>.
//  - Operations: set, delete, get, clear; keys drawn from a small range so
//    updates and deletes of present keys are frequent.
//  - Invariant after each step: len parity, capacity power of two >= 8,
//    len * 2 < capacity, get parity for the touched key.
//
// Property 2: text keys are found under any casing.
//  - Every key inserted with one casing reads back under upper and lower
//    case, and the table holds one entry per folded key.
use casefold_hashmap::{HashMap, IntHasher};
use proptest::prelude::*;
use std::collections::{HashMap as StdHashMap, HashSet};

proptest! {
    #[test]
    fn prop_int_keys_match_model(ops in proptest::collection::vec((0u8..=3u8, 0u32..64u32, any::<u64>()), 1..300)) {
        let mut m: HashMap<u32, u64, IntHasher> = HashMap::default();
        let mut model: StdHashMap<u32, u64> = StdHashMap::new();

        for (op, k, v) in ops {
            match op {
                0 | 1 => {
                    m.set(k, v);
                    model.insert(k, v);
                }
                2 => {
                    prop_assert_eq!(m.delete(&k), model.remove(&k).is_some());
                }
                3 => {
                    if v % 16 == 0 {
                        m.clear();
                        model.clear();
                        prop_assert_eq!(m.capacity(), 8);
                    }
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.get(&k), model.get(&k));
            prop_assert_eq!(m.len(), model.len());
            prop_assert!(m.capacity().is_power_of_two() && m.capacity() >= 8);
            prop_assert!(m.len() * 2 < m.capacity());
        }

        for (k, v) in &m {
            prop_assert_eq!(model.get(k), Some(v));
        }
    }

    #[test]
    fn prop_text_keys_ignore_case(keys in proptest::collection::vec("[a-zA-Z0-9-]{1,24}", 1..64)) {
        let mut m: HashMap<String, usize> = HashMap::new();
        for (i, k) in keys.iter().enumerate() {
            m.set(k.clone(), i);
        }

        let folded: HashSet<String> = keys.iter().map(|k| k.to_ascii_lowercase()).collect();
        prop_assert_eq!(m.len(), folded.len());

        for k in &keys {
            let last = keys
                .iter()
                .rposition(|o| o.eq_ignore_ascii_case(k))
                .unwrap();
            prop_assert_eq!(m.get(k.to_ascii_uppercase().as_str()), Some(&last));
            prop_assert_eq!(m.get(k.to_ascii_lowercase().as_str()), Some(&last));
        }
    }
}
