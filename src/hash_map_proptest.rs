#![cfg(test)]

// State-machine property tests for HashMap kept inside the crate so they can
// read table statistics without the `stats` feature.

use core::hash::BuildHasherDefault;
use core::hash::Hasher;
use std::collections::BTreeMap;
use std::collections::HashMap as StdHashMap;
use std::collections::HashSet;
use std::string::String;
use std::vec::Vec;

use proptest::prelude::*;

use crate::HashMap;
use crate::KeyNotFound;

// Identity hashing makes neighbouring keys land in neighbouring buckets, so
// small key ranges build long clusters and exercise displacement swaps and
// backward shifts far more than a random hash would.
#[derive(Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.0 = (self.0 << 8) | u64::from(byte);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

type IdentityState = BuildHasherDefault<IdentityHasher>;

#[derive(Clone, Debug)]
enum Op {
    Insert(u64, i32),
    Remove(u64),
    Find(u64),
    At(u64),
    Upsert(u64, i32),
    Mutate(u64, i32),
    Iterate,
    Drain,
    Clear,
}

fn arb_ops(key_space: u64) -> impl Strategy<Value = Vec<Op>> {
    let key = 0..key_space;
    let op = prop_oneof![
        6 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        4 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Find),
        1 => key.clone().prop_map(Op::At),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Upsert(k, v)),
        1 => (key, any::<i32>()).prop_map(|(k, d)| Op::Mutate(k, d)),
        1 => Just(Op::Iterate),
        1 => Just(Op::Drain),
        1 => Just(Op::Clear),
    ];
    proptest::collection::vec(op, 1..300)
}

fn check_shape(sut: &HashMap<u64, i32, IdentityState>) -> Result<(), TestCaseError> {
    let cap = sut.capacity();
    prop_assert!(cap == 0 || cap.is_power_of_two(), "capacity {} not a power of two", cap);
    prop_assert!(cap != 1);
    if !sut.is_empty() {
        prop_assert!(sut.len() * 5 <= cap * 4, "over max load: {} in {}", sut.len(), cap);
        prop_assert!(sut.len() * 5 > cap, "under min load: {} in {}", sut.len(), cap);
    }
    prop_assert_eq!(sut.iter().count(), sut.len());
    prop_assert_eq!(sut.probe_histogram().total(), sut.len());
    Ok(())
}

fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut: HashMap<u64, i32, IdentityState> = HashMap::default();
    let mut model: StdHashMap<u64, i32> = StdHashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let fresh = !model.contains_key(&k);
                prop_assert_eq!(sut.insert(k, v), fresh);
                if fresh {
                    model.insert(k, v);
                }
            }
            Op::Remove(k) => {
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(!sut.contains_key(&k));
            }
            Op::Find(k) => {
                prop_assert_eq!(sut.find(&k), model.get_key_value(&k));
            }
            Op::At(k) => {
                prop_assert_eq!(sut.at(&k), model.get(&k).ok_or(KeyNotFound));
            }
            Op::Upsert(k, v) => {
                let slot = sut.get_or_insert_default(k);
                *slot = slot.wrapping_add(v.signum());
                let slot = model.entry(k).or_default();
                *slot = slot.wrapping_add(v.signum());
            }
            Op::Mutate(k, d) => {
                if let Some(v) = sut.get_mut(&k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(&k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Iterate => {
                let seen: BTreeMap<u64, i32> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                let expected: BTreeMap<u64, i32> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(seen, expected);
            }
            Op::Drain => {
                let drained: BTreeMap<u64, i32> = sut.drain().collect();
                let expected: BTreeMap<u64, i32> = model.drain().collect();
                prop_assert_eq!(drained, expected);
                prop_assert_eq!(sut.capacity(), 0);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), 0);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        check_shape(&sut)?;
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_dense_keys_match_model(ops in arb_ops(48)) {
        run(ops)?;
    }

    #[test]
    fn prop_sparse_keys_match_model(ops in arb_ops(4096)) {
        run(ops)?;
    }

    // Growing from empty then removing everything must walk capacity back
    // down without ever breaking the load bounds.
    #[test]
    fn prop_fill_then_empty(keys in proptest::collection::hash_set(any::<u64>(), 1..400)) {
        let mut sut: HashMap<u64, i32, IdentityState> = HashMap::default();
        let mut peak = 0;
        for &k in &keys {
            prop_assert!(sut.insert(k, 0));
            check_shape(&sut)?;
            peak = peak.max(sut.capacity());
        }
        prop_assert_eq!(sut.len(), keys.len());

        for &k in &keys {
            prop_assert_eq!(sut.remove(&k), Some(0));
            check_shape(&sut)?;
        }
        prop_assert!(sut.is_empty());
        prop_assert!(sut.capacity() <= 4 && sut.capacity() <= peak);
    }

    #[test]
    fn prop_string_keys_borrowed_lookup(keys in proptest::collection::vec("[a-z]{0,6}", 1..64)) {
        let mut sut: HashMap<String, usize> = HashMap::new();
        let mut unique = HashSet::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(sut.insert(k.clone(), i), unique.insert(k.clone()));
        }
        for k in &keys {
            let first = keys.iter().position(|other| other == k);
            prop_assert_eq!(sut.get(k.as_str()).copied(), first);
        }
        prop_assert_eq!(sut.len(), unique.len());
    }
}
