#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// structural invariants through `assert_invariants`.

use crate::config::TableConfig;
use crate::error::{InsertError, TableError};
use crate::table::HashTable;
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations: indices shrink toward earlier keys, the pool
// shrinks in length and op lists shrink in count.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    InsertWith(usize, i32),
    InsertOrAssign(usize, i32),
    Bump(usize, i32),
    EraseKey(usize),
    EraseAtCursor(usize),
    Find(usize),
    Contains(String),
    Resize(usize),
    Clear,
    Walk,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=10).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::InsertWith(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::InsertOrAssign(i, v)),
            2 => (idx.clone(), -5i32..5).prop_map(|(i, d)| Op::Bump(i, d)),
            2 => idx.clone().prop_map(Op::EraseKey),
            2 => idx.clone().prop_map(Op::EraseAtCursor),
            2 => idx.clone().prop_map(Op::Find),
            1 => prop_oneof![contains_pool, "[a-z]{0,4}"].prop_map(Op::Contains),
            1 => (0usize..40).prop_map(Op::Resize),
            1 => Just(Op::Clear),
            1 => Just(Op::Walk),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives `sut` and a std HashMap model through the same operations.
// Invariants exercised after every step:
// - Unique keys: duplicate inserts are rejected and leave the value alone.
// - Lookup round-trip and `contains_key` parity with the model.
// - Cardinality: `len() == elems_count() == model.len() == traversal count`.
// - Structure: chains route by hash, links agree, no chain exceeds the limit.
// - Cursors: a forward walk and a backward walk visit the same sequence.
fn run_scenario<S: BuildHasher>(
    mut sut: HashTable<String, i32, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let default_calls = Rc::new(Cell::new(0));

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.get(&k).copied();
                match sut.insert(k.clone(), v) {
                    Ok(c) => {
                        prop_assert!(already.is_none(), "insert must fail on duplicate");
                        prop_assert_eq!(c.value(&sut), Some(&v));
                        model.insert(k, v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already.is_some(), "duplicate error only when key exists");
                        prop_assert_eq!(sut.get(&k).copied(), already);
                    }
                }
            }
            Op::InsertWith(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                let counter = default_calls.clone();
                let before = counter.get();
                match sut.insert_with(k.clone(), move || {
                    counter.set(counter.get() + 1);
                    v
                }) {
                    Ok(_) => {
                        prop_assert!(!already);
                        prop_assert_eq!(default_calls.get(), before + 1);
                        model.insert(k, v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already);
                        prop_assert_eq!(default_calls.get(), before);
                    }
                }
            }
            Op::InsertOrAssign(i, v) => {
                let k = pool[i].clone();
                let c = sut.insert_or_assign(k.clone(), v);
                prop_assert_eq!(c.key(&sut), Some(&k));
                model.insert(k, v);
            }
            Op::Bump(i, d) => {
                let k = pool[i].clone();
                let slot = sut.get_or_insert_default(k.clone());
                *slot = slot.saturating_add(d);
                let m = model.entry(k).or_default();
                *m = m.saturating_add(d);
            }
            Op::EraseKey(i) => {
                let k = &pool[i];
                let next = sut.erase_key(k.as_str());
                if model.remove(k).is_none() {
                    prop_assert!(next.is_end());
                }
                prop_assert!(!sut.contains_key(k.as_str()));
            }
            Op::EraseAtCursor(i) => {
                let k = &pool[i];
                match sut.find(k.as_str()) {
                    Some(c) => {
                        // The successor of `c` before the erase is what erase returns.
                        let expected = sut.next(c).map_err(|e| TestCaseError::fail(e.to_string()))?;
                        let expected_key = expected.key(&sut).cloned();
                        let next = sut.erase(c).map_err(|e| TestCaseError::fail(e.to_string()))?;
                        prop_assert_eq!(next.key(&sut).cloned(), expected_key);
                        prop_assert_eq!(sut.erase(c), Err(TableError::InvalidatedCursor));
                        prop_assert!(model.remove(k).is_some());
                    }
                    None => prop_assert!(!model.contains_key(k)),
                }
            }
            Op::Find(i) => {
                let k = &pool[i];
                let found = sut.find(k.as_str());
                prop_assert_eq!(found.is_some(), model.contains_key(k));
                if let Some(c) = found {
                    prop_assert_eq!(c.value(&sut), model.get(k));
                    prop_assert_eq!(c.bucket(), sut.bucket(k.as_str()));
                }
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
                prop_assert_eq!(sut.at(s.as_str()).ok(), model.get(&s));
            }
            Op::Resize(n) => {
                let stale = sut.begin();
                sut.resize(n);
                let target = n.max(sut.config().min_buckets());
                let buckets = sut.bucket_size();
                prop_assert!(buckets >= target && buckets % target == 0);
                prop_assert!((buckets / target).is_power_of_two());
                prop_assert_eq!(sut.chain_limit(), sut.config().limit_for(buckets));
                prop_assert_eq!(sut.next(stale), Err(TableError::InvalidatedCursor));
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Walk => {
                let mut fwd = Vec::new();
                let mut c = sut.begin();
                while !c.is_end() {
                    fwd.push(c.key(&sut).cloned().unwrap_or_default());
                    c.move_next(&sut).map_err(|e| TestCaseError::fail(e.to_string()))?;
                }
                let mut bwd = Vec::new();
                while c.move_prev(&sut).is_ok() {
                    bwd.push(c.key(&sut).cloned().unwrap_or_default());
                }
                bwd.reverse();
                prop_assert_eq!(&fwd, &bwd);
                let iterated: Vec<String> = sut.keys().cloned().collect();
                prop_assert_eq!(&fwd, &iterated);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.elems_count(), model.len());
        prop_assert_eq!(sut.iter().count(), model.len());
        let s_keys: BTreeSet<&String> = sut.keys().collect();
        let m_keys: BTreeSet<&String> = model.keys().collect();
        prop_assert_eq!(s_keys, m_keys);
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k.as_str()), Some(v));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(HashTable::with_config(TableConfig::new(2, 1)), pool, ops)?;
    }
}

// Collision variant: every key hashes to 0, so all entries share one chain
// and every saturation doubles the table.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = HashTable::with_config_and_hasher(TableConfig::new(3, 2), ConstBuildHasher);
        run_scenario(sut, pool, ops)?;
    }
}

// Property: after inserting distinct integer keys with the deterministic
// hasher, every key remains findable with its value however many growth
// steps happened, and the longest chain never exceeds the limit.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_content(
        keys in proptest::collection::btree_set(0u64..10_000, 0..300),
        min in 1usize..16,
        limit in 1usize..6,
    ) {
        let mut t: HashTable<u64, u64> = HashTable::with_config(TableConfig::new(min, limit));
        for &k in &keys {
            prop_assert!(t.insert(k, k * 3).is_ok());
        }
        t.assert_invariants();
        prop_assert!(t.bucket_size() >= min);
        prop_assert_eq!(t.elems_count(), keys.len());
        for &k in &keys {
            prop_assert_eq!(t.get(&k), Some(&(k * 3)));
        }
        let longest = (0..t.bucket_size()).filter_map(|b| t.chain_len(b)).max().unwrap_or(0);
        prop_assert!(longest <= t.chain_limit());
    }
}
