// HashTable integration suite (public API only).
//
// Each test states the behavior verified and the invariants it relies on.
// Core invariants exercised:
// - Uniqueness: duplicate insert is rejected and keeps the stored value.
// - Growth: a saturated chain doubles bucket count and limit; content survives.
// - Traversal: begin..end visits every entry once, skipping empty buckets.
// - Cursor validity: rehash and erase invalidate cursors, detectably.
// - Equality: same key set, independent of layout.
use chained_hashtable::{Cursor, HashTable, InsertError, MixedState, TableConfig, TableError};
use std::collections::BTreeSet;

fn table(min: usize, limit: usize) -> HashTable<u64, String> {
    HashTable::with_config(TableConfig::new(min, limit))
}

fn walk(t: &HashTable<u64, String>) -> Vec<u64> {
    let mut out = Vec::new();
    let mut c: Cursor = t.begin();
    while let Some(k) = c.key(t) {
        out.push(*k);
        c = t.next(c).expect("live cursor advances");
    }
    assert!(c.is_end());
    out
}

// Test: chain-length growth scenario.
// Assumes: integer keys hash to themselves; 1, 5 and 9 share bucket 1 of 4.
// Verifies: the third insert doubles to 8 buckets; all keys stay findable.
#[test]
fn colliding_keys_trigger_doubling() {
    let mut t = table(4, 2);
    for k in [1, 5] {
        t.insert(k, format!("v{k}")).unwrap();
    }
    assert_eq!(t.bucket_size(), 4);
    t.insert(9, "v9".to_string()).unwrap();
    assert_eq!(t.bucket_size(), 8);
    for k in [1, 5, 9] {
        assert_eq!(t.find(&k).and_then(|c| c.value(&t).cloned()), Some(format!("v{k}")));
    }
    assert_eq!(t.elems_count(), 3);
}

// Test: repeated saturation keeps doubling.
// Verifies: bucket count is min * 2^n and limit tracks it.
#[test]
fn repeated_growth_doubles_in_lockstep() {
    let mut t = table(4, 2);
    // All multiples of 64 collide until the table reaches 64 buckets.
    for i in 0..9u64 {
        t.insert(i * 64, String::new()).unwrap();
    }
    let n = t.bucket_size();
    assert!(n.is_power_of_two() && n > 4, "bucket count {n}");
    assert_eq!(t.chain_limit() * 4, n * 2);
    assert!(t.chain_len(0).unwrap() <= t.chain_limit());
    assert_eq!(t.len(), 9);
}

// Test: uniqueness and assignment.
#[test]
fn duplicate_then_assign() {
    let mut t = table(4, 2);
    t.insert(3, "one".into()).unwrap();
    assert_eq!(t.insert(3, "two".into()), Err(InsertError::DuplicateKey));
    assert_eq!(t.at(&3).map(String::as_str), Ok("one"));

    t.get_or_insert_default(3).push_str("+more");
    assert_eq!(t[&3], "one+more");
    assert_eq!(t.get_or_insert_default(4), "");
    assert_eq!(t.len(), 2);
}

// Test: traversal boundaries.
// Verifies: empty, first-bucket-only and last-bucket-only layouts.
#[test]
fn traversal_boundaries() {
    let t = table(4, 4);
    assert_eq!(t.begin(), t.end());
    assert!(walk(&t).is_empty());

    let mut t = table(4, 4);
    for k in [0, 4, 8] {
        t.insert(k, String::new()).unwrap();
    }
    assert_eq!(walk(&t), vec![0, 4, 8]);

    let mut t = table(4, 4);
    for k in [3, 7] {
        t.insert(k, String::new()).unwrap();
    }
    assert_eq!(walk(&t), vec![3, 7]);
    assert_eq!(t.iter().rev().map(|(k, _)| *k).collect::<Vec<_>>(), vec![7, 3]);
}

// Test: erase of the lone entry in bucket 0.
// Verifies: begin moves on and the later bucket is not skipped.
#[test]
fn erase_first_bucket_only_entry() {
    let mut t = table(4, 4);
    for k in [0, 2, 6] {
        t.insert(k, String::new()).unwrap();
    }
    let next = t.erase(t.begin()).unwrap();
    assert_eq!(next.key(&t), Some(&2));
    assert_eq!(walk(&t), vec![2, 6]);
}

// Test: iterator completeness after mixed inserts and erases.
#[test]
fn traversal_count_matches_elems_count() {
    let mut t = table(2, 1);
    for k in 0..100 {
        t.insert(k * 7 % 101, String::new()).unwrap();
    }
    for k in (0..100).step_by(3) {
        t.remove(&k);
    }
    let visited = walk(&t);
    let unique: BTreeSet<u64> = visited.iter().copied().collect();
    assert_eq!(visited.len(), t.elems_count());
    assert_eq!(unique.len(), visited.len());
    assert_eq!(t.len(), t.elems_count());
}

// Test: draining through erase's returned cursor.
// Verifies: repeated erase from begin empties the table in traversal order.
#[test]
fn erase_loop_drains_in_order() {
    let mut t = table(4, 2);
    for k in 0..12 {
        t.insert(k, String::new()).unwrap();
    }
    let expected = walk(&t);
    let mut drained = Vec::new();
    let mut c = t.begin();
    while !c.is_end() {
        drained.push(*c.key(&t).unwrap());
        c = t.erase(c).unwrap();
    }
    assert_eq!(drained, expected);
    assert!(t.is_empty());
    // The bucket array does not shrink on deletion.
    assert!(t.bucket_size() > 4);
}

// Test: checked invalidation.
#[test]
fn stale_cursors_are_reported() {
    let mut t = table(4, 2);
    let c = t.insert(1, String::new()).unwrap();
    t.resize(16);
    assert_eq!(t.entry_at(c), Err(TableError::InvalidatedCursor));

    let c = t.find(&1).unwrap();
    assert!(t.remove(&1).is_some());
    assert_eq!(t.next(c), Err(TableError::InvalidatedCursor));
    assert!(c.key(&t).is_none());
}

// Test: error taxonomy surfaces to callers as std errors.
#[test]
fn errors_propagate_with_question_mark() -> Result<(), Box<dyn std::error::Error>> {
    let mut t = table(4, 2);
    t.insert(1, "x".into())?;
    assert_eq!(t.at(&1)?, "x");
    let missing: Result<&String, TableError> = t.at(&2);
    assert_eq!(missing.unwrap_err().to_string(), "no entry for key");
    assert!(t.insert(1, "y".into()).is_err());
    Ok(())
}

// Test: copy and equality.
// Verifies: clones are independent; equality ignores layout and values.
#[test]
fn clone_and_equality() {
    let mut a = table(4, 2);
    for k in 0..10 {
        a.insert(k, k.to_string()).unwrap();
    }
    let mut b = a.clone();
    assert_eq!(a, b);
    b.insert_or_assign(0, "changed".into());
    assert_eq!(a, b, "values are not part of equality");
    assert_eq!(a[&0], "0");

    let mut c = table(16, 4);
    c.extend((0..10).rev().map(|k| (k, String::new())));
    assert_ne!(c.bucket_size(), a.bucket_size());
    assert_eq!(a, c);
    b.remove(&9);
    assert_ne!(a, b);
}

// Test: a stronger hasher plugs in without changing behavior.
#[test]
fn mixed_state_table() {
    let mut t: HashTable<String, usize, MixedState> =
        HashTable::with_config_and_hasher(TableConfig::new(4, 2), MixedState::default());
    for i in 0..1000 {
        t.insert(format!("key-{i}"), i).unwrap();
    }
    assert_eq!(t.len(), 1000);
    assert_eq!(t.iter().count(), 1000);
    for i in (0..1000).step_by(97) {
        assert_eq!(t.get(format!("key-{i}").as_str()), Some(&i));
    }
}

// Test: owned iteration returns every entry.
#[test]
fn into_iter_returns_all_entries() {
    let t: HashTable<u64, u64> = (0..50).map(|k| (k, k * k)).collect();
    let mut pairs: Vec<(u64, u64)> = t.into_iter().collect();
    pairs.sort_unstable();
    assert_eq!(pairs.len(), 50);
    assert!(pairs.iter().all(|&(k, v)| v == k * k));
}

// Test: cursor accessors fold end and stale into None; entry_at tells them apart.
// Assumes: growth bumps the epoch and invalidates earlier cursors.
#[test]
fn entry_at_distinguishes_end_from_stale() {
    let mut t = table(4, 2);
    let c = t.insert(1, "one".into()).unwrap();
    let end = t.end();
    assert_eq!(end.key(&t), None);
    assert_eq!(t.entry_at(end), Err(TableError::OutOfRange));

    t.insert(5, String::new()).unwrap();
    t.insert(9, String::new()).unwrap(); // grows
    assert_eq!(c.key(&t), None);
    assert_eq!(c.value(&t), None);
    assert_eq!(t.entry_at(c), Err(TableError::InvalidatedCursor));
}

// Test: shrinking does not loosen the chain bound for later inserts.
// Verifies: limit tracks the bucket count after resize, clear and refill.
#[test]
fn shrink_then_refill_stays_bounded() {
    let config = TableConfig::new(2, 1);
    let mut t: HashTable<u64, ()> = HashTable::with_config(config);
    for k in 0..200 {
        t.insert(k, ()).unwrap();
    }
    t.resize(1);
    t.clear();
    for k in 0..200 {
        t.insert(k, ()).unwrap();
    }
    let n = t.bucket_size();
    assert_eq!(t.chain_limit(), n / 2);
    let longest = (0..n).filter_map(|b| t.chain_len(b)).max().unwrap();
    assert!(longest <= t.chain_limit(), "longest {longest}");
}
