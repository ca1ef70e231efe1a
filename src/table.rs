//! HashTable: separate chaining with chain-length triggered growth.

use crate::chain::{Arena, Chain, NodeKey};
use crate::config::TableConfig;
use crate::cursor::{self, Cursor, Position};
use crate::error::{InsertError, TableError};
use crate::guard::BusyFlag;
use crate::hasher::{bucket_index, hash_key, ChainState};
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;

/// A key/value map over a bucket array of collision chains.
///
/// Keys are unique: inserting a key that is already stored is rejected
/// and leaves the stored value untouched. Replacement goes through
/// `insert_or_assign`, `get_or_insert_default` or a mutable lookup.
///
/// The bucket count starts at `TableConfig::min_buckets` and only grows,
/// by doubling, when an insertion targets a chain that already holds
/// `chain_limit()` entries. The limit doubles along with it, and every
/// entry is redistributed in one pass. `resize` is the only way to pick
/// another bucket count, including a smaller one.
pub struct HashTable<K, V, S = ChainState> {
    hasher: S,
    config: TableConfig,
    arena: Arena<K, V>,
    chains: Vec<Chain>,
    limit: usize,
    // Bumped whenever the bucket array is rebuilt or emptied; cursors carry
    // the epoch they were made in.
    epoch: u64,
    busy: BusyFlag,
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(ChainState)
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self::with_config_and_hasher(config, ChainState)
    }
}

impl<K, V, S> Default for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> HashTable<K, V, S> {
    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of stored entries, counted chain by chain. O(bucket count).
    pub fn elems_count(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }

    /// Current bucket count.
    pub fn bucket_size(&self) -> usize {
        self.chains.len()
    }

    /// Length of the chain in bucket `index`.
    pub fn chain_len(&self, index: usize) -> Option<usize> {
        self.chains.get(index).map(Chain::len)
    }

    /// Chain length at which the next insertion into that chain grows the
    /// table.
    pub fn chain_limit(&self) -> usize {
        self.limit
    }

    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.bucket_size() as f32
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.chains, &self.arena)
    }

    /// Mutable iteration. Visits every entry once, in unspecified order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.arena)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Cursor at the first entry, or `end()` when empty.
    pub fn begin(&self) -> Cursor {
        Cursor::new(cursor::begin(&self.chains), self.epoch)
    }

    pub fn end(&self) -> Cursor {
        Cursor::new(Position::end(&self.chains), self.epoch)
    }

    fn check(&self, c: Cursor) -> Result<(), TableError> {
        if c.epoch != self.epoch || c.pos.bucket >= self.chains.len() {
            return Err(TableError::InvalidatedCursor);
        }
        let live = match c.node() {
            None => c.pos.bucket == self.chains.len() - 1,
            Some(n) => self
                .arena
                .get(n)
                .map(|node| bucket_index(node.hash, self.chains.len()) == c.pos.bucket)
                .unwrap_or(false),
        };
        if live {
            Ok(())
        } else {
            Err(TableError::InvalidatedCursor)
        }
    }

    /// Cursor following `c`. Advancing from end is `OutOfRange`.
    pub fn next(&self, c: Cursor) -> Result<Cursor, TableError> {
        self.check(c)?;
        cursor::advance(&self.chains, &self.arena, c.pos)
            .map(|pos| Cursor::new(pos, self.epoch))
            .ok_or(TableError::OutOfRange)
    }

    /// Cursor preceding `c`. Retreating from end yields the last entry;
    /// retreating from the first entry is `OutOfRange`.
    pub fn prev(&self, c: Cursor) -> Result<Cursor, TableError> {
        self.check(c)?;
        cursor::retreat(&self.chains, &self.arena, c.pos)
            .map(|pos| Cursor::new(pos, self.epoch))
            .ok_or(TableError::OutOfRange)
    }

    pub fn entry_at(&self, c: Cursor) -> Result<(&K, &V), TableError> {
        self.check(c)?;
        let node = c.node().ok_or(TableError::OutOfRange)?;
        let n = &self.arena[node];
        Ok((&n.key, &n.value))
    }

    pub fn entry_at_mut(&mut self, c: Cursor) -> Result<(&K, &mut V), TableError> {
        self.check(c)?;
        let node = c.node().ok_or(TableError::OutOfRange)?;
        let n = &mut self.arena[node];
        Ok((&n.key, &mut n.value))
    }

    /// First entry in traversal order.
    pub fn front(&self) -> Result<(&K, &V), TableError> {
        match cursor::begin(&self.chains).node {
            Some(node) => {
                let n = &self.arena[node];
                Ok((&n.key, &n.value))
            }
            None => Err(TableError::Empty),
        }
    }

    /// Last entry in traversal order.
    pub fn back(&self) -> Result<(&K, &V), TableError> {
        match cursor::seek_backward(&self.chains, self.chains.len()).and_then(|p| p.node) {
            Some(node) => {
                let n = &self.arena[node];
                Ok((&n.key, &n.value))
            }
            None => Err(TableError::Empty),
        }
    }

    /// Removes the entry at `c` and returns a cursor to the entry that
    /// followed it, which may sit in a later bucket or be end.
    pub fn erase(&mut self, c: Cursor) -> Result<Cursor, TableError> {
        self.check(c)?;
        let node = c.node().ok_or(TableError::OutOfRange)?;
        Ok(self.erase_node(c.pos.bucket, node))
    }

    /// Erases `[first, last)`. Both cursors are checked, and `last` must be
    /// reachable from `first`, before anything is removed.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor, TableError> {
        self.check(first)?;
        self.check(last)?;
        let mut probe = first.pos;
        while probe.node != last.pos.node {
            probe = cursor::advance(&self.chains, &self.arena, probe).ok_or(TableError::OutOfRange)?;
        }
        let mut cur = first;
        while cur != last {
            let node = cur.node().ok_or(TableError::OutOfRange)?;
            cur = self.erase_node(cur.pos.bucket, node);
        }
        Ok(cur)
    }

    fn erase_node(&mut self, bucket: usize, node: NodeKey) -> Cursor {
        let (next, _removed) = self.chains[bucket].erase(&mut self.arena, node);
        let pos = match next {
            Some(n) => Position {
                bucket,
                node: Some(n),
            },
            None => cursor::seek_forward(&self.chains, bucket + 1),
        };
        Cursor::new(pos, self.epoch)
    }

    /// Sets the bucket count to `max(buckets, min_buckets)` and
    /// redistributes every entry. This is the only way to shrink.
    ///
    /// A shrink that would leave some chain over the limit for the new
    /// count keeps doubling from there until every chain fits, the same
    /// count re-inserting the entries one by one would reach.
    pub fn resize(&mut self, buckets: usize) {
        let mut target = buckets.max(self.config.min_buckets());
        loop {
            self.limit = self.config.limit_for(target);
            self.rebuild(target);
            if self.chains.iter().all(|c| c.len() <= self.limit) {
                break;
            }
            target = target.saturating_mul(2);
        }
    }

    /// Grows to `buckets` if that is more than the current count.
    pub fn reserve(&mut self, buckets: usize) {
        if buckets > self.bucket_size() {
            self.resize(buckets);
        }
    }

    /// Redistributes every entry at the current bucket count.
    pub fn rehash(&mut self) {
        self.rebuild(self.chains.len());
    }

    /// Removes every entry, keeping the bucket count.
    pub fn clear(&mut self) {
        for chain in self.chains.iter_mut() {
            chain.clear(&mut self.arena);
        }
        debug_assert!(self.arena.is_empty());
        self.epoch = self.epoch.wrapping_add(1);
        tracing::trace!(buckets = self.chains.len(), "cleared table");
    }

    /// Removes every entry and returns the bucket count and chain limit to
    /// their configured minimums.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.chains = vec![Chain::new(); self.config.min_buckets()];
        self.limit = self.config.chain_limit();
        self.epoch = self.epoch.wrapping_add(1);
        tracing::trace!(buckets = self.chains.len(), limit = self.limit, "reset table");
    }

    // Relinks every node into a fresh bucket array of `buckets` chains using
    // the cached hashes. No user code runs and no entry moves in memory.
    fn rebuild(&mut self, buckets: usize) {
        let from = self.chains.len();
        let mut chains = vec![Chain::new(); buckets];
        for chain in self.chains.iter_mut() {
            for node in chain.take_nodes(&self.arena) {
                let b = bucket_index(self.arena[node].hash, buckets);
                chains[b].append(&mut self.arena, node);
            }
        }
        self.chains = chains;
        self.epoch = self.epoch.wrapping_add(1);
        tracing::debug!(
            from,
            to = buckets,
            limit = self.limit,
            entries = self.arena.len(),
            "rehashed bucket array"
        );
    }

    // Appends an entry whose key is known to be absent, growing first if the
    // target chain is saturated.
    fn insert_unique(&mut self, key: K, value: V, hash: u64) -> (usize, NodeKey) {
        let mut bucket = bucket_index(hash, self.chains.len());
        let chain_len = self.chains[bucket].len();
        if chain_len >= self.limit {
            tracing::trace!(bucket, chain_len, limit = self.limit, "chain saturated, growing");
            let grown = self.chains.len().saturating_mul(2);
            self.limit = self.config.limit_for(grown);
            self.rebuild(grown);
            bucket = bucket_index(hash, self.chains.len());
        }
        let node = self.chains[bucket].push_back(&mut self.arena, key, value, hash);
        (bucket, node)
    }

    fn cursor_for(&self, bucket: usize, node: NodeKey) -> Cursor {
        Cursor::new(
            Position {
                bucket,
                node: Some(node),
            },
            self.epoch,
        )
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let n = self.chains.len();
        assert!(n >= self.config.min_buckets());
        assert_eq!(self.elems_count(), self.arena.len());
        for (b, chain) in self.chains.iter().enumerate() {
            assert!(chain.len() <= self.limit, "chain {b} longer than limit");
            let nodes: Vec<NodeKey> = chain.iter(&self.arena).collect();
            assert_eq!(nodes.len(), chain.len());
            let mut back: Vec<NodeKey> = chain.iter(&self.arena).rev().collect();
            back.reverse();
            assert_eq!(nodes, back, "prev links disagree with next links");
            for k in nodes {
                assert_eq!(bucket_index(self.arena[k].hash, n), b);
            }
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config_and_hasher(TableConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Self {
        let config = config.sanitized();
        Self {
            hasher,
            config,
            arena: Arena::with_key(),
            chains: vec![Chain::new(); config.min_buckets()],
            limit: config.chain_limit(),
            epoch: 0,
            busy: BusyFlag::new(),
        }
    }

    // Hash, bucket and node of `q`. Runs user `Hash`/`Eq`; callers hold the
    // busy guard.
    fn locate<Q>(&self, q: &Q) -> (u64, usize, Option<NodeKey>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = hash_key(&self.hasher, q);
        let bucket = bucket_index(hash, self.chains.len());
        (hash, bucket, self.chains[bucket].find(&self.arena, hash, q))
    }

    /// Bucket index `q` routes to under the current bucket count.
    pub fn bucket<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let _g = self.busy.enter("bucket");
        bucket_index(hash_key(&self.hasher, q), self.chains.len())
    }

    /// Inserts a new entry. A key that is already present is rejected with
    /// `DuplicateKey` and the stored value is kept.
    pub fn insert(&mut self, key: K, value: V) -> Result<Cursor, InsertError> {
        let (hash, _, found) = {
            let _g = self.busy.enter("insert");
            self.locate(&key)
        };
        if found.is_some() {
            return Err(InsertError::DuplicateKey);
        }
        let (bucket, node) = self.insert_unique(key, value, hash);
        Ok(self.cursor_for(bucket, node))
    }

    /// Like `insert`, but only builds the value when the key is absent.
    pub fn insert_with<F>(&mut self, key: K, default: F) -> Result<Cursor, InsertError>
    where
        F: FnOnce() -> V,
    {
        let (hash, _, found) = {
            let _g = self.busy.enter("insert_with");
            self.locate(&key)
        };
        if found.is_some() {
            return Err(InsertError::DuplicateKey);
        }
        let (bucket, node) = self.insert_unique(key, default(), hash);
        Ok(self.cursor_for(bucket, node))
    }

    /// Overwrites the value of an existing key, or inserts a new entry.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Cursor {
        let (hash, bucket, found) = {
            let _g = self.busy.enter("insert_or_assign");
            self.locate(&key)
        };
        match found {
            Some(node) => {
                self.arena[node].value = value;
                self.cursor_for(bucket, node)
            }
            None => {
                let (bucket, node) = self.insert_unique(key, value, hash);
                self.cursor_for(bucket, node)
            }
        }
    }

    /// Mutable access to the value of `key`, inserting `V::default()` first
    /// if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (hash, _, found) = {
            let _g = self.busy.enter("get_or_insert_default");
            self.locate(&key)
        };
        let node = match found {
            Some(node) => node,
            None => self.insert_unique(key, V::default(), hash).1,
        };
        &mut self.arena[node].value
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Cursor>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.busy.enter("find");
        let (_, bucket, found) = self.locate(q);
        found.map(|node| self.cursor_for(bucket, node))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.busy.enter("get");
        let (_, _, found) = self.locate(q);
        found.map(|node| &self.arena[node].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.busy.enter("get_key_value");
        let (_, _, found) = self.locate(q);
        found.map(|node| {
            let n = &self.arena[node];
            (&n.key, &n.value)
        })
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, _, found) = {
            let _g = self.busy.enter("get_mut");
            self.locate(q)
        };
        match found {
            Some(node) => Some(&mut self.arena[node].value),
            None => None,
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.busy.enter("contains_key");
        self.locate(q).2.is_some()
    }

    /// Number of entries with key `q`: 0 or 1.
    pub fn count<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        usize::from(self.contains_key(q))
    }

    /// Read-only keyed access; a missing key is an error, never an insert.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(TableError::MissingKey)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(TableError::MissingKey)
    }

    /// Removes the entry for `q` and returns it.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, bucket, found) = {
            let _g = self.busy.enter("remove");
            self.locate(q)
        };
        let node = found?;
        let (_, removed) = self.chains[bucket].erase(&mut self.arena, node);
        Some(removed.into_pair())
    }

    /// Removes the entry for `q`, returning a cursor to the entry after it.
    /// Returns `end()` when the key is absent.
    pub fn erase_key<Q>(&mut self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, bucket, found) = {
            let _g = self.busy.enter("erase_key");
            self.locate(q)
        };
        match found {
            Some(node) => self.erase_node(bucket, node),
            None => self.end(),
        }
    }
}

impl<K, V, S> Clone for HashTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Copies bucket count, limit and layout. The copy owns its entries and
    /// starts a fresh cursor epoch.
    fn clone(&self) -> Self {
        let mut arena = Arena::with_capacity_and_key(self.arena.len());
        let mut chains = vec![Chain::new(); self.chains.len()];
        for (src, dst) in self.chains.iter().zip(chains.iter_mut()) {
            for node in src.iter(&self.arena) {
                let n = &self.arena[node];
                dst.push_back(&mut arena, n.key.clone(), n.value.clone(), n.hash);
            }
        }
        Self {
            hasher: self.hasher.clone(),
            config: self.config,
            arena,
            chains,
            limit: self.limit,
            epoch: 0,
            busy: BusyFlag::new(),
        }
    }
}

/// Tables are equal when they hold the same set of keys. Bucket layout,
/// insertion order and values do not take part.
impl<K, V, S> PartialEq for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains_key(k))
    }
}

impl<K, V, S> Eq for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Debug for HashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V, S> Index<&Q> for HashTable<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

/// Later duplicates are rejected: the first occurrence of a key wins.
impl<K, V, S> Extend<(K, V)> for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            match self.insert(k, v) {
                Ok(_) | Err(InsertError::DuplicateKey) => {}
            }
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::with_hasher(S::default());
        table.extend(iter);
        table
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> From<(K, V)> for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn from((key, value): (K, V)) -> Self {
        let mut table = Self::new();
        match table.insert(key, value) {
            Ok(_) | Err(InsertError::DuplicateKey) => {}
        }
        table
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for HashTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.chains, self.arena)
    }
}
