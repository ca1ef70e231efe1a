//! Collision chains: doubly-linked lists whose nodes live in a shared
//! generational arena.
//!
//! A `Chain` is only the head/tail/len triple; the nodes themselves are
//! stored in the table's `Arena` and every operation takes it explicitly.
//! Each node is linked into at most one chain at a time and the chain that
//! links it is its sole owner; nothing else holds node links. Arena keys
//! double as chain positions, and because they are generational an erased
//! position can be detected instead of aliasing a later node.

use core::borrow::Borrow;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Position of a node inside the arena.
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Full hash of `key`, computed once at insertion.
    pub(crate) hash: u64,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

impl<K, V> Node<K, V> {
    fn detached(key: K, value: V, hash: u64) -> Self {
        Self {
            key,
            value,
            hash,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub(crate) fn next(&self) -> Option<NodeKey> {
        self.next
    }

    #[inline]
    pub(crate) fn prev(&self) -> Option<NodeKey> {
        self.prev
    }

    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

pub(crate) type Arena<K, V> = SlotMap<NodeKey, Node<K, V>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Chain {
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    len: usize,
}

impl Chain {
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn first(&self) -> Option<NodeKey> {
        self.head
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<NodeKey> {
        self.tail
    }

    pub(crate) fn push_back<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        key: K,
        value: V,
        hash: u64,
    ) -> NodeKey {
        self.insert_before(arena, None, key, value, hash)
    }

    /// Links a new node in front of `pos`; `None` appends.
    pub(crate) fn insert_before<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        pos: Option<NodeKey>,
        key: K,
        value: V,
        hash: u64,
    ) -> NodeKey {
        let node = arena.insert(Node::detached(key, value, hash));
        self.link_before(arena, pos, node);
        node
    }

    /// Links an arena node that no chain currently owns at the tail.
    pub(crate) fn append<K, V>(&mut self, arena: &mut Arena<K, V>, node: NodeKey) {
        self.link_before(arena, None, node);
    }

    fn link_before<K, V>(&mut self, arena: &mut Arena<K, V>, pos: Option<NodeKey>, node: NodeKey) {
        let prev = match pos {
            Some(p) => arena[p].prev,
            None => self.tail,
        };
        {
            let n = &mut arena[node];
            n.prev = prev;
            n.next = pos;
        }
        match prev {
            Some(p) => arena[p].next = Some(node),
            None => self.head = Some(node),
        }
        match pos {
            Some(p) => arena[p].prev = Some(node),
            None => self.tail = Some(node),
        }
        self.len += 1;
    }

    /// Unlinks `node` and frees it. Returns the node that followed it in
    /// this chain together with the removed entry.
    pub(crate) fn erase<K, V>(
        &mut self,
        arena: &mut Arena<K, V>,
        node: NodeKey,
    ) -> (Option<NodeKey>, Node<K, V>) {
        let removed = match arena.remove(node) {
            Some(n) => n,
            None => unreachable!("chain links a node missing from the arena"),
        };
        match removed.prev {
            Some(p) => arena[p].next = removed.next,
            None => self.head = removed.next,
        }
        match removed.next {
            Some(n) => arena[n].prev = removed.prev,
            None => self.tail = removed.prev,
        }
        self.len -= 1;
        (removed.next, removed)
    }

    pub(crate) fn pop_front<K, V>(&mut self, arena: &mut Arena<K, V>) -> Option<(K, V)> {
        let head = self.head?;
        Some(self.erase(arena, head).1.into_pair())
    }

    pub(crate) fn pop_back<K, V>(&mut self, arena: &mut Arena<K, V>) -> Option<(K, V)> {
        let tail = self.tail?;
        Some(self.erase(arena, tail).1.into_pair())
    }

    /// Linear search by key; the cached hash filters most mismatches
    /// before `Eq` runs.
    pub(crate) fn find<K, V, Q>(&self, arena: &Arena<K, V>, hash: u64, q: &Q) -> Option<NodeKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let n = &arena[k];
            if n.hash == hash && n.key.borrow() == q {
                return Some(k);
            }
            cur = n.next;
        }
        None
    }

    /// Frees every node of this chain.
    pub(crate) fn clear<K, V>(&mut self, arena: &mut Arena<K, V>) {
        let mut cur = self.head;
        while let Some(k) = cur {
            cur = arena.remove(k).and_then(|n| n.next);
        }
        *self = Chain::new();
    }

    /// Detaches all nodes from this chain without freeing them, in order.
    /// The caller must relink every returned key.
    pub(crate) fn take_nodes<K, V>(&mut self, arena: &Arena<K, V>) -> Vec<NodeKey> {
        let nodes: Vec<NodeKey> = self.iter(arena).collect();
        *self = Chain::new();
        nodes
    }

    pub(crate) fn iter<'a, K, V>(&self, arena: &'a Arena<K, V>) -> ChainIter<'a, K, V> {
        ChainIter {
            arena,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }
}

/// Node positions of one chain, head to tail.
pub(crate) struct ChainIter<'a, K, V> {
    arena: &'a Arena<K, V>,
    front: Option<NodeKey>,
    back: Option<NodeKey>,
    remaining: usize,
}

impl<K, V> Iterator for ChainIter<'_, K, V> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        if self.remaining == 0 {
            return None;
        }
        let k = self.front?;
        self.front = self.arena[k].next;
        self.remaining -= 1;
        Some(k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for ChainIter<'_, K, V> {
    fn next_back(&mut self) -> Option<NodeKey> {
        if self.remaining == 0 {
            return None;
        }
        let k = self.back?;
        self.back = self.arena[k].prev;
        self.remaining -= 1;
        Some(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(chain: &Chain, arena: &Arena<u32, &'static str>) -> Vec<u32> {
        chain.iter(arena).map(|k| arena[k].key).collect()
    }

    #[test]
    fn push_and_pop_both_ends() {
        let mut arena = Arena::with_key();
        let mut c = Chain::new();
        c.push_back(&mut arena, 2, "b", 2);
        c.push_back(&mut arena, 3, "c", 3);
        let head = c.first();
        c.insert_before(&mut arena, head, 1, "a", 1);
        assert_eq!(keys(&c, &arena), vec![1, 2, 3]);
        assert_eq!(c.len(), 3);

        assert_eq!(c.pop_front(&mut arena), Some((1, "a")));
        assert_eq!(c.pop_back(&mut arena), Some((3, "c")));
        assert_eq!(c.pop_back(&mut arena), Some((2, "b")));
        assert_eq!(c.pop_front(&mut arena), None);
        assert!(c.is_empty());
        assert!(arena.is_empty());
        assert_eq!(c, Chain::new());
    }

    #[test]
    fn positional_insert_and_erase() {
        let mut arena = Arena::with_key();
        let mut c = Chain::new();
        let a = c.push_back(&mut arena, 1, "a", 1);
        let d = c.push_back(&mut arena, 4, "d", 4);
        let b = c.insert_before(&mut arena, Some(d), 2, "b", 2);
        c.insert_before(&mut arena, Some(d), 3, "c", 3);
        c.insert_before(&mut arena, None, 5, "e", 5);
        assert_eq!(keys(&c, &arena), vec![1, 2, 3, 4, 5]);
        assert_eq!(c.first(), Some(a));

        let (next, removed) = c.erase(&mut arena, b);
        assert_eq!(removed.into_pair(), (2, "b"));
        assert_eq!(next.map(|k| arena[k].key), Some(3));
        assert_eq!(keys(&c, &arena), vec![1, 3, 4, 5]);
        assert!(!arena.contains_key(b), "erased position must go stale");

        let last = c.last().unwrap();
        let (next, _) = c.erase(&mut arena, last);
        assert_eq!(next, None);
        assert_eq!(arena[c.last().unwrap()].key, 4);
    }

    #[test]
    fn backward_iteration_mirrors_forward() {
        let mut arena = Arena::with_key();
        let mut c = Chain::new();
        for i in 0..5 {
            c.push_back(&mut arena, i, "x", i as u64);
        }
        let fwd: Vec<NodeKey> = c.iter(&arena).collect();
        let mut bwd: Vec<NodeKey> = c.iter(&arena).rev().collect();
        bwd.reverse();
        assert_eq!(fwd, bwd);

        // Meeting in the middle never yields a node twice.
        let mut it = c.iter(&arena);
        let mut seen = 0;
        while it.next().is_some() {
            seen += 1;
            if it.next_back().is_some() {
                seen += 1;
            }
        }
        assert_eq!(seen, 5);
    }

    #[test]
    fn find_checks_hash_then_key() {
        let mut arena: Arena<String, i32> = Arena::with_key();
        let mut c = Chain::new();
        c.push_back(&mut arena, "ab".to_string(), 1, 7);
        let ba = c.push_back(&mut arena, "ba".to_string(), 2, 7);
        assert_eq!(c.find(&arena, 7, "ba"), Some(ba));
        assert_eq!(c.find(&arena, 8, "ba"), None);
        assert_eq!(c.find(&arena, 7, "zz"), None);
    }

    #[test]
    fn take_nodes_detaches_and_append_relinks() {
        let mut arena = Arena::with_key();
        let mut c = Chain::new();
        for i in 0..3 {
            c.push_back(&mut arena, i, "v", i as u64);
        }
        let nodes = c.take_nodes(&arena);
        assert!(c.is_empty());
        assert_eq!(arena.len(), 3);

        let mut other = Chain::new();
        for n in nodes.into_iter().rev() {
            other.append(&mut arena, n);
        }
        assert_eq!(keys(&other, &arena), vec![2, 1, 0]);

        other.clear(&mut arena);
        assert!(other.is_empty());
        assert!(arena.is_empty());
    }
}
