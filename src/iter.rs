//! Iterators over `HashTable` entries.
//!
//! `Iter`, `Keys`, `Values` and `IntoIter` walk the cross-bucket sequence
//! (bucket order, chain order within a bucket) from both ends. `IterMut`
//! and `ValuesMut` hand out `&mut V` and walk the node arena in storage
//! order instead; their order is unspecified.

use crate::chain::{Arena, Chain, Node, NodeKey};
use crate::cursor::{advance, begin, retreat, Position};
use core::iter::FusedIterator;

/// Iterator over `(&K, &V)` in cross-bucket order.
pub struct Iter<'a, K, V> {
    chains: &'a [Chain],
    arena: &'a Arena<K, V>,
    front: Position,
    back: Position,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(chains: &'a [Chain], arena: &'a Arena<K, V>) -> Self {
        Iter {
            chains,
            arena,
            front: begin(chains),
            back: Position::end(chains),
            remaining: arena.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.node?;
        let arena: &'a Arena<K, V> = self.arena;
        let n = &arena[node];
        self.front = advance(self.chains, self.arena, self.front)?;
        self.remaining -= 1;
        Some((&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.back = retreat(self.chains, self.arena, self.back)?;
        let arena: &'a Arena<K, V> = self.arena;
        let n = &arena[self.back.node?];
        self.remaining -= 1;
        Some((&n.key, &n.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in storage order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, NodeKey, Node<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(arena: &'a mut Arena<K, V>) -> Self {
        IterMut { it: arena.iter_mut() }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &mut n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Owning iterator; drains chains from both ends in cross-bucket order.
pub struct IntoIter<K, V> {
    chains: Vec<Chain>,
    arena: Arena<K, V>,
    // Buckets `front..back` may still hold entries.
    front: usize,
    back: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(chains: Vec<Chain>, arena: Arena<K, V>) -> Self {
        let back = chains.len();
        IntoIter {
            chains,
            arena,
            front: 0,
            back,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        while self.front < self.back {
            if let Some(pair) = self.chains[self.front].pop_front(&mut self.arena) {
                return Some(pair);
            }
            self.front += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.arena.len(), Some(self.arena.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        while self.back > self.front {
            if let Some(pair) = self.chains[self.back - 1].pop_back(&mut self.arena) {
                return Some(pair);
            }
            self.back -= 1;
        }
        None
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
