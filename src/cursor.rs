//! Cursors over the cross-bucket entry sequence.
//!
//! The logical sequence is every chain concatenated in bucket order. A
//! position is a bucket index plus a node in that bucket's chain; `None` as
//! the node is the end sentinel, which sits in the last bucket. All empty
//! bucket skipping happens in `seek_forward`/`seek_backward`, and
//! `advance`/`retreat` are the only step routines. `Cursor` and the
//! borrowing iterators in `iter` both go through them.

use crate::chain::{Arena, Chain, NodeKey};
use crate::error::TableError;
use crate::table::HashTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) bucket: usize,
    pub(crate) node: Option<NodeKey>,
}

impl Position {
    pub(crate) fn end(chains: &[Chain]) -> Self {
        Position {
            bucket: chains.len().saturating_sub(1),
            node: None,
        }
    }
}

/// First entry at or after `bucket`, or end.
pub(crate) fn seek_forward(chains: &[Chain], bucket: usize) -> Position {
    chains
        .iter()
        .enumerate()
        .skip(bucket)
        .find(|(_, c)| !c.is_empty())
        .map(|(b, c)| Position {
            bucket: b,
            node: c.first(),
        })
        .unwrap_or_else(|| Position::end(chains))
}

/// Last entry strictly before `bucket`, if any.
pub(crate) fn seek_backward(chains: &[Chain], bucket: usize) -> Option<Position> {
    chains[..bucket.min(chains.len())]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(b, c)| c.last().map(|n| Position { bucket: b, node: Some(n) }))
}

pub(crate) fn begin(chains: &[Chain]) -> Position {
    seek_forward(chains, 0)
}

/// Step to the next entry; `None` when already at end.
pub(crate) fn advance<K, V>(chains: &[Chain], arena: &Arena<K, V>, pos: Position) -> Option<Position> {
    let node = pos.node?;
    Some(match arena[node].next() {
        Some(next) => Position {
            bucket: pos.bucket,
            node: Some(next),
        },
        None => seek_forward(chains, pos.bucket + 1),
    })
}

/// Step to the previous entry; `None` when already at the first one.
pub(crate) fn retreat<K, V>(chains: &[Chain], arena: &Arena<K, V>, pos: Position) -> Option<Position> {
    match pos.node {
        None => seek_backward(chains, chains.len()),
        Some(node) => match arena[node].prev() {
            Some(prev) => Some(Position {
                bucket: pos.bucket,
                node: Some(prev),
            }),
            None => seek_backward(chains, pos.bucket),
        },
    }
}

/// A position in a table's entry sequence.
///
/// Cursors are plain values: they borrow nothing and are resolved against
/// the table on every use. A cursor stays valid across insertions that do
/// not grow the table. Any rehash (growth, `resize`, `reserve`, `rehash`,
/// `clear`, `reset`) invalidates every outstanding cursor, and erasing an
/// entry invalidates the cursors addressing it. The table reports use of
/// an invalidated cursor as `TableError::InvalidatedCursor`.
///
/// A cursor must only be used with the table that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub(crate) pos: Position,
    pub(crate) epoch: u64,
}

impl Cursor {
    pub(crate) fn new(pos: Position, epoch: u64) -> Self {
        Cursor { pos, epoch }
    }

    pub(crate) fn node(&self) -> Option<NodeKey> {
        self.pos.node
    }

    pub fn is_end(&self) -> bool {
        self.pos.node.is_none()
    }

    /// Bucket the addressed entry lives in (the last bucket for end).
    pub fn bucket(&self) -> usize {
        self.pos.bucket
    }

    /// Key of the addressed entry.
    ///
    /// `None` covers both the end cursor and an invalidated one; use
    /// `HashTable::entry_at` to tell `OutOfRange` from `InvalidatedCursor`.
    /// The same holds for `value` and `value_mut`.
    pub fn key<'a, K, V, S>(&self, table: &'a HashTable<K, V, S>) -> Option<&'a K> {
        table.entry_at(*self).ok().map(|(k, _)| k)
    }

    pub fn value<'a, K, V, S>(&self, table: &'a HashTable<K, V, S>) -> Option<&'a V> {
        table.entry_at(*self).ok().map(|(_, v)| v)
    }

    pub fn value_mut<'a, K, V, S>(&self, table: &'a mut HashTable<K, V, S>) -> Option<&'a mut V> {
        table.entry_at_mut(*self).ok().map(|(_, v)| v)
    }

    /// Moves this cursor one entry forward.
    pub fn move_next<K, V, S>(&mut self, table: &HashTable<K, V, S>) -> Result<(), TableError> {
        *self = table.next(*self)?;
        Ok(())
    }

    /// Moves this cursor one entry back.
    pub fn move_prev<K, V, S>(&mut self, table: &HashTable<K, V, S>) -> Result<(), TableError> {
        *self = table.prev(*self)?;
        Ok(())
    }
}

/// Cursors are equal when they address the same chain position in the same
/// table generation. The bucket is implied by the position.
impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.pos.node == other.pos.node && self.epoch == other.epoch
    }
}

impl Eq for Cursor {}
