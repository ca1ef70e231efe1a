//! chained-hashtable: a single-threaded key/value table built on separate
//! chaining, with growth driven by chain length and checked cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map whose collision handling, growth trigger and cross-bucket
//!   traversal are explicit and testable, rather than hidden behind open
//!   addressing.
//! - Layers:
//!   - `chain`: doubly-linked collision chains whose nodes live in one
//!     generational arena (`slotmap`) owned by the table.
//!   - `cursor`: positions over the concatenation of all chains, and the
//!     only code that skips empty buckets.
//!   - `HashTable<K, V, S>`: hashing, routing, growth policy and the
//!     public operation set; `iter` holds its iterators.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync`, no atomics, no locking.
//! - Unique keys: a second insert of a stored key is rejected and the
//!   stored value is untouched.
//! - The bucket count starts at a configured minimum and only doubles;
//!   `resize` is the one explicit way to choose another count.
//!
//! Growth policy
//! - Before appending to a chain, the table compares that chain's length
//!   with the current limit. A saturated chain doubles both the bucket
//!   count and the limit, and every entry is redistributed at once. The
//!   limit is always derived from the bucket count, including after an
//!   explicit shrink.
//! - The trigger is local chain saturation, not a global load factor, so
//!   the longest chain is bounded by the limit regardless of occupancy.
//!
//! Hashing and rehash invariants
//! - Each node stores the full `u64` hash of its key. Rehashing uses the
//!   stored hash and relinks arena nodes; `K: Hash`/`K: Eq` never run and
//!   no entry moves in memory during a rehash.
//! - The default `ChainState` hasher is deterministic (integers hash to
//!   themselves, byte strings to their byte sum) so bucket layout can be
//!   predicted. `MixedState` is available when keys are untrusted.
//!
//! Cursor validity
//! - Cursors carry the table's epoch, bumped by every rehash, `clear` and
//!   `reset`. Erased nodes are detected through arena generations. Both
//!   cases are reported as `TableError::InvalidatedCursor`.
//!
//! Reentrancy
//! - Lookups run user `Hash`/`Eq` while walking a chain. In debug builds a
//!   per-table guard panics if such code calls back into the same table.
//!
//! Notes and non-goals
//! - Equality between tables compares key sets only; there is no ordering
//!   between tables.
//! - Deleting entries never shrinks the bucket array.
//! - No serialization.

mod chain;
pub mod config;
pub mod cursor;
pub mod error;
mod guard;
pub mod hasher;
pub mod iter;
mod table;
mod table_proptest;
pub mod util;

// Public surface
pub use config::TableConfig;
pub use cursor::Cursor;
pub use error::{ConfigError, InsertError, TableError};
pub use hasher::{AdditiveHasher, ChainState, MixedState};
pub use table::HashTable;
