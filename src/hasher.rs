//! Key hashing and bucket-index derivation.
//!
//! The default `ChainState` is deliberately simple and deterministic:
//! integers hash to their own value and byte sequences to the sum of their
//! bytes. Bucket layout is therefore reproducible, which the growth tests
//! rely on. It is not collision resistant; plug in `MixedState` (or any
//! other `BuildHasher`) when keys may be adversarial.

use core::hash::{BuildHasher, Hash, Hasher};

/// Hashbrown's default builder, for tables that want real mixing.
pub type MixedState = hashbrown::hash_map::DefaultHashBuilder;

/// Deterministic `BuildHasher` producing `AdditiveHasher`s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainState;

impl BuildHasher for ChainState {
    type Hasher = AdditiveHasher;

    #[inline]
    fn build_hasher(&self) -> AdditiveHasher {
        AdditiveHasher::default()
    }
}

/// Sums everything written into it.
///
/// A single integer write yields the integer itself (signed values by their
/// two's-complement bit pattern). `str` keys yield the plain sum of their
/// bytes: the `0xff` terminator `Hash for str` writes after the bytes is
/// not counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveHasher {
    sum: u64,
    // Set by `write`; the `0xff` that may follow is a str terminator.
    after_bytes: bool,
}

impl AdditiveHasher {
    #[inline]
    fn add(&mut self, n: u64) {
        self.after_bytes = false;
        self.sum = self.sum.wrapping_add(n);
    }
}

impl Hasher for AdditiveHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.sum
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.add(b as u64);
        }
        self.after_bytes = true;
    }

    #[inline]
    fn write_u8(&mut self, n: u8) {
        if self.after_bytes && n == 0xff {
            self.after_bytes = false;
            return;
        }
        self.add(n as u64);
    }

    #[inline]
    fn write_u16(&mut self, n: u16) {
        self.add(n as u64);
    }

    #[inline]
    fn write_u32(&mut self, n: u32) {
        self.add(n as u64);
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.add(n);
    }

    #[inline]
    fn write_u128(&mut self, n: u128) {
        self.add(n as u64);
        self.add((n >> 64) as u64);
    }

    #[inline]
    fn write_usize(&mut self, n: usize) {
        self.add(n as u64);
    }
}

#[inline]
pub(crate) fn hash_key<Q, S>(state: &S, key: &Q) -> u64
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    state.hash_one(key)
}

/// Bucket a hash lands in for a bucket array of length `buckets`.
#[inline]
pub(crate) fn bucket_index(hash: u64, buckets: usize) -> usize {
    debug_assert!(buckets > 0);
    (hash % buckets as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_hash_to_themselves() {
        let s = ChainState;
        assert_eq!(hash_key(&s, &0u32), 0);
        assert_eq!(hash_key(&s, &9u64), 9);
        assert_eq!(hash_key(&s, &42usize), 42);
        assert_eq!(hash_key(&s, &7i32), 7);
        assert_eq!(hash_key(&s, &-1i32), u32::MAX as u64);
    }

    #[test]
    fn strings_hash_to_byte_sum() {
        let s = ChainState;
        assert_eq!(hash_key(&s, "ab"), 97 + 98);
        assert_eq!(hash_key(&s, ""), 0);
        assert_eq!(hash_key(&s, &"ab".to_string()), hash_key(&s, "ab"));
        assert_eq!(hash_key(&s, &'a'), 97);
        // Anagrams collide by construction.
        assert_eq!(hash_key(&s, "ba"), hash_key(&s, "ab"));
    }

    #[test]
    fn only_the_str_terminator_is_dropped() {
        let s = ChainState;
        assert_eq!(hash_key(&s, &0xffu8), 0xff);
        // The tuple's own 0xff byte follows the terminator and is counted.
        assert_eq!(hash_key(&s, &("a", 0xffu8)), 97 + 0xff);
        assert_eq!(hash_key(&s, &("a", "b")), 97 + 98);
    }

    #[test]
    fn bucket_index_is_modulo() {
        assert_eq!(bucket_index(9, 4), 1);
        assert_eq!(bucket_index(9, 8), 1);
        assert_eq!(bucket_index(13, 8), 5);
        assert_eq!(bucket_index(3, 1), 0);
    }

    #[test]
    fn mixed_state_is_deterministic_per_builder() {
        let s = MixedState::default();
        assert_eq!(hash_key(&s, "key"), hash_key(&s, "key"));
    }
}
