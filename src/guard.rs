//! Debug-only guard against reentrant table calls.
//!
//! The table calls into user code through `K: Hash` and `K: Eq` while a
//! chain walk is in progress. A key implementation that reaches back into
//! the same table at that point would observe half-updated links, so in
//! debug builds every public entry point marks the table busy and a nested
//! entry panics, naming both operations. Release builds carry no state.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct BusyFlag {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Single-threaded: keep the owner !Send + !Sync.
    _single: PhantomData<*mut ()>,
}

impl BusyFlag {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _single: PhantomData,
        }
    }

    /// Marks `op` as running until the returned guard is dropped.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> BusyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call to HashTable::{op} while {outer} is running");
            }
            self.active.set(Some(op));
            BusyGuard { flag: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            BusyGuard { _flag: PhantomData }
        }
    }
}

impl Default for BusyFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct BusyGuard<'a> {
    #[cfg(debug_assertions)]
    flag: &'a BusyFlag,
    #[cfg(not(debug_assertions))]
    _flag: PhantomData<&'a BusyFlag>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.flag.active.get().is_some());
            self.flag.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BusyFlag;

    #[test]
    fn sequential_entries_are_fine() {
        let f = BusyFlag::new();
        {
            let _g = f.enter("find");
        }
        let _g = f.enter("insert");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let f = BusyFlag::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = f.enter("insert");
            let _inner = f.enter("find");
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }
}
