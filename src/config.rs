//! Construction parameters for `HashTable`.

use crate::error::ConfigError;

/// Bucket count a table starts with, and returns to on `reset`.
pub const DEFAULT_MIN_BUCKETS: usize = 8;

/// Longest chain tolerated at the minimum bucket count before growth.
pub const DEFAULT_CHAIN_LIMIT: usize = 4;

/// Growth parameters of a table.
///
/// `min_buckets` is the floor for the bucket count: new tables start there,
/// `reset` returns there and `resize` never goes below it. `chain_limit` is
/// the initial per-chain length threshold; it doubles together with the
/// bucket count on every growth step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    min_buckets: usize,
    chain_limit: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_buckets: DEFAULT_MIN_BUCKETS,
            chain_limit: DEFAULT_CHAIN_LIMIT,
        }
    }
}

impl TableConfig {
    pub const fn new(min_buckets: usize, chain_limit: usize) -> Self {
        Self {
            min_buckets,
            chain_limit,
        }
    }

    pub fn with_min_buckets(mut self, min_buckets: usize) -> Self {
        self.min_buckets = min_buckets;
        self
    }

    pub fn with_chain_limit(mut self, chain_limit: usize) -> Self {
        self.chain_limit = chain_limit;
        self
    }

    pub fn min_buckets(&self) -> usize {
        self.min_buckets
    }

    pub fn chain_limit(&self) -> usize {
        self.chain_limit
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_buckets == 0 {
            return Err(ConfigError::ZeroBuckets);
        }
        if self.chain_limit == 0 {
            return Err(ConfigError::ZeroChainLimit);
        }
        Ok(())
    }

    /// Copy with every invalid field raised to 1. Tables accept any config
    /// and run it through here.
    pub(crate) fn sanitized(self) -> Self {
        if let Err(err) = self.validate() {
            tracing::warn!(%err, config = ?self, "clamping invalid table config");
        }
        Self {
            min_buckets: self.min_buckets.max(1),
            chain_limit: self.chain_limit.max(1),
        }
    }

    /// Chain limit matching `buckets`: the configured limit scaled by how
    /// far the bucket count is above the minimum.
    pub(crate) fn limit_for(&self, buckets: usize) -> usize {
        let scaled = (self.chain_limit as u128 * buckets as u128) / self.min_buckets as u128;
        (scaled.min(usize::MAX as u128) as usize).max(self.chain_limit)
    }
}
