//! Error types reported by the table, its cursors and its configuration.

use core::fmt;

/// Returned by the inserting operations when the key is already present.
/// The table is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    DuplicateKey,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey => f.write_str("key already present in table"),
        }
    }
}

impl std::error::Error for InsertError {}

/// Failures of keyed lookups and cursor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// Read-only lookup of a key that is not stored.
    MissingKey,
    /// `front`/`back` on a table with no entries.
    Empty,
    /// The cursor predates a rehash, or its entry has been erased.
    InvalidatedCursor,
    /// Stepping past the end, retreating before the beginning, or using the
    /// end cursor where an entry is required.
    OutOfRange,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TableError::MissingKey => "no entry for key",
            TableError::Empty => "table is empty",
            TableError::InvalidatedCursor => "cursor was invalidated by a rehash or erase",
            TableError::OutOfRange => "cursor is outside the entry sequence",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TableError {}

/// Rejected `TableConfig` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroBuckets,
    ZeroChainLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroBuckets => f.write_str("minimum bucket count must be at least 1"),
            ConfigError::ZeroChainLimit => f.write_str("chain length limit must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(InsertError::DuplicateKey.to_string(), "key already present in table");
        assert_eq!(TableError::MissingKey.to_string(), "no entry for key");
        assert_eq!(
            ConfigError::ZeroChainLimit.to_string(),
            "chain length limit must be at least 1"
        );
    }

    #[test]
    fn errors_box_as_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(TableError::InvalidatedCursor);
        assert!(e.to_string().contains("invalidated"));
    }
}
