//! Storage backend trait and implementations.
//!
//! This module provides the key-value stores shopkeep records live in:
//! - `FileBackend` - One JSON file per key (default)
//! - `SqliteBackend` - A single SQLite table of key/value rows
//! - `MemoryBackend` - In-process map for tests and throwaway runs

use crate::Result;

/// Trait for backends that persist raw string values under named keys.
///
/// This is the whole persistence contract: no queries, no transactions, no
/// protection against concurrent writers. Values are opaque strings; the
/// storage layer above decides they hold JSON.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type.
    fn backend_type(&self) -> BackendType;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendType {
    /// One `<key>.json` file per key (default)
    #[default]
    File,
    /// SQLite `kv` table in `store.db`
    Sqlite,
    /// Nothing written to disk
    Memory,
}

impl BackendType {
    /// Parse a backend type from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "files" | "json" | "default" => Some(Self::File),
            "sqlite" | "sqlite3" | "db" => Some(Self::Sqlite),
            "memory" | "mem" | "ephemeral" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate a storage key.
///
/// Keys become file names in the file backend, so they are limited to
/// ASCII letters, digits, `-` and `_`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(crate::Error::InvalidInput("Storage key must not be empty".to_string()));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(crate::Error::InvalidInput(format!(
            "Storage key may only contain letters, digits, '-' and '_': {}",
            key
        )));
    }
    Ok(())
}
