//! Key-value store trait definition.

use crate::error::StorageResult;

/// A flat, string-keyed store for ShelfDB.
///
/// Stores are **opaque string maps**. They provide simple synchronous
/// operations for reading, writing, and removing values by key. ShelfDB
/// owns all key-layout interpretation - stores do not understand
/// metadata records, entities, or collection names.
///
/// # Invariants
///
/// - `get` returns exactly the value previously written under that key
/// - `set` replaces any existing value; a single `set` is atomic
/// - `remove` of an absent key succeeds silently
/// - No operation spans more than one key; there are no transactions
/// - Stores must be `Send + Sync` so one instance can back several
///   collections
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing and ephemeral data
/// - [`super::FileStore`] - For persistent storage
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or an I/O error
    /// occurs.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The store is unavailable
    /// - The write would exceed the store's capacity
    /// - The key cannot be represented by this store
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes the value stored under `key`.
    ///
    /// Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or an I/O error
    /// occurs.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Returns every key currently present in the store.
    ///
    /// Supports store-wide inspection and the default `len` /
    /// `is_empty` implementations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or cannot be
    /// enumerated.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Returns the number of keys currently present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn len(&self) -> StorageResult<usize> {
        Ok(self.keys()?.len())
    }

    /// Returns `true` if the store holds no keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
