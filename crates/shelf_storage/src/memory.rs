//! In-memory key-value store for testing and ephemeral use.

use crate::error::{StorageError, StorageResult};
use crate::store::KeyValueStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory key-value store.
///
/// This store keeps all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral collections that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads behind
/// an `Arc`.
///
/// # Test Doubles
///
/// Two knobs exist for exercising failure paths:
/// - [`MemoryStore::with_quota`] enforces a total-byte budget and
///   makes oversized writes fail with `QuotaExceeded`
/// - [`MemoryStore::set_available`] makes every operation fail with
///   `Unavailable`, which collection construction must treat as fatal
///
/// # Example
///
/// ```rust
/// use shelf_storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("k", "v").unwrap();
/// assert_eq!(store.len().unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates a new empty in-memory store with no capacity limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once the total byte size of
    /// all keys and values would exceed `limit`.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            quota: Some(limit),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Toggles availability. While unavailable, every operation fails
    /// with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Removes every key from the store.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("memory store marked offline"));
        }
        Ok(())
    }

    /// Total bytes held, counting keys and values.
    fn used_bytes(data: &BTreeMap<String, String>) -> usize {
        data.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check_available()?;
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_available()?;
        let mut data = self.data.write();

        if let Some(limit) = self.quota {
            let existing = data.get(key).map_or(0, |v| key.len() + v.len());
            let attempted = Self::used_bytes(&data) - existing + key.len() + value.len();
            if attempted > limit {
                return Err(StorageError::QuotaExceeded { limit, attempted });
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_available()?;
        self.data.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.check_available()?;
        Ok(self.data.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn memory_set_and_get() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn memory_set_replaces() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn memory_remove_absent_succeeds() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn memory_keys_sorted() {
        let store = MemoryStore::new();
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn memory_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(8);
        store.set("ab", "cd").unwrap();

        let result = store.set("ef", "too long to fit");
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));

        // Rejected write leaves existing data intact
        assert_eq!(store.get("ab").unwrap().as_deref(), Some("cd"));
        assert_eq!(store.get("ef").unwrap(), None);
    }

    #[test]
    fn memory_quota_counts_replaced_value_once() {
        let store = MemoryStore::with_quota(8);
        store.set("abcd", "efgh").unwrap();
        // Replacing the value for the same key stays within budget
        store.set("abcd", "wxyz").unwrap();
        assert_eq!(store.get("abcd").unwrap().as_deref(), Some("wxyz"));
    }

    #[test]
    fn memory_unavailable_fails_everything() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set_available(false);

        assert!(matches!(
            store.get("a"),
            Err(StorageError::Unavailable { .. })
        ));
        assert!(matches!(
            store.set("b", "2"),
            Err(StorageError::Unavailable { .. })
        ));
        assert!(matches!(
            store.keys(),
            Err(StorageError::Unavailable { .. })
        ));

        store.set_available(true);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn memory_clear() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.clear();
        assert!(store.is_empty().unwrap());
    }
}
