//! File-based key-value store for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::store::KeyValueStore;
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file-based key-value store.
///
/// Each key is persisted as one file inside a directory, so data
/// survives process restarts. A single `set` writes to a temporary
/// file and renames it into place, which keeps individual key writes
/// atomic even if the process dies mid-write.
///
/// # Key Restrictions
///
/// Keys double as file names, so keys containing path separators,
/// `..`, or a leading `.` are rejected with
/// [`StorageError::InvalidKey`]. The collection key layout
/// (`<name>_meta`, `<name>_<id>`) satisfies these restrictions for any
/// reasonable collection name.
///
/// # Example
///
/// ```no_run
/// use shelf_storage::{KeyValueStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("shelf_data")).unwrap();
/// store.set("Notes_meta", "{}").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Serializes writes so two sets to the same key cannot race on the
    // shared temp file name.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens or creates a file store rooted at `dir`.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or read.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
            || key.contains("..")
        {
            return Err(StorageError::invalid_key(key));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        let _guard = self.write_lock.lock();

        let tmp = self.dir.join(format!(".{key}.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            // Skip in-flight temp files
            if name.starts_with('.') {
                continue;
            }
            keys.push(name);
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_open_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store");

        let store = FileStore::open(&path).unwrap();
        assert!(path.is_dir());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn file_set_and_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("Notes_1", "{\"title\":\"x\"}").unwrap();
        assert_eq!(
            store.get("Notes_1").unwrap().as_deref(),
            Some("{\"title\":\"x\"}")
        );
        assert_eq!(store.get("Notes_2").unwrap(), None);
    }

    #[test]
    fn file_set_replaces() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("k", "old").unwrap();
        store.set("k", "new").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn file_remove_absent_succeeds() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.remove("missing").is_ok());
    }

    #[test]
    fn file_keys_exclude_temp_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        std::fs::write(dir.path().join(".orphan.tmp"), "x").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn file_rejects_path_traversal_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for key in ["", "a/b", "a\\b", "..", "x..y", ".hidden"] {
            assert!(
                matches!(store.set(key, "v"), Err(StorageError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn file_persistence_across_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("Notes_meta", "{\"length\":0}").unwrap();
        }

        {
            let store = FileStore::open(dir.path()).unwrap();
            assert_eq!(
                store.get("Notes_meta").unwrap().as_deref(),
                Some("{\"length\":0}")
            );
        }
    }
}
