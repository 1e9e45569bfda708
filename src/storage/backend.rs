//! Key-value storage media
//!
//! The local store only needs string get/set/remove on a handful of keys.
//! `FileStore` keeps one file per key; `MemoryStore` keeps everything in
//! process and can enforce a byte quota the way browser storage does.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TrackerError;

use super::file_io::{read_optional, remove_if_exists, write_atomic};

/// A durable string key-value medium
pub trait KeyValueStore: Send + Sync {
    /// Read a key; `Ok(None)` if absent
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError>;

    /// Write a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), TrackerError>;
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        read_optional(self.key_path(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        write_atomic(self.key_path(key), value)
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        remove_if_exists(self.key_path(key))
    }
}

/// In-process store with an optional total size limit
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would bring keys + values above `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.data
            .read()
            .map(|data| data.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, TrackerError> {
        let data = self.data.read().map_err(|e| {
            TrackerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TrackerError> {
        let mut data = self.data.write().map_err(|e| {
            TrackerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(TrackerError::Storage(format!(
                    "Quota exceeded writing '{}': {} bytes needed, {} allowed",
                    key, needed, quota
                )));
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TrackerError> {
        let mut data = self.data.write().map_err(|e| {
            TrackerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_memory_store_quota() {
        let store = MemoryStore::with_quota(10);
        store.set("a", "1234").unwrap();
        assert_eq!(store.used_bytes(), 5);

        let err = store.set("b", "123456").unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert_eq!(store.get("b").unwrap(), None);

        // Replacing a key only counts the new value
        store.set("a", "123456789").unwrap();
        assert_eq!(store.used_bytes(), 10);
    }
}
