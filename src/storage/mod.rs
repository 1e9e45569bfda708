//! Storage layer for m-track
//!
//! `LocalStore` persists the dataset under three keys: the transaction list,
//! the bank list, and the last-sync timestamp. It has no policy of its own.
//! Reads never fail (missing or corrupt data reads as empty); writes of the
//! entity lists propagate errors so callers never commit state that isn't
//! durable.

pub mod backend;
pub mod file_io;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use file_io::{read_optional, write_atomic, write_json_atomic};

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::paths::TrackerPaths;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Bank, Snapshot, Transaction};

pub const TRANSACTIONS_KEY: &str = "m-track-transactions";
pub const BANKS_KEY: &str = "m-track-banks";
pub const LAST_SYNC_KEY: &str = "m-track-last-sync";

/// Durable persistence for transactions, banks, and the last sync time
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    /// Create a store over any key-value medium
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Create a file-backed store in the data directory
    pub fn open(paths: &TrackerPaths) -> TrackerResult<Self> {
        paths.ensure_directories()?;
        Ok(Self::new(Arc::new(FileStore::new(paths.data_dir()))))
    }

    /// Create a store that lives only in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get_transactions(&self) -> Vec<Transaction> {
        self.read_list(TRANSACTIONS_KEY)
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> TrackerResult<()> {
        self.write_list(TRANSACTIONS_KEY, transactions)
            .map_err(|e| storage_error("transactions", e))
    }

    pub fn get_banks(&self) -> Vec<Bank> {
        self.read_list(BANKS_KEY)
    }

    pub fn save_banks(&self, banks: &[Bank]) -> TrackerResult<()> {
        self.write_list(BANKS_KEY, banks)
            .map_err(|e| storage_error("banks", e))
    }

    /// Epoch millis of the last successful sync, if any
    pub fn get_last_sync(&self) -> Option<i64> {
        match self.backend.get(LAST_SYNC_KEY) {
            Ok(Some(raw)) => raw.trim().parse().ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read last sync timestamp: {}", e);
                None
            }
        }
    }

    /// Best effort: failures are logged, not returned
    pub fn set_last_sync(&self, timestamp: i64) {
        if let Err(e) = self.backend.set(LAST_SYNC_KEY, &timestamp.to_string()) {
            log::warn!("Failed to save last sync timestamp: {}", e);
        }
    }

    /// Current contents as one snapshot
    pub fn export_data(&self) -> Snapshot {
        Snapshot::new(
            self.get_transactions(),
            self.get_banks(),
            self.get_last_sync(),
        )
    }

    /// Replace all local data with `snapshot` and stamp the current time.
    ///
    /// Nothing is merged. If the bank list cannot be written, the previous
    /// transaction list is put back so the two keys stay consistent.
    /// Returns the new last-sync timestamp.
    pub fn import_data(&self, snapshot: &Snapshot) -> TrackerResult<i64> {
        let previous_transactions = self.backend.get(TRANSACTIONS_KEY).ok().flatten();

        self.save_transactions(&snapshot.transactions)?;
        if let Err(e) = self.save_banks(&snapshot.banks) {
            let restored = match previous_transactions {
                Some(raw) => self.backend.set(TRANSACTIONS_KEY, &raw),
                None => self.backend.remove(TRANSACTIONS_KEY),
            };
            if let Err(restore_err) = restored {
                log::error!(
                    "Failed to roll back transactions after aborted import: {}",
                    restore_err
                );
            }
            return Err(e);
        }

        let now = Utc::now().timestamp_millis();
        self.set_last_sync(now);
        log::info!(
            "Imported {} transactions and {} banks",
            snapshot.transactions.len(),
            snapshot.banks.len()
        );
        Ok(now)
    }

    /// Remove all three keys
    pub fn clear_all(&self) -> TrackerResult<()> {
        self.backend.remove(TRANSACTIONS_KEY)?;
        self.backend.remove(BANKS_KEY)?;
        self.backend.remove(LAST_SYNC_KEY)?;
        Ok(())
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("Error reading '{}' from local storage: {}", key, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::error!("Corrupt data under '{}', treating as empty: {}", key, e);
            Vec::new()
        })
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> TrackerResult<()> {
        let json = serde_json::to_string(items)?;
        self.backend.set(key, &json)
    }
}

fn storage_error(what: &str, err: TrackerError) -> TrackerError {
    log::error!("Error saving {} to local storage: {}", what, err);
    match err {
        TrackerError::Storage(msg) => TrackerError::Storage(format!(
            "Failed to save {}. Storage may be full. ({})",
            what, msg
        )),
        other => TrackerError::Storage(format!("Failed to save {}: {}", what, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_iso_date, NewTransaction, PaymentMode, TransactionType};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample_transaction(label: &str) -> Transaction {
        Transaction::new(NewTransaction {
            kind: TransactionType::Expense,
            amount: dec!(99.5),
            label: label.into(),
            mode: PaymentMode::Card,
            bank_id: None,
            date: parse_iso_date("2024-03-15").unwrap(),
        })
    }

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = LocalStore::open(&paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(store.get_transactions().is_empty());
        assert!(store.get_banks().is_empty());
        assert_eq!(store.get_last_sync(), None);
    }

    #[test]
    fn test_save_and_reload_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let txns = vec![sample_transaction("Coffee"), sample_transaction("Lunch")];
        let banks = vec![Bank::new("SBI")];
        {
            let store = LocalStore::open(&paths).unwrap();
            store.save_transactions(&txns).unwrap();
            store.save_banks(&banks).unwrap();
        }

        let store = LocalStore::open(&paths).unwrap();
        assert_eq!(store.get_transactions(), txns);
        assert_eq!(store.get_banks(), banks);
        assert!(paths.data_dir().join(TRANSACTIONS_KEY).exists());
    }

    #[test]
    fn test_save_is_idempotent() {
        let backend = Arc::new(MemoryStore::new());
        let store = LocalStore::new(backend.clone());
        let txns = vec![sample_transaction("Rent")];

        store.save_transactions(&txns).unwrap();
        let first = backend.get(TRANSACTIONS_KEY).unwrap();
        store.save_transactions(&txns).unwrap();
        let second = backend.get(TRANSACTIONS_KEY).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_data_reads_as_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(TRANSACTIONS_KEY, "{not json").unwrap();
        backend.set(BANKS_KEY, "42").unwrap();
        backend.set(LAST_SYNC_KEY, "yesterday").unwrap();

        let store = LocalStore::new(backend);
        assert!(store.get_transactions().is_empty());
        assert!(store.get_banks().is_empty());
        assert_eq!(store.get_last_sync(), None);
    }

    #[test]
    fn test_quota_failure_propagates() {
        let store = LocalStore::new(Arc::new(MemoryStore::with_quota(64)));
        let txns: Vec<_> = (0..10).map(|i| sample_transaction(&format!("t{}", i))).collect();

        let err = store.save_transactions(&txns).unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert!(err.to_string().contains("Storage may be full"));
        assert!(store.get_transactions().is_empty());
    }

    #[test]
    fn test_last_sync_failure_is_swallowed() {
        let store = LocalStore::new(Arc::new(MemoryStore::with_quota(4)));
        store.set_last_sync(1_700_000_000_000);
        assert_eq!(store.get_last_sync(), None);
    }

    #[test]
    fn test_export_import_round_trip() {
        let source = LocalStore::in_memory();
        source.save_transactions(&[sample_transaction("Fuel")]).unwrap();
        source.save_banks(&[Bank::new("HDFC"), Bank::new("ICICI")]).unwrap();
        source.set_last_sync(1_000);

        let exported = source.export_data();
        assert_eq!(exported.last_sync, Some(1_000));

        let target = LocalStore::in_memory();
        target.save_transactions(&[sample_transaction("Old")]).unwrap();
        let before = Utc::now().timestamp_millis();
        let stamped = target.import_data(&exported).unwrap();

        assert_eq!(target.get_transactions(), exported.transactions);
        assert_eq!(target.get_banks(), exported.banks);
        assert!(stamped >= before);
        assert_eq!(target.get_last_sync(), Some(stamped));
        assert_ne!(target.get_last_sync(), exported.last_sync);
    }

    #[test]
    fn test_failed_import_keeps_previous_transactions() {
        let backend = Arc::new(MemoryStore::with_quota(1024));
        let store = LocalStore::new(backend);
        let original = vec![sample_transaction("Keep me")];
        store.save_transactions(&original).unwrap();

        let long_name = "x".repeat(2000);
        let snapshot = Snapshot::new(Vec::new(), vec![Bank::new(long_name)], None);

        assert!(store.import_data(&snapshot).is_err());
        assert_eq!(store.get_transactions(), original);
        assert!(store.get_banks().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let store = LocalStore::in_memory();
        store.save_transactions(&[sample_transaction("A")]).unwrap();
        store.save_banks(&[Bank::new("B")]).unwrap();
        store.set_last_sync(5);

        store.clear_all().unwrap();
        assert_eq!(store.export_data(), Snapshot::default());
    }
}
