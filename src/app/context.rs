//! Application wiring
//!
//! Builds the local store, the remote backup adapter, the sync coordinator,
//! and the state store from settings, and connects them so that committed
//! changes schedule a backup.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Settings, TrackerPaths};
use crate::error::TrackerResult;
use crate::models::Snapshot;
use crate::remote::{ConsentPrompt, DriveBackup, RemoteBackup, TokenCache};
use crate::storage::LocalStore;
use crate::sync::SyncCoordinator;

use super::store::AppStore;

/// Everything a command needs
pub struct AppContext {
    pub paths: TrackerPaths,
    pub settings: Settings,
    pub store: AppStore,
    pub sync: SyncCoordinator,
}

impl AppContext {
    /// Open the on-disk dataset with Google Drive as the backup target
    pub fn open(
        paths: TrackerPaths,
        settings: Settings,
        prompt: Arc<dyn ConsentPrompt>,
    ) -> TrackerResult<Self> {
        let local = LocalStore::open(&paths)?;
        let tokens = TokenCache::persistent(paths.token_file());
        let remote = Arc::new(DriveBackup::new(settings.effective_remote(), tokens, prompt));
        Ok(Self::with_remote(paths, settings, local, remote))
    }

    pub fn with_remote(
        paths: TrackerPaths,
        settings: Settings,
        local: LocalStore,
        remote: Arc<dyn RemoteBackup>,
    ) -> Self {
        let debounce = Duration::from_secs(settings.sync.debounce_secs);
        let sync = SyncCoordinator::new(remote, local.clone(), debounce);
        let store = AppStore::new(local).with_listener(Arc::new(sync.clone()));

        Self {
            paths,
            settings,
            store,
            sync,
        }
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency_symbol
    }

    /// Replace local data with the remote backup and reload the state store
    pub async fn restore_from_remote(&self) -> TrackerResult<Snapshot> {
        let snapshot = self.sync.pull_from_remote().await?;
        self.store.reload()?;
        if snapshot.is_empty() {
            log::warn!("Restored an empty backup; local data is now empty");
            return Ok(snapshot);
        }
        log::info!(
            "Restored {} transactions and {} banks from backup",
            snapshot.transactions.len(),
            snapshot.banks.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::models::{parse_iso_date, Bank, NewTransaction, PaymentMode, TransactionType};
    use crate::sync::coordinator::tests::MockRemote;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn context(remote: Arc<MockRemote>) -> (AppContext, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let ctx = AppContext::with_remote(
            paths,
            Settings::default(),
            LocalStore::in_memory(),
            remote,
        );
        (ctx, temp_dir)
    }

    fn rent() -> NewTransaction {
        NewTransaction {
            kind: TransactionType::Expense,
            amount: dec!(15000),
            label: "Rent".into(),
            mode: PaymentMode::Upi,
            bank_id: None,
            date: parse_iso_date("2024-03-01").unwrap(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_schedules_backup_when_connected() {
        let remote = Arc::new(MockRemote::default());
        let (ctx, _dir) = context(remote.clone());

        ctx.store.add_transaction(rent()).unwrap();
        assert!(!ctx.sync.has_pending_push());

        ctx.sync.connect().await.unwrap();
        assert_eq!(remote.upload_count(), 1);

        ctx.store.add_bank("HDFC").unwrap();
        assert!(ctx.sync.has_pending_push());

        assert!(ctx.sync.flush().await.unwrap());
        assert_eq!(remote.upload_count(), 2);
        let uploaded = remote.uploads.lock().unwrap().last().cloned().unwrap();
        assert_eq!(uploaded.transactions.len(), 1);
        assert_eq!(uploaded.banks.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_reloads_state_store() {
        let remote = Arc::new(MockRemote::default());
        let backup = Snapshot::new(Vec::new(), vec![Bank::new("SBI")], Some(7));
        *remote.stored.lock().unwrap() = Some(backup);

        let (ctx, _dir) = context(remote);
        ctx.store.add_transaction(rent()).unwrap();

        let snapshot = ctx.restore_from_remote().await.unwrap();
        assert_eq!(snapshot.banks.len(), 1);
        assert!(ctx.store.transactions().is_empty());
        assert_eq!(ctx.store.banks()[0].name, "SBI");
        assert!(ctx.sync.is_connected());
    }

    #[tokio::test]
    async fn test_restore_without_backup_keeps_data() {
        let (ctx, _dir) = context(Arc::new(MockRemote::default()));
        ctx.store.add_transaction(rent()).unwrap();

        let err = ctx.restore_from_remote().await.unwrap_err();
        assert!(matches!(err, TrackerError::BackupNotFound));
        assert_eq!(ctx.store.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_empty_backup_clears_data() {
        let remote = Arc::new(MockRemote::default());
        *remote.stored.lock().unwrap() = Some(Snapshot::new(Vec::new(), Vec::new(), None));

        let (ctx, _dir) = context(remote);
        ctx.store.add_transaction(rent()).unwrap();
        ctx.store.add_bank("HDFC").unwrap();

        let snapshot = ctx.restore_from_remote().await.unwrap();
        assert!(snapshot.is_empty());
        assert!(ctx.store.transactions().is_empty());
        assert!(ctx.store.banks().is_empty());
    }
}
