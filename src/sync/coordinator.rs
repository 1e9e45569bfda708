//! Sync coordinator
//!
//! Decides when local state is pushed to or pulled from the remote backup.
//! It is the only caller of the [`RemoteBackup`] adapter. Push and pull are
//! mutually exclusive: a request that arrives while one is running is
//! rejected with [`TrackerError::SyncInProgress`] rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::app::ChangeListener;
use crate::error::{TrackerError, TrackerResult};
use crate::models::Snapshot;
use crate::remote::{AdapterState, RemoteBackup};
use crate::storage::LocalStore;

use super::debounce::Debouncer;

/// Observable sync status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    /// Epoch millis of the last successful push or pull
    pub last_sync: Option<i64>,
    pub connected: bool,
    pub syncing: bool,
    /// Message of the most recent failed push or pull, cleared on success
    pub last_error: Option<String>,
    pub remote: AdapterState,
}

/// Holds the in-flight flag; releasing happens on drop so an aborted or
/// panicking sync cannot leave it set.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> TrackerResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TrackerError::SyncInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct Inner {
    remote: Arc<dyn RemoteBackup>,
    store: LocalStore,
    debounce: Duration,
    connected: AtomicBool,
    syncing: AtomicBool,
    last_error: Mutex<Option<String>>,
    debouncer: Debouncer,
}

/// Moves snapshots between the local store and the remote backup
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    pub fn new(remote: Arc<dyn RemoteBackup>, store: LocalStore, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                remote,
                store,
                debounce,
                connected: AtomicBool::new(false),
                syncing: AtomicBool::new(false),
                last_error: Mutex::new(None),
                debouncer: Debouncer::new(),
            }),
        }
    }

    pub fn status(&self) -> SyncState {
        SyncState {
            last_sync: self.inner.store.get_last_sync(),
            connected: self.is_connected(),
            syncing: self.inner.syncing.load(Ordering::Acquire),
            last_error: self
                .inner
                .last_error
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
            remote: self.inner.remote.state(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::Release);
    }

    /// Initialize the adapter and adopt a cached sign-in, if any
    pub async fn refresh_status(&self) {
        match self.inner.remote.init().await {
            Ok(()) => self.set_connected(self.inner.remote.is_signed_in()),
            Err(e) => {
                log::warn!("Remote backup unavailable: {}", e);
                self.set_connected(false);
            }
        }
    }

    /// Sign in and push the current data. Connected only if all of it succeeds.
    ///
    /// A sign-in followed by a failed push is undone, so the cached credentials
    /// do not make the next process believe it is connected.
    pub async fn connect(&self) -> TrackerResult<()> {
        let result = async {
            self.inner.remote.init().await?;
            self.inner.remote.sign_in().await?;
            self.set_connected(true);
            self.push_to_remote().await
        }
        .await;

        if let Err(e) = &result {
            log::warn!("Failed to connect remote backup: {}", e);
            self.set_connected(false);
            if self.inner.remote.is_signed_in() {
                if let Err(sign_out_err) = self.inner.remote.sign_out().await {
                    log::warn!("Sign-out after failed connect failed: {}", sign_out_err);
                }
            }
        }
        result
    }

    /// Sign out. Always ends disconnected, even if sign-out fails.
    pub async fn disconnect(&self) -> TrackerResult<()> {
        self.inner.debouncer.cancel();
        let result = self.inner.remote.sign_out().await;
        self.set_connected(false);
        if let Err(e) = &result {
            log::warn!("Sign-out failed: {}", e);
        }
        result
    }

    /// Upload the current local snapshot
    pub async fn push_to_remote(&self) -> TrackerResult<()> {
        let _in_flight = InFlight::acquire(&self.inner.syncing)?;
        let result = self.push_locked().await;
        self.record_outcome(&result);
        result
    }

    async fn push_locked(&self) -> TrackerResult<()> {
        self.ensure_signed_in().await?;
        let snapshot = self.inner.store.export_data();
        self.inner.remote.upload(&snapshot).await?;

        let now = Utc::now().timestamp_millis();
        self.inner.store.set_last_sync(now);
        log::info!("Backed up {} transactions", snapshot.transactions.len());
        Ok(())
    }

    /// Replace local data with the remote backup
    pub async fn pull_from_remote(&self) -> TrackerResult<Snapshot> {
        let _in_flight = InFlight::acquire(&self.inner.syncing)?;
        let result = self.pull_locked().await;
        self.record_outcome(&result);
        result
    }

    async fn pull_locked(&self) -> TrackerResult<Snapshot> {
        self.ensure_signed_in().await?;
        let snapshot = self.inner.remote.download().await?;
        self.inner.store.import_data(&snapshot)?;
        Ok(snapshot)
    }

    async fn ensure_signed_in(&self) -> TrackerResult<()> {
        self.inner.remote.init().await?;
        if !self.inner.remote.is_signed_in() {
            self.inner.remote.sign_in().await?;
            self.set_connected(true);
        }
        Ok(())
    }

    fn record_outcome<T>(&self, result: &TrackerResult<T>) {
        if let Ok(mut last_error) = self.inner.last_error.lock() {
            *last_error = result.as_ref().err().map(|e| e.to_string());
        }
    }

    /// Schedule a debounced push if connected
    pub fn on_local_change(&self) {
        if !self.is_connected() {
            return;
        }

        let coordinator = self.clone();
        self.inner.debouncer.schedule(self.inner.debounce, async move {
            if let Err(e) = coordinator.push_to_remote().await {
                log::warn!("Automatic backup failed: {}", e);
            }
        });
    }

    /// Whether a debounced push is waiting
    pub fn has_pending_push(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Run a pending debounced push now. Returns whether one was pending.
    pub async fn flush(&self) -> TrackerResult<bool> {
        if !self.inner.debouncer.cancel() {
            return Ok(false);
        }
        self.push_to_remote().await?;
        Ok(true)
    }
}

impl ChangeListener for SyncCoordinator {
    fn on_change(&self) {
        self.on_local_change();
    }
}
