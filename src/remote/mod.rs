//! Remote backup of the whole dataset
//!
//! One backup file per user lives in the provider's app-private folder.
//! The sync coordinator talks to it only through the [`RemoteBackup`] trait.

pub mod drive;
pub mod oauth;
pub mod token;

pub use drive::DriveBackup;
pub use oauth::{ConsentPrompt, OAuthClient};
pub use token::{AccessToken, TokenCache};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::TrackerResult;
use crate::models::Snapshot;

/// Name of the single backup file
pub const BACKUP_FILE_NAME: &str = "m-track-data.json";

/// App-private folder the backup lives in
pub const APP_DATA_FOLDER: &str = "appDataFolder";

/// OAuth scope granting access to the app-private folder only
pub const DRIVE_APPDATA_SCOPE: &str = "https://www.googleapis.com/auth/drive.appdata";

/// A file found in remote storage
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
}

/// Where the adapter is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    /// Client set up, no token yet
    Ready,
    /// Not configured on this installation; stays this way
    Disabled,
    Authenticated,
}

/// Authenticate against and move snapshots to and from a backup provider
#[async_trait]
pub trait RemoteBackup: Send + Sync {
    /// Prepare the client. Idempotent.
    async fn init(&self) -> TrackerResult<()>;

    async fn sign_in(&self) -> TrackerResult<()>;

    /// Revoke and forget the cached token
    async fn sign_out(&self) -> TrackerResult<()>;

    /// Whether a usable token is cached
    fn is_signed_in(&self) -> bool;

    /// Current lifecycle state
    fn state(&self) -> AdapterState;

    /// The backup file, if one exists
    async fn find_file(&self) -> TrackerResult<Option<FileHandle>>;

    /// Create or replace the backup file
    async fn upload(&self, snapshot: &Snapshot) -> TrackerResult<()>;

    /// Fetch the backup file; `BackupNotFound` if there is none
    async fn download(&self) -> TrackerResult<Snapshot>;
}
