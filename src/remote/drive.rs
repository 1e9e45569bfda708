//! Google Drive v3 backup adapter
//!
//! Stores the snapshot as a single JSON file in the app-private
//! `appDataFolder`. Requests carry the API key as a query parameter and the
//! cached OAuth token as a bearer header.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::RemoteSettings;
use crate::error::{TrackerError, TrackerResult};
use crate::models::Snapshot;

use super::oauth::{ConsentPrompt, OAuthClient};
use super::token::TokenCache;
use super::{
    AdapterState, FileHandle, RemoteBackup, APP_DATA_FOLDER, BACKUP_FILE_NAME,
    DRIVE_APPDATA_SCOPE,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY_CHARS: usize = 512;
const FILE_FIELDS: &str = "files(id,name,mimeType,modifiedTime)";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileHandle>,
}

/// Backup adapter for Google Drive
pub struct DriveBackup {
    settings: RemoteSettings,
    client: OnceLock<reqwest::Client>,
    state: Mutex<AdapterState>,
    tokens: TokenCache,
    prompt: Arc<dyn ConsentPrompt>,
}

impl DriveBackup {
    pub fn new(settings: RemoteSettings, tokens: TokenCache, prompt: Arc<dyn ConsentPrompt>) -> Self {
        Self {
            settings,
            client: OnceLock::new(),
            state: Mutex::new(AdapterState::Uninitialized),
            tokens,
            prompt,
        }
    }

    fn base_state(&self) -> AdapterState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(AdapterState::Uninitialized)
    }

    fn set_state(&self, next: AdapterState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    fn api_key(&self) -> &str {
        self.settings.api_key.as_deref().unwrap_or_default()
    }

    fn http(&self) -> TrackerResult<&reqwest::Client> {
        match self.base_state() {
            AdapterState::Disabled => Err(TrackerError::RemoteUnavailable(
                "Google API key not configured".into(),
            )),
            _ => self.client.get().ok_or_else(|| {
                TrackerError::RemoteInit("Google Drive client not initialized".into())
            }),
        }
    }

    fn bearer(&self) -> TrackerResult<String> {
        self.tokens
            .get()
            .map(|token| token.access_token)
            .ok_or_else(|| TrackerError::Auth("Not signed in to Google Drive".into()))
    }

    fn oauth(&self, http: &reqwest::Client, client_id: &str) -> OAuthClient {
        OAuthClient::new(
            http.clone(),
            &self.settings.oauth_base_url,
            client_id,
            self.settings.client_secret.clone(),
        )
    }

    /// Read the response body, turning non-2xx into `Network` errors.
    ///
    /// A 401 also drops the cached token so the next push signs in again.
    async fn read_body(&self, response: reqwest::Response) -> TrackerResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            debug!("Drive response status: {}", status);
            return Ok(body);
        }

        let mut preview = body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_ERROR_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Drive response error ({}): {}", status, preview);

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Google Drive rejected the access token; sign-in required");
            self.tokens.clear();
        }
        Err(TrackerError::http(status.as_u16(), preview))
    }
}

#[async_trait]
impl RemoteBackup for DriveBackup {
    async fn init(&self) -> TrackerResult<()> {
        if self.base_state() != AdapterState::Uninitialized {
            return Ok(());
        }

        if self.api_key().trim().is_empty() {
            log::info!("Google API key not configured; remote backup disabled");
            self.set_state(AdapterState::Disabled);
            return Ok(());
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TrackerError::RemoteInit(e.to_string()))?;
        let _ = self.client.set(client);
        self.tokens.load();
        self.set_state(AdapterState::Ready);
        debug!("Google Drive client initialized");
        Ok(())
    }

    async fn sign_in(&self) -> TrackerResult<()> {
        let client_id = self
            .settings
            .client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                TrackerError::Auth(
                    "Google Client ID not configured (set MTRACK_GOOGLE_CLIENT_ID)".into(),
                )
            })?;

        self.init().await?;
        let http = self.http()?;
        let token = self
            .oauth(http, &client_id)
            .authorize(DRIVE_APPDATA_SCOPE, self.prompt.as_ref())
            .await?;

        self.tokens.store(token);
        log::info!("Signed in to Google Drive");
        Ok(())
    }

    async fn sign_out(&self) -> TrackerResult<()> {
        if let (Some(token), Ok(http)) = (self.tokens.get(), self.http()) {
            let client_id = self.settings.client_id.clone().unwrap_or_default();
            if let Err(e) = self.oauth(http, &client_id).revoke(&token.access_token).await {
                log::warn!("Failed to revoke Google token: {}", e);
            }
        }
        self.tokens.clear();
        log::info!("Signed out of Google Drive");
        Ok(())
    }

    fn is_signed_in(&self) -> bool {
        self.tokens.is_present()
    }

    fn state(&self) -> AdapterState {
        match self.base_state() {
            AdapterState::Ready if self.tokens.is_present() => AdapterState::Authenticated,
            other => other,
        }
    }

    async fn find_file(&self) -> TrackerResult<Option<FileHandle>> {
        let http = self.http()?;
        let token = self.bearer()?;
        let url = format!("{}/files", self.settings.drive_base_url);
        let query = format!("name='{}' and trashed=false", BACKUP_FILE_NAME);

        let response = http
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("spaces", APP_DATA_FOLDER),
                ("fields", FILE_FIELDS),
                ("key", self.api_key()),
            ])
            .send()
            .await?;

        let body = self.read_body(response).await?;
        let list: FileList = serde_json::from_str(&body)?;
        Ok(list.files.into_iter().next())
    }

    async fn upload(&self, snapshot: &Snapshot) -> TrackerResult<()> {
        let http = self.http()?;
        let token = self.bearer()?;
        let existing = self.find_file().await?;

        let (request, metadata) = match &existing {
            Some(file) => (
                http.patch(format!("{}/files/{}", self.settings.upload_base_url, file.id)),
                serde_json::json!({
                    "name": BACKUP_FILE_NAME,
                    "mimeType": "application/json",
                }),
            ),
            None => (
                http.post(format!("{}/files", self.settings.upload_base_url)),
                serde_json::json!({
                    "name": BACKUP_FILE_NAME,
                    "mimeType": "application/json",
                    "parents": [APP_DATA_FOLDER],
                }),
            ),
        };

        let data = serde_json::to_string_pretty(snapshot)?;
        let boundary = format!("mtrack-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata.to_string(), &data);

        let response = request
            .bearer_auth(&token)
            .query(&[("uploadType", "multipart"), ("key", self.api_key())])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;
        self.read_body(response).await?;

        log::info!(
            "{} backup with {} transactions and {} banks",
            if existing.is_some() { "Updated" } else { "Created" },
            snapshot.transactions.len(),
            snapshot.banks.len()
        );
        Ok(())
    }

    async fn download(&self) -> TrackerResult<Snapshot> {
        let file = self
            .find_file()
            .await?
            .ok_or(TrackerError::BackupNotFound)?;
        let http = self.http()?;
        let token = self.bearer()?;

        let url = format!("{}/files/{}", self.settings.drive_base_url, file.id);
        let response = http
            .get(&url)
            .bearer_auth(&token)
            .query(&[("alt", "media"), ("key", self.api_key())])
            .send()
            .await?;

        let body = self.read_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| TrackerError::Json(format!("Backup file is not a valid snapshot: {}", e)))
    }
}

/// Body for `uploadType=multipart`: metadata part, then media part
fn multipart_related(boundary: &str, metadata: &str, media: &str) -> String {
    format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
         --{b}\r\nContent-Type: application/json\r\n\r\n{media}\r\n--{b}--\r\n",
        b = boundary,
        metadata = metadata,
        media = media,
    )
}
