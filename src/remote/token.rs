//! OAuth access token and its cache
//!
//! The cache keeps the token in memory and mirrors it to `token.json` so a
//! later process still sees the user as signed in. A mirrored token that has
//! already expired is discarded on load, so the next sync signs in again.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::storage::file_io::{read_optional, remove_if_exists, write_json_atomic};

/// A bearer token for the backup provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Epoch millis after which the provider will reject the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl AccessToken {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_at: None,
            scope: None,
        }
    }

    /// Build from a token endpoint response's `expires_in` (seconds)
    pub fn expiring_in(access_token: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        let mut token = Self::bearer(access_token);
        token.expires_at =
            expires_in_secs.map(|secs| Utc::now().timestamp_millis() + secs * 1000);
        token
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Utc::now().timestamp_millis() >= at)
            .unwrap_or(false)
    }
}

/// In-memory token with an optional on-disk mirror
#[derive(Debug, Default)]
pub struct TokenCache {
    path: Option<PathBuf>,
    token: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    /// Cache that only lives for this process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache mirrored to `path`
    pub fn persistent(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            token: Mutex::new(None),
        }
    }

    /// Load the mirrored token from disk, if any. Unreadable files are ignored.
    pub fn load(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let loaded = match read_optional(path) {
            Ok(Some(raw)) => match serde_json::from_str::<AccessToken>(&raw) {
                Ok(token) => Some(token),
                Err(e) => {
                    log::warn!("Ignoring unreadable token cache {}: {}", path.display(), e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read token cache: {}", e);
                None
            }
        };
        if let Some(token) = loaded {
            if token.is_expired() {
                log::info!("Cached access token has expired; discarding it");
                if let Err(e) = remove_if_exists(path) {
                    log::warn!("Failed to remove token cache: {}", e);
                }
                return;
            }
            if let Ok(mut guard) = self.token.lock() {
                *guard = Some(token);
            }
        }
    }

    pub fn get(&self) -> Option<AccessToken> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn is_present(&self) -> bool {
        self.token
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn store(&self, token: AccessToken) {
        if let Some(path) = &self.path {
            match write_json_atomic(path, &token) {
                Ok(()) => restrict_permissions(path),
                Err(e) => log::warn!("Failed to persist token cache: {}", e),
            }
        }
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
        if let Some(path) = &self.path {
            if let Err(e) = remove_if_exists(path) {
                log::warn!("Failed to remove token cache: {}", e);
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        log::debug!("Could not restrict token cache permissions: {}", e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) {}
