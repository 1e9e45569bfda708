//! User settings for m-track
//!
//! Display preferences, sync timing, and the remote backup endpoints.
//! Remote credentials can also come from the environment, which wins over the
//! settings file.

use serde::{Deserialize, Serialize};

use super::paths::TrackerPaths;
use crate::error::TrackerError;

pub const CLIENT_ID_ENV: &str = "MTRACK_GOOGLE_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "MTRACK_GOOGLE_CLIENT_SECRET";
pub const API_KEY_ENV: &str = "MTRACK_GOOGLE_API_KEY";

/// Sync timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Quiet period after the last local change before an automatic push
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce_secs: default_debounce_secs(),
        }
    }
}

/// Remote backup (Google Drive) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// OAuth client id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth client secret (required by Google for installed apps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// API key; without it remote backup stays disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_key: None,
            oauth_base_url: default_oauth_base_url(),
            drive_base_url: default_drive_base_url(),
            upload_base_url: default_upload_base_url(),
        }
    }
}

impl RemoteSettings {
    /// Apply `MTRACK_GOOGLE_*` environment variables on top of these settings
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = non_empty_env(CLIENT_ID_ENV) {
            self.client_id = Some(v);
        }
        if let Some(v) = non_empty_env(CLIENT_SECRET_ENV) {
            self.client_secret = Some(v);
        }
        if let Some(v) = non_empty_env(API_KEY_ENV) {
            self.api_key = Some(v);
        }
        self
    }
}

/// User settings for m-track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used for display
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub remote: RemoteSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_debounce_secs() -> u64 {
    5
}

fn default_oauth_base_url() -> String {
    "https://oauth2.googleapis.com".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            sync: SyncSettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &TrackerPaths) -> Result<Self, TrackerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                TrackerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TrackerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackerPaths) -> Result<(), TrackerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            TrackerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            TrackerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Remote settings with environment overrides applied
    pub fn effective_remote(&self) -> RemoteSettings {
        self.remote.clone().with_env_overrides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.sync.debounce_secs, 5);
        assert_eq!(settings.currency_symbol, "₹");
        assert!(settings.remote.client_id.is_none());
        assert!(settings.remote.drive_base_url.starts_with("https://"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.sync.debounce_secs = 2;
        settings.remote.client_id = Some("client-123".into());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.sync.debounce_secs, 2);
        assert_eq!(loaded.remote.client_id.as_deref(), Some("client-123"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"currency_symbol": "$"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.currency_symbol, "$");
        assert_eq!(loaded.sync, SyncSettings::default());
        assert_eq!(loaded.remote, RemoteSettings::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }
}
