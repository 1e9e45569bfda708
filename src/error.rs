//! Custom error types for m-track
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Local storage failures and remote backup
//! failures are kept in separate variants so callers can tell a lost write
//! apart from a backup that simply did not happen.

use thiserror::Error;

/// The main error type for m-track operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The local medium rejected a write (quota exceeded, disk full, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The remote backup client could not be set up
    #[error("Remote backup initialization failed: {0}")]
    RemoteInit(String),

    /// Sign-in failed or remote credentials are missing
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP failure while talking to the backup provider
    #[error("Network error{}: {message}", status_suffix(.status))]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Restore attempted before any backup was made
    #[error("No backup file found in remote storage")]
    BackupNotFound,

    /// Remote backup is not configured on this installation
    #[error("Remote backup unavailable: {0}")]
    RemoteUnavailable(String),

    /// Another push or pull is already running
    #[error("A sync operation is already in progress")]
    SyncInProgress,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Flat error category, for callers that only need to branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Json,
    Validation,
    NotFound,
    Duplicate,
    Storage,
    RemoteInit,
    Auth,
    Network,
    BackupNotFound,
    RemoteUnavailable,
    SyncInProgress,
}

impl TrackerError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for banks
    pub fn bank_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bank",
            identifier: identifier.into(),
        }
    }

    /// Create a network error with an HTTP status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a network error without a status (transport failure)
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::Storage(_) => ErrorKind::Storage,
            Self::RemoteInit(_) => ErrorKind::RemoteInit,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Network { .. } => ErrorKind::Network,
            Self::BackupNotFound => ErrorKind::BackupNotFound,
            Self::RemoteUnavailable(_) => ErrorKind::RemoteUnavailable,
            Self::SyncInProgress => ErrorKind::SyncInProgress,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for failures of the optional remote backup feature.
    ///
    /// These never invalidate local data.
    pub fn is_remote(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RemoteInit
                | ErrorKind::Auth
                | ErrorKind::Network
                | ErrorKind::BackupNotFound
                | ErrorKind::RemoteUnavailable
                | ErrorKind::SyncInProgress
        )
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result type alias for m-track operations
pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = TrackerError::bank_not_found("HDFC");
        assert_eq!(err.to_string(), "Bank not found: HDFC");
        assert!(err.is_not_found());
        assert!(!err.is_remote());
    }

    #[test]
    fn test_network_error_display() {
        let err = TrackerError::http(403, "forbidden");
        assert_eq!(err.to_string(), "Network error (403): forbidden");

        let err = TrackerError::network("connection reset");
        assert_eq!(err.to_string(), "Network error: connection reset");
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_remote_errors_are_classified() {
        assert!(TrackerError::BackupNotFound.is_remote());
        assert!(TrackerError::SyncInProgress.is_remote());
        assert!(TrackerError::RemoteUnavailable("no key".into()).is_remote());
        assert!(!TrackerError::Storage("quota".into()).is_remote());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TrackerError = io_err.into();
        assert!(matches!(err, TrackerError::Io(_)));
    }
}
