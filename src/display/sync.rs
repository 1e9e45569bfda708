//! Sync status display

use chrono::{Local, TimeZone};

use crate::remote::AdapterState;
use crate::sync::SyncState;

/// Human-readable local time for an epoch-millis timestamp
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{} (invalid)", millis),
    }
}

/// Format sync status for `mtrack sync status`
pub fn format_sync_status(state: &SyncState) -> String {
    let mut output = String::new();

    let connection = match (state.remote, state.connected) {
        (AdapterState::Disabled, _) => "Not configured (set MTRACK_GOOGLE_API_KEY)",
        (_, true) => "Connected",
        (_, false) => "Not connected",
    };
    output.push_str(&format!("Google Drive: {}\n", connection));

    match state.last_sync {
        Some(millis) => output.push_str(&format!("Last sync:    {}\n", format_timestamp(millis))),
        None => output.push_str("Last sync:    never\n"),
    }

    if state.syncing {
        output.push_str("A sync is in progress.\n");
    }
    if let Some(error) = &state.last_error {
        output.push_str(&format!("Last error:   {}\n", error));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_never_synced() {
        let state = SyncState {
            last_sync: None,
            connected: false,
            syncing: false,
            last_error: None,
            remote: AdapterState::Ready,
        };
        let output = format_sync_status(&state);
        assert!(output.contains("Not connected"));
        assert!(output.contains("never"));
        assert!(!output.contains("Last error"));
    }

    #[test]
    fn test_status_with_error() {
        let state = SyncState {
            last_sync: Some(1_700_000_000_000),
            connected: true,
            syncing: false,
            last_error: Some("HTTP 500".into()),
            remote: AdapterState::Authenticated,
        };
        let output = format_sync_status(&state);
        assert!(output.contains("Connected"));
        assert!(output.contains("HTTP 500"));
        assert!(!output.contains("never"));
    }

    #[test]
    fn test_status_without_credentials() {
        let state = SyncState {
            last_sync: None,
            connected: false,
            syncing: false,
            last_error: None,
            remote: AdapterState::Disabled,
        };
        let output = format_sync_status(&state);
        assert!(output.contains("Not configured"));
        assert!(!output.contains("Not connected"));
    }
}
