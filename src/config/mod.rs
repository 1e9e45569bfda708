//! Configuration module for m-track
//!
//! This module provides configuration management including:
//! - Path resolution for settings, data, and the token cache
//! - User settings persistence
//! - Remote backup credentials

pub mod paths;
pub mod settings;

pub use paths::TrackerPaths;
pub use settings::{RemoteSettings, Settings, SyncSettings};
