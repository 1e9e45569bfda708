//! m-track - personal income and expense tracker
//!
//! This library provides the core of the m-track application: a local
//! key-value store for transactions and banks, an in-memory state store that
//! writes through to it, and optional backup of the whole dataset to the
//! user's Google Drive app-data folder.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, banks, snapshots)
//! - `storage`: Key-value persistence of the dataset
//! - `app`: State store and application wiring
//! - `remote`: Google Drive backup adapter and OAuth device flow
//! - `sync`: Push/pull coordination and debounced auto-backup
//! - `reports`: Monthly dashboard and search
//! - `export`: JSON export
//! - `display`, `cli`: Terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use mtrack::app::AppStore;
//! use mtrack::storage::LocalStore;
//!
//! let store = AppStore::new(LocalStore::in_memory());
//! let bank = store.add_bank("HDFC")?;
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod remote;
pub mod reports;
pub mod storage;
pub mod sync;

pub use error::{ErrorKind, TrackerError, TrackerResult};
