//! Core data models for m-track
//!
//! This module contains the data structures that make up a user's dataset:
//! transactions, banks, and the snapshot that bundles them for backup.

pub mod bank;
pub mod ids;
pub mod month;
pub mod snapshot;
pub mod transaction;

pub use bank::{find_preset, search_presets, Bank, PresetBank, POPULAR_BANKS, UNKNOWN_BANK};
pub use ids::{BankId, TransactionId};
pub use month::{Month, MonthParseError};
pub use snapshot::Snapshot;
pub use transaction::{parse_iso_date, NewTransaction, PaymentMode, Transaction, TransactionType};
