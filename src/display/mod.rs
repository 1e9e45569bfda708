//! Display formatting for terminal output
//!
//! Tables and detail views for transactions, banks, and sync status. The
//! monthly summary formats itself, see [`crate::reports::MonthlySummary`].

pub mod bank;
pub mod sync;
pub mod transaction;

pub use bank::format_bank_list;
pub use sync::{format_sync_status, format_timestamp};
pub use transaction::{bank_label, format_amount, format_transaction_details, format_transaction_table};
