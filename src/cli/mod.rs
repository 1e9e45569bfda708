//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the application store and the
//! sync coordinator.

pub mod bank;
pub mod data;
pub mod report;
pub mod sync;
pub mod transaction;

pub use bank::{handle_bank_command, BankCommands};
pub use data::{handle_config_command, handle_export_command, handle_reset_command};
pub use report::{handle_search_command, handle_summary_command, SearchArgs};
pub use sync::{handle_sync_command, StderrPrompt, SyncCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{parse_iso_date, Month, PaymentMode, TransactionType};

pub(crate) fn parse_amount(s: &str) -> TrackerResult<Decimal> {
    Decimal::from_str(s.trim()).map_err(|_| {
        TrackerError::Validation(format!(
            "Invalid amount: '{}'. Use a number like '250' or '99.50'",
            s
        ))
    })
}

pub(crate) fn parse_day(s: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        TrackerError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

pub(crate) fn parse_date(s: &str) -> TrackerResult<DateTime<Utc>> {
    parse_iso_date(s).ok_or_else(|| {
        TrackerError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

pub(crate) fn parse_kind(s: &str) -> TrackerResult<TransactionType> {
    TransactionType::parse(s).ok_or_else(|| {
        TrackerError::Validation(format!(
            "Invalid transaction type: '{}'. Use income or expense",
            s
        ))
    })
}

pub(crate) fn parse_mode(s: &str) -> TrackerResult<PaymentMode> {
    PaymentMode::parse(s).ok_or_else(|| {
        TrackerError::Validation(format!(
            "Invalid payment mode: '{}'. Use cash, card, upi, or bank-transfer",
            s
        ))
    })
}

pub(crate) fn parse_month(s: Option<&str>) -> TrackerResult<Month> {
    match s {
        Some(s) => Month::parse(s).map_err(|e| TrackerError::Validation(e.to_string())),
        None => Ok(Month::current()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_amount(" 99.50 ").unwrap(), dec!(99.50));
        assert!(parse_amount("ten").unwrap_err().is_validation());

        assert_eq!(parse_day("2024-03-05").unwrap().to_string(), "2024-03-05");
        assert!(parse_day("05/03/2024").is_err());

        assert_eq!(parse_kind("INCOME").unwrap(), TransactionType::Income);
        assert_eq!(parse_mode("bank-transfer").unwrap(), PaymentMode::BankTransfer);
        assert!(parse_mode("cheque").is_err());

        assert_eq!(parse_month(Some("2024-02")).unwrap().to_string(), "2024-02");
        assert!(parse_month(Some("2024-13")).is_err());
    }
}
