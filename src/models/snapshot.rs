//! Snapshot model
//!
//! The unit of backup and restore: both entity lists plus the last sync time,
//! always captured together.

use serde::{Deserialize, Serialize};

use super::bank::Bank;
use super::transaction::Transaction;

/// Point-in-time copy of the whole dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub banks: Vec<Bank>,

    /// Epoch milliseconds of the last successful sync
    #[serde(default)]
    pub last_sync: Option<i64>,
}

impl Snapshot {
    pub fn new(transactions: Vec<Transaction>, banks: Vec<Bank>, last_sync: Option<i64>) -> Self {
        Self {
            transactions,
            banks,
            last_sync,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.banks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let snapshot = Snapshot::default();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"transactions": [], "banks": [], "lastSync": null})
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"banks":[{"id":"b1","name":"SBI"}]}"#).unwrap();
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.banks.len(), 1);
        assert_eq!(snapshot.last_sync, None);
        assert!(!snapshot.is_empty());
    }
}
