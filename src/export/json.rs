//! JSON Export functionality
//!
//! Writes a snapshot to a file with a small metadata header. The snapshot
//! fields sit at the top level, so an export can be read back as a plain
//! backup snapshot.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::models::Snapshot;
use crate::storage::write_atomic;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Snapshot plus export metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    #[serde(flatten)]
    pub data: Snapshot,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub transaction_count: usize,
    pub bank_count: usize,
    pub earliest_transaction: Option<NaiveDate>,
    pub latest_transaction: Option<NaiveDate>,
}

impl JsonExport {
    pub fn from_snapshot(data: Snapshot) -> Self {
        let metadata = ExportMetadata {
            transaction_count: data.transactions.len(),
            bank_count: data.banks.len(),
            earliest_transaction: data.transactions.iter().map(|t| t.day()).min(),
            latest_transaction: data.transactions.iter().map(|t| t.day()).max(),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            data,
            metadata,
        }
    }
}

/// Keep only transactions whose day falls in the inclusive range
pub fn restrict_to_range(
    mut snapshot: Snapshot,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Snapshot {
    snapshot.transactions.retain(|t| {
        let day = t.day();
        from.map_or(true, |from| day >= from) && to.map_or(true, |to| day <= to)
    });
    snapshot
}

/// Serialize a snapshot export to any writer
pub fn export_json<W: Write>(snapshot: &Snapshot, writer: &mut W, pretty: bool) -> TrackerResult<()> {
    let export = JsonExport::from_snapshot(snapshot.clone());

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    }?;
    writer.flush()?;

    Ok(())
}

/// Write a snapshot export to `path` atomically
pub fn export_to_file(snapshot: &Snapshot, path: &Path) -> TrackerResult<()> {
    let mut buffer = Vec::new();
    export_json(snapshot, &mut buffer, true)?;
    let contents = String::from_utf8(buffer)
        .map_err(|e| TrackerError::Json(format!("Export is not valid UTF-8: {}", e)))?;
    write_atomic(path, &contents)?;
    log::info!(
        "Exported {} transactions to {}",
        snapshot.transactions.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_iso_date, Bank, NewTransaction, PaymentMode, Transaction, TransactionType};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn snapshot() -> Snapshot {
        let make = |label: &str, date: &str| {
            Transaction::new(NewTransaction {
                kind: TransactionType::Expense,
                amount: dec!(120.5),
                label: label.into(),
                mode: PaymentMode::Card,
                bank_id: None,
                date: parse_iso_date(date).unwrap(),
            })
        };
        Snapshot::new(
            vec![make("Fuel", "2024-02-10"), make("Books", "2024-03-05")],
            vec![Bank::new("SBI")],
            Some(42),
        )
    }

    #[test]
    fn test_export_metadata() {
        let export = JsonExport::from_snapshot(snapshot());
        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.transaction_count, 2);
        assert_eq!(export.metadata.bank_count, 1);
        assert_eq!(
            export.metadata.earliest_transaction.unwrap().to_string(),
            "2024-02-10"
        );
        assert_eq!(
            export.metadata.latest_transaction.unwrap().to_string(),
            "2024-03-05"
        );
    }

    #[test]
    fn test_export_file_reads_back_as_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.json");
        let original = snapshot();

        export_to_file(&original, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["schemaVersion"], EXPORT_SCHEMA_VERSION);
        assert_eq!(value["transactions"][0]["type"], "EXPENSE");

        let restored: Snapshot = serde_json::from_str(&contents).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_restrict_to_range() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let only_march = restrict_to_range(snapshot(), Some(march), None);
        assert_eq!(only_march.transactions.len(), 1);
        assert_eq!(only_march.transactions[0].label, "Books");
        assert_eq!(only_march.banks.len(), 1);

        let everything = restrict_to_range(snapshot(), None, None);
        assert_eq!(everything.transactions.len(), 2);
    }
}
