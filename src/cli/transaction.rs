//! Transaction CLI commands
//!
//! Implements CLI commands for transaction management.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use serde::Deserialize;

use super::{parse_amount, parse_date, parse_kind, parse_mode, parse_month};
use crate::app::{AppContext, AppStore};
use crate::display::transaction::{format_transaction_details, format_transaction_table};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{NewTransaction, Transaction};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a new transaction
    Add {
        /// Transaction type (income, expense)
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,
        /// Amount (e.g., "250" or "99.50")
        #[arg(short, long)]
        amount: String,
        /// Description
        #[arg(short, long)]
        label: String,
        /// Payment mode (cash, card, upi, bank-transfer)
        #[arg(short, long, default_value = "cash")]
        mode: String,
        /// Bank name or ID, for bank transfers
        #[arg(short, long)]
        bank: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID or unique prefix
        id: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID or unique prefix
        id: String,
        /// New type
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New label
        #[arg(short, long)]
        label: Option<String>,
        /// New payment mode
        #[arg(short, long)]
        mode: Option<String>,
        /// New bank name or ID
        #[arg(short, long)]
        bank: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Record several transactions at once from a JSON file ("-" for stdin)
    ///
    /// The file holds an array of objects with `amount` and `label`, and
    /// optionally `type`, `mode`, `bank`, and `date`.
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID or unique prefix
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(ctx: &AppContext, cmd: TransactionCommands) -> TrackerResult<()> {
    let store = &ctx.store;

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            label,
            mode,
            bank,
            date,
        } => {
            let bank_id = bank.as_deref().map(|b| store.resolve_bank_id(b)).transpose()?;
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Utc::now(),
            };

            let txn = store.add_transaction(NewTransaction {
                kind: parse_kind(&kind)?,
                amount: parse_amount(&amount)?,
                label,
                mode: parse_mode(&mode)?,
                bank_id,
                date,
            })?;

            println!("Recorded transaction:");
            print_summary(ctx, &txn);
        }

        TransactionCommands::List { month, limit } => {
            let mut transactions = store.transactions();
            if let Some(month) = month {
                let month = parse_month(Some(&month))?;
                transactions.retain(|t| month.contains(t.day()));
            }
            transactions.sort_by(|a, b| b.date.cmp(&a.date));

            let total = transactions.len();
            transactions.truncate(limit);

            print!(
                "{}",
                format_transaction_table(&transactions, &store.banks(), ctx.currency())
            );
            println!("\nShowing {} of {} transactions", transactions.len(), total);
        }

        TransactionCommands::Show { id } => {
            let id = store.resolve_transaction_id(&id)?;
            if let Some(txn) = store.transaction(&id) {
                print!(
                    "{}",
                    format_transaction_details(&txn, &store.banks(), ctx.currency())
                );
            }
        }

        TransactionCommands::Edit {
            id,
            kind,
            amount,
            label,
            mode,
            bank,
            date,
        } => {
            let id = store.resolve_transaction_id(&id)?;
            let Some(existing) = store.transaction(&id) else {
                return Err(TrackerError::transaction_not_found(id.as_str()));
            };

            if kind.is_none()
                && amount.is_none()
                && label.is_none()
                && mode.is_none()
                && bank.is_none()
                && date.is_none()
            {
                println!("No changes specified.");
                return Ok(());
            }

            let input = NewTransaction {
                kind: kind.as_deref().map(parse_kind).transpose()?.unwrap_or(existing.kind),
                amount: amount
                    .as_deref()
                    .map(parse_amount)
                    .transpose()?
                    .unwrap_or(existing.amount),
                label: label.unwrap_or(existing.label),
                mode: mode.as_deref().map(parse_mode).transpose()?.unwrap_or(existing.mode),
                bank_id: match bank {
                    Some(b) => Some(store.resolve_bank_id(&b)?),
                    None => existing.bank_id,
                },
                date: date.as_deref().map(parse_date).transpose()?.unwrap_or(existing.date),
            };

            let updated = store.update_transaction(&id, input)?;
            println!("Updated transaction:");
            print_summary(ctx, &updated);
        }

        TransactionCommands::Import { file } => {
            let contents = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(&file).map_err(|e| {
                    TrackerError::Io(format!("Failed to read {}: {}", file.display(), e))
                })?
            };

            let inputs = parse_bulk_rows(store, &contents)?;
            let added = store.add_transactions(inputs)?;

            println!("Recorded {} transactions.", added.len());
            print!(
                "{}",
                format_transaction_table(&added, &store.banks(), ctx.currency())
            );
        }

        TransactionCommands::Delete { id, force } => {
            let id = store.resolve_transaction_id(&id)?;

            if !force {
                if let Some(txn) = store.transaction(&id) {
                    println!("About to delete transaction:");
                    print_summary(ctx, &txn);
                }
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = store.delete_transaction(&id)?;
            println!(
                "Deleted transaction: {} ({} {}{:.2})",
                deleted.label,
                deleted.kind,
                ctx.currency(),
                deleted.amount
            );
        }
    }

    Ok(())
}

/// One row of a bulk import file
#[derive(Debug, Deserialize)]
struct BulkRow {
    #[serde(rename = "type", default = "default_kind")]
    kind: String,
    amount: serde_json::Value,
    label: String,
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    bank: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

fn default_kind() -> String {
    "expense".to_string()
}

fn default_mode() -> String {
    "cash".to_string()
}

/// Parse every row up front so a bad row rejects the whole batch
fn parse_bulk_rows(store: &AppStore, contents: &str) -> TrackerResult<Vec<NewTransaction>> {
    let rows: Vec<BulkRow> = serde_json::from_str(contents).map_err(|e| {
        TrackerError::Validation(format!("Invalid import file: {}", e))
    })?;

    let now = Utc::now();
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            parse_bulk_row(store, row, now).map_err(|e| {
                TrackerError::Validation(format!("Row {}: {}", index + 1, e))
            })
        })
        .collect()
}

fn parse_bulk_row(
    store: &AppStore,
    row: BulkRow,
    now: chrono::DateTime<Utc>,
) -> TrackerResult<NewTransaction> {
    let amount = match &row.amount {
        serde_json::Value::String(s) => parse_amount(s)?,
        other => parse_amount(&other.to_string())?,
    };

    Ok(NewTransaction {
        kind: parse_kind(&row.kind)?,
        amount,
        label: row.label,
        mode: parse_mode(&row.mode)?,
        bank_id: row.bank.as_deref().map(|b| store.resolve_bank_id(b)).transpose()?,
        date: row.date.as_deref().map(parse_date).transpose()?.unwrap_or(now),
    })
}

fn print_summary(ctx: &AppContext, txn: &Transaction) {
    println!("  ID:     {}", txn.id);
    println!("  Date:   {}", txn.day());
    println!("  Type:   {}", txn.kind);
    println!("  Amount: {}{:.2}", ctx.currency(), txn.amount);
    println!("  Label:  {}", txn.label);
    println!("  Mode:   {}", txn.mode);
    if let Some(bank_id) = &txn.bank_id {
        println!("  Bank:   {}", ctx.store.bank_name(bank_id));
    }
}
