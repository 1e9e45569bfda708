//! Transaction display formatting
//!
//! Tables for listings and search results, and a detail view for a single
//! transaction.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Bank, BankId, Transaction, UNKNOWN_BANK};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Bank")]
    bank: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Display name for an optional bank reference
pub fn bank_label(bank_id: Option<&BankId>, banks: &[Bank]) -> String {
    match bank_id {
        None => "-".to_string(),
        Some(id) => banks
            .iter()
            .find(|b| &b.id == id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| UNKNOWN_BANK.to_string()),
    }
}

/// Signed amount with currency, e.g. "-₹250.00"
pub fn format_amount(txn: &Transaction, currency: &str) -> String {
    let sign = if txn.is_income() { "+" } else { "-" };
    format!("{}{}{:.2}", sign, currency, txn.amount)
}

/// Format transactions as a table
pub fn format_transaction_table(transactions: &[Transaction], banks: &[Bank], currency: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| TransactionRow {
        id: txn.id.short().to_string(),
        date: txn.day().format("%Y-%m-%d").to_string(),
        kind: txn.kind.to_string(),
        label: truncate(&txn.label, 30),
        mode: txn.mode.to_string(),
        bank: bank_label(txn.bank_id.as_ref(), banks),
        amount: format_amount(txn, currency),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::last(), Alignment::right());

    format!("{}\n", table)
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, banks: &[Bank], currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.day().format("%Y-%m-%d")));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Amount:      {}{:.2}\n", currency, txn.amount));
    output.push_str(&format!("Label:       {}\n", txn.label));
    output.push_str(&format!("Mode:        {}\n", txn.mode));

    if txn.bank_id.is_some() {
        output.push_str(&format!(
            "Bank:        {}\n",
            bank_label(txn.bank_id.as_ref(), banks)
        ));
    }

    output
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
