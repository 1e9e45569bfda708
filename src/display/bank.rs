//! Bank display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Bank, PresetBank, Transaction};

#[derive(Tabled)]
struct BankRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Transactions")]
    transactions: usize,
}

/// Format banks as a table, with how many transactions reference each one
pub fn format_bank_list(banks: &[Bank], transactions: &[Transaction]) -> String {
    if banks.is_empty() {
        return "No banks found.\n".to_string();
    }

    let rows = banks.iter().map(|bank| BankRow {
        id: bank.id.short().to_string(),
        name: bank.name.clone(),
        transactions: transactions
            .iter()
            .filter(|t| t.bank_id.as_ref() == Some(&bank.id))
            .count(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Added")]
    added: &'static str,
}

/// Format preset banks, marking the ones already added
pub fn format_preset_list(presets: &[&PresetBank], banks: &[Bank]) -> String {
    if presets.is_empty() {
        return "No matching banks. Add it by name with `mtrack bank add NAME`.\n".to_string();
    }

    let rows = presets.iter().map(|preset| PresetRow {
        key: preset.key,
        name: preset.name,
        added: if banks.iter().any(|b| b.has_name(preset.name)) {
            "yes"
        } else {
            ""
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_iso_date, NewTransaction, PaymentMode, TransactionType};
    use rust_decimal_macros::dec;

    #[test]
    fn test_bank_list_counts_usage() {
        let hdfc = Bank::new("HDFC");
        let sbi = Bank::new("SBI");
        let txn = Transaction::new(NewTransaction {
            kind: TransactionType::Income,
            amount: dec!(50000),
            label: "Salary".into(),
            mode: PaymentMode::BankTransfer,
            bank_id: Some(hdfc.id.clone()),
            date: parse_iso_date("2024-03-01").unwrap(),
        });

        let output = format_bank_list(&[hdfc, sbi], &[txn]);
        let hdfc_line = output.lines().find(|l| l.contains("HDFC")).unwrap();
        assert!(hdfc_line.trim_end().ends_with('1'));
        let sbi_line = output.lines().find(|l| l.contains("SBI")).unwrap();
        assert!(sbi_line.trim_end().ends_with('0'));
    }

    #[test]
    fn test_empty_bank_list() {
        assert_eq!(format_bank_list(&[], &[]), "No banks found.\n");
    }

    #[test]
    fn test_preset_list_marks_added_banks() {
        let presets = crate::models::search_presets("bank");
        let banks = vec![Bank::new("hdfc bank")];

        let output = format_preset_list(&presets, &banks);
        let hdfc_line = output.lines().find(|l| l.contains("HDFC Bank")).unwrap();
        assert!(hdfc_line.trim_end().ends_with("yes"));
        let axis_line = output.lines().find(|l| l.contains("Axis Bank")).unwrap();
        assert!(!axis_line.contains("yes"));
    }

    #[test]
    fn test_empty_preset_list() {
        assert!(format_preset_list(&[], &[]).starts_with("No matching banks"));
    }
}
