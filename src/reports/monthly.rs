//! Monthly dashboard
//!
//! Income, expense and balance for one calendar month, plus how the month's
//! expenses split across payment modes.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Month, PaymentMode, Transaction};

/// How many of the month's newest transactions the dashboard lists
pub const RECENT_LIMIT: usize = 5;

/// Income, expense and net over a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        transactions
            .into_iter()
            .fold(Self::default(), |mut totals, txn| {
                if txn.is_income() {
                    totals.income += txn.amount;
                } else {
                    totals.expense += txn.amount;
                }
                totals
            })
    }

    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Expense total for one payment mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTotal {
    pub mode: PaymentMode,
    pub total: Decimal,
    pub count: usize,
    /// Share of the month's expenses
    pub percentage: f64,
}

/// Dashboard figures for a month
#[derive(Debug, Clone)]
pub struct MonthlySummary {
    pub month: Month,
    pub totals: Totals,
    pub transaction_count: usize,
    /// Modes without expenses are omitted
    pub expense_by_mode: Vec<ModeTotal>,
    /// Newest first
    pub recent: Vec<Transaction>,
}

impl MonthlySummary {
    pub fn generate(transactions: &[Transaction], month: Month) -> Self {
        let mut in_month: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| month.contains(t.day()))
            .collect();
        in_month.sort_by(|a, b| b.date.cmp(&a.date));

        let totals = Totals::of(in_month.iter().copied());

        let expense_by_mode = PaymentMode::all()
            .into_iter()
            .filter_map(|mode| {
                let (total, count) = in_month
                    .iter()
                    .filter(|t| t.is_expense() && t.mode == mode)
                    .fold((Decimal::ZERO, 0), |(sum, n), t| (sum + t.amount, n + 1));
                if count == 0 {
                    return None;
                }
                let percentage = if totals.expense.is_zero() {
                    0.0
                } else {
                    (total / totals.expense * Decimal::ONE_HUNDRED)
                        .to_f64()
                        .unwrap_or(0.0)
                };
                Some(ModeTotal {
                    mode,
                    total,
                    count,
                    percentage,
                })
            })
            .collect();

        Self {
            month,
            totals,
            transaction_count: in_month.len(),
            expense_by_mode,
            recent: in_month
                .iter()
                .take(RECENT_LIMIT)
                .map(|t| (*t).clone())
                .collect(),
        }
    }

    /// Format the summary for terminal display
    pub fn format_terminal(&self, currency: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Summary for {}\n", self.month));
        output.push_str(&"=".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {}{:.2}\n",
            "Total Income:", currency, self.totals.income
        ));
        output.push_str(&format!(
            "{:<16} {}{:.2}\n",
            "Total Expense:", currency, self.totals.expense
        ));
        output.push_str(&format!(
            "{:<16} {}{:.2}\n",
            "Balance:",
            currency,
            self.totals.balance()
        ));
        output.push_str(&format!(
            "{:<16} {}\n",
            "Transactions:", self.transaction_count
        ));

        if !self.expense_by_mode.is_empty() {
            output.push_str("\nExpenses by mode\n");
            output.push_str(&"-".repeat(40));
            output.push('\n');
            for row in &self.expense_by_mode {
                output.push_str(&format!(
                    "{:<16} {:>12} {:>7.0}%\n",
                    row.mode.to_string(),
                    format!("{}{:.2}", currency, row.total),
                    row.percentage
                ));
            }
        }

        output
    }
}
