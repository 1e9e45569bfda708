//! Transaction search
//!
//! Every criterion that is set must match; unset criteria match everything.
//! Results come back newest first.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{BankId, PaymentMode, Transaction, TransactionType};

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Case-insensitive substring of the label
    pub text: Option<String>,
    pub kind: Option<TransactionType>,
    pub mode: Option<PaymentMode>,
    pub bank_id: Option<BankId>,
    /// Inclusive, by calendar day
    pub from: Option<NaiveDate>,
    /// Inclusive, by calendar day
    pub to: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn mode(mut self, mode: PaymentMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn bank(mut self, bank_id: BankId) -> Self {
        self.bank_id = Some(bank_id);
        self
    }

    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.kind.is_none()
            && self.mode.is_none()
            && self.bank_id.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let day = txn.day();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        if self.min_amount.is_some_and(|min| txn.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| txn.amount > max) {
            return false;
        }
        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            if !txn.label.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if self.kind.is_some_and(|kind| txn.kind != kind) {
            return false;
        }
        if self.mode.is_some_and(|mode| txn.mode != mode) {
            return false;
        }
        if let Some(bank_id) = &self.bank_id {
            if txn.bank_id.as_ref() != Some(bank_id) {
                return false;
            }
        }
        true
    }

    /// Matching transactions, newest first
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut results: Vec<Transaction> = transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.date.cmp(&a.date));
        results
    }
}
