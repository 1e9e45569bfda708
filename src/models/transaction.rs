//! Transaction model
//!
//! Represents an income or expense entry, tagged with the payment mode used
//! and, for bank transfers, the bank it went through.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BankId, TransactionId};

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Parse transaction type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Some(Self::Income),
            "expense" | "out" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// How a transaction was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "Cash")]
    Cash,
    #[serde(rename = "Card")]
    Card,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMode {
    /// All modes, in display order
    pub fn all() -> [Self; 4] {
        [Self::Cash, Self::Card, Self::Upi, Self::BankTransfer]
    }

    /// Parse payment mode from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "upi" => Some(Self::Upi),
            "banktransfer" | "bank" | "transfer" => Some(Self::BankTransfer),
            _ => None,
        }
    }

    /// Whether transactions in this mode carry a bank reference
    pub fn requires_bank(&self) -> bool {
        matches!(self, Self::BankTransfer)
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::Card => write!(f, "Card"),
            Self::Upi => write!(f, "UPI"),
            Self::BankTransfer => write!(f, "Bank Transfer"),
        }
    }
}

/// Transaction fields supplied by the user, before an ID is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub label: String,
    pub mode: PaymentMode,
    pub bank_id: Option<BankId>,
    pub date: DateTime<Utc>,
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Always positive; direction comes from `kind`
    pub amount: Decimal,

    /// Free-text description
    pub label: String,

    /// Payment mode
    pub mode: PaymentMode,

    /// Only set for bank transfers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<BankId>,

    /// When the transaction happened
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction with a freshly generated ID
    pub fn new(input: NewTransaction) -> Self {
        Self::with_id(TransactionId::new(), input)
    }

    /// Create a transaction with a known ID (used for edits)
    pub fn with_id(id: TransactionId, input: NewTransaction) -> Self {
        Self {
            id,
            kind: input.kind,
            amount: input.amount,
            label: input.label,
            mode: input.mode,
            bank_id: input.bank_id,
            date: input.date,
        }
    }

    /// Check if this is income
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// Check if this is an expense
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with sign applied (negative for expenses)
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Calendar date of the transaction (UTC)
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Validate the transaction, independent of which banks exist
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(TransactionValidationError::NonPositiveAmount);
        }
        if self.label.trim().is_empty() {
            return Err(TransactionValidationError::EmptyLabel);
        }
        match (self.mode.requires_bank(), &self.bank_id) {
            (true, None) => Err(TransactionValidationError::MissingBank),
            (false, Some(_)) => Err(TransactionValidationError::UnexpectedBank(self.mode)),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.2} {} ({})",
            self.day(),
            self.kind,
            self.amount,
            self.label,
            self.mode
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount,
    EmptyLabel,
    MissingBank,
    UnexpectedBank(PaymentMode),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::EmptyLabel => write!(f, "Label cannot be empty"),
            Self::MissingBank => write!(f, "Bank transfers must reference a bank"),
            Self::UnexpectedBank(mode) => {
                write!(f, "{} transactions cannot reference a bank", mode)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

/// Parse an ISO 8601 date or timestamp.
///
/// Accepts full RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Serde adapter for transaction dates
mod iso_date {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_iso_date(&s).ok_or_else(|| de::Error::custom(format!("invalid ISO 8601 date: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn groceries() -> NewTransaction {
        NewTransaction {
            kind: TransactionType::Expense,
            amount: dec!(250.00),
            label: "Groceries".into(),
            mode: PaymentMode::Cash,
            bank_id: None,
            date: parse_iso_date("2024-03-15").unwrap(),
        }
    }

    #[test]
    fn test_transaction_creation() {
        let txn = Transaction::new(groceries());
        assert!(txn.is_expense());
        assert_eq!(txn.signed_amount(), dec!(-250.00));
        assert_eq!(txn.day(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut txn = Transaction::new(groceries());
        txn.amount = Decimal::ZERO;
        assert_eq!(txn.validate(), Err(TransactionValidationError::NonPositiveAmount));

        let mut txn = Transaction::new(groceries());
        txn.label = "   ".into();
        assert_eq!(txn.validate(), Err(TransactionValidationError::EmptyLabel));

        let mut txn = Transaction::new(groceries());
        txn.mode = PaymentMode::BankTransfer;
        assert_eq!(txn.validate(), Err(TransactionValidationError::MissingBank));

        txn.mode = PaymentMode::Upi;
        txn.bank_id = Some(BankId::new());
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::UnexpectedBank(PaymentMode::Upi))
        );
    }

    #[test]
    fn test_wire_format() {
        let mut txn = Transaction::new(groceries());
        txn.mode = PaymentMode::BankTransfer;
        txn.bank_id = Some("hdfc".parse().unwrap());

        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["mode"], "Bank Transfer");
        assert_eq!(json["bankId"], "hdfc");
        assert_eq!(json["date"], "2024-03-15T00:00:00.000Z");
        assert_eq!(json["amount"].as_f64(), Some(250.0));
    }

    #[test]
    fn test_reads_browser_format() {
        let json = r#"{
            "id": "1700000000000-abc123xyz",
            "type": "INCOME",
            "amount": 1200.5,
            "label": "Salary",
            "mode": "UPI",
            "date": "2024-01-31T18:30:00.000Z"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert!(txn.is_income());
        assert_eq!(txn.amount, dec!(1200.5));
        assert_eq!(txn.mode, PaymentMode::Upi);
        assert!(txn.bank_id.is_none());
    }

    #[test]
    fn test_reads_plain_date() {
        let json = r#"{"id":"a","type":"EXPENSE","amount":10,"label":"Tea","mode":"Cash","date":"2024-02-29"}"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(PaymentMode::parse("bank transfer"), Some(PaymentMode::BankTransfer));
        assert_eq!(PaymentMode::parse("bank-transfer"), Some(PaymentMode::BankTransfer));
        assert_eq!(PaymentMode::parse("UPI"), Some(PaymentMode::Upi));
        assert_eq!(PaymentMode::parse("cheque"), None);
    }
}
