//! Bank model
//!
//! Banks are user-defined labels that bank-transfer transactions point at.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BankId;

/// Display name used when a transaction references a bank that no longer exists
pub const UNKNOWN_BANK: &str = "Unknown Bank";

/// A bank the user transacts through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Unique identifier
    pub id: BankId,

    /// Display name (trimmed)
    pub name: String,
}

impl Bank {
    /// Create a new bank; the name is trimmed
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BankId::new(),
            name: name.into().trim().to_string(),
        }
    }

    /// Validate the bank
    pub fn validate(&self) -> Result<(), BankValidationError> {
        if self.name.trim().is_empty() {
            return Err(BankValidationError::EmptyName);
        }
        if self.name.len() > 100 {
            return Err(BankValidationError::NameTooLong(self.name.len()));
        }
        Ok(())
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A well-known bank offered as a suggestion when adding one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetBank {
    /// Short lookup key, e.g. `sbi`
    pub key: &'static str,
    pub name: &'static str,
    pub initials: &'static str,
}

/// Popular Indian banks
pub const POPULAR_BANKS: &[PresetBank] = &[
    PresetBank { key: "sbi", name: "State Bank of India", initials: "SBI" },
    PresetBank { key: "hdfc", name: "HDFC Bank", initials: "HDFC" },
    PresetBank { key: "icici", name: "ICICI Bank", initials: "ICICI" },
    PresetBank { key: "axis", name: "Axis Bank", initials: "AXIS" },
    PresetBank { key: "kotak", name: "Kotak Mahindra Bank", initials: "KOTAK" },
    PresetBank { key: "pnb", name: "Punjab National Bank", initials: "PNB" },
    PresetBank { key: "bob", name: "Bank of Baroda", initials: "BOB" },
    PresetBank { key: "union", name: "Union Bank of India", initials: "UBI" },
    PresetBank { key: "canara", name: "Canara Bank", initials: "CB" },
    PresetBank { key: "idfc", name: "IDFC FIRST Bank", initials: "IDFC" },
    PresetBank { key: "indusind", name: "IndusInd Bank", initials: "IND" },
    PresetBank { key: "yes", name: "Yes Bank", initials: "YES" },
];

impl PresetBank {
    fn matches_exactly(&self, query: &str) -> bool {
        self.key.eq_ignore_ascii_case(query)
            || self.initials.eq_ignore_ascii_case(query)
            || self.name.eq_ignore_ascii_case(query)
    }
}

/// Presets whose name contains `query`, ignoring case. An empty query matches all.
pub fn search_presets(query: &str) -> Vec<&'static PresetBank> {
    let query = query.trim().to_lowercase();
    POPULAR_BANKS
        .iter()
        .filter(|preset| preset.name.to_lowercase().contains(&query))
        .collect()
}

/// Resolve a preset by key, initials, or full name, falling back to a unique
/// name substring.
pub fn find_preset(query: &str) -> Option<&'static PresetBank> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if let Some(preset) = POPULAR_BANKS.iter().find(|p| p.matches_exactly(query)) {
        return Some(preset);
    }
    match search_presets(query).as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Validation errors for banks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for BankValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Bank name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Bank name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for BankValidationError {}
