//! Application state store
//!
//! In-memory source of truth for transactions and banks. Every mutation
//! builds the complete new list, writes it through the [`LocalStore`], and
//! only then replaces the in-memory copy, so memory never holds data that
//! failed to persist. Successful mutations notify the change listener.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::SubsecRound;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{
    Bank, BankId, NewTransaction, Snapshot, Transaction, TransactionId, UNKNOWN_BANK,
};
use crate::storage::LocalStore;

/// Receives a callback after every committed mutation
pub trait ChangeListener: Send + Sync {
    fn on_change(&self);
}

#[derive(Debug, Default)]
struct State {
    transactions: Vec<Transaction>,
    banks: Vec<Bank>,
    last_sync: Option<i64>,
}

impl State {
    fn load(local: &LocalStore) -> Self {
        Self {
            transactions: local.get_transactions(),
            banks: local.get_banks(),
            last_sync: local.get_last_sync(),
        }
    }
}

/// Owner of the in-memory dataset
pub struct AppStore {
    local: LocalStore,
    state: RwLock<State>,
    listener: Option<Arc<dyn ChangeListener>>,
}

impl AppStore {
    /// Create a store loaded from `local`
    pub fn new(local: LocalStore) -> Self {
        let state = State::load(&local);
        log::debug!(
            "Loaded {} transactions and {} banks",
            state.transactions.len(),
            state.banks.len()
        );
        Self {
            local,
            state: RwLock::new(state),
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Re-read everything from local storage
    pub fn reload(&self) -> TrackerResult<()> {
        let mut state = self.write_state()?;
        *state = State::load(&self.local);
        Ok(())
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state
            .read()
            .map(|state| state.transactions.clone())
            .unwrap_or_default()
    }

    pub fn banks(&self) -> Vec<Bank> {
        self.state
            .read()
            .map(|state| state.banks.clone())
            .unwrap_or_default()
    }

    /// Last sync time as of the most recent load
    pub fn last_sync(&self) -> Option<i64> {
        self.state.read().ok().and_then(|state| state.last_sync)
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<Transaction> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.transactions.iter().find(|t| &t.id == id).cloned())
    }

    /// Bank display name; dangling references read as "Unknown Bank"
    pub fn bank_name(&self, id: &BankId) -> String {
        self.state
            .read()
            .ok()
            .and_then(|state| {
                state
                    .banks
                    .iter()
                    .find(|b| &b.id == id)
                    .map(|b| b.name.clone())
            })
            .unwrap_or_else(|| UNKNOWN_BANK.to_string())
    }

    /// Resolve a full ID or a unique ID prefix
    pub fn resolve_transaction_id(&self, input: &str) -> TrackerResult<TransactionId> {
        let input = input.trim();
        let state = self.read_state()?;
        let found = resolve_unique(state.transactions.iter().map(|t| &t.id), input, |id| {
            id.as_str()
        })
        .cloned();
        found.ok_or_else(|| TrackerError::transaction_not_found(input))
    }

    /// Resolve a bank by full ID, unique ID prefix, or name (case-insensitive)
    pub fn resolve_bank_id(&self, input: &str) -> TrackerResult<BankId> {
        let input = input.trim();
        let state = self.read_state()?;
        if let Some(bank) = state.banks.iter().find(|b| b.has_name(input)) {
            return Ok(bank.id.clone());
        }
        let found =
            resolve_unique(state.banks.iter().map(|b| &b.id), input, |id| id.as_str()).cloned();
        found.ok_or_else(|| TrackerError::bank_not_found(input))
    }

    /// Point-in-time copy of both lists
    pub fn snapshot_for_export(&self) -> Snapshot {
        self.state
            .read()
            .map(|state| {
                Snapshot::new(
                    state.transactions.clone(),
                    state.banks.clone(),
                    state.last_sync,
                )
            })
            .unwrap_or_default()
    }

    pub fn add_transaction(&self, input: NewTransaction) -> TrackerResult<Transaction> {
        let mut added = self.add_transactions(vec![input])?;
        added
            .pop()
            .ok_or_else(|| TrackerError::Validation("Nothing to add".into()))
    }

    /// Add several transactions with a single write. An empty batch does nothing.
    pub fn add_transactions(&self, inputs: Vec<NewTransaction>) -> TrackerResult<Vec<Transaction>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let added = {
            let mut state = self.write_state()?;
            let added = inputs
                .into_iter()
                .map(|input| build_transaction(None, input, &state.banks))
                .collect::<TrackerResult<Vec<_>>>()?;

            let mut next = state.transactions.clone();
            next.extend(added.iter().cloned());
            self.local.save_transactions(&next)?;
            state.transactions = next;
            added
        };

        log::info!("Added {} transaction(s)", added.len());
        self.notify();
        Ok(added)
    }

    /// Replace the fields of an existing transaction, keeping its ID
    pub fn update_transaction(
        &self,
        id: &TransactionId,
        input: NewTransaction,
    ) -> TrackerResult<Transaction> {
        let updated = {
            let mut state = self.write_state()?;
            let index = state
                .transactions
                .iter()
                .position(|t| &t.id == id)
                .ok_or_else(|| TrackerError::transaction_not_found(id.as_str()))?;
            let updated = build_transaction(Some(id.clone()), input, &state.banks)?;

            let mut next = state.transactions.clone();
            next[index] = updated.clone();
            self.local.save_transactions(&next)?;
            state.transactions = next;
            updated
        };

        log::info!("Updated transaction {}", updated.id);
        self.notify();
        Ok(updated)
    }

    pub fn delete_transaction(&self, id: &TransactionId) -> TrackerResult<Transaction> {
        let removed = {
            let mut state = self.write_state()?;
            let index = state
                .transactions
                .iter()
                .position(|t| &t.id == id)
                .ok_or_else(|| TrackerError::transaction_not_found(id.as_str()))?;

            let mut next = state.transactions.clone();
            let removed = next.remove(index);
            self.local.save_transactions(&next)?;
            state.transactions = next;
            removed
        };

        log::info!("Deleted transaction {}", removed.id);
        self.notify();
        Ok(removed)
    }

    pub fn add_bank(&self, name: &str) -> TrackerResult<Bank> {
        let bank = {
            let mut state = self.write_state()?;
            let bank = Bank::new(name);
            bank.validate()
                .map_err(|e| TrackerError::Validation(e.to_string()))?;
            if state.banks.iter().any(|b| b.has_name(&bank.name)) {
                return Err(TrackerError::Duplicate {
                    entity_type: "Bank",
                    identifier: bank.name,
                });
            }

            let mut next = state.banks.clone();
            next.push(bank.clone());
            self.local.save_banks(&next)?;
            state.banks = next;
            bank
        };

        log::info!("Added bank {}", bank.name);
        self.notify();
        Ok(bank)
    }

    /// Remove a bank. Transactions that reference it are left untouched.
    pub fn delete_bank(&self, id: &BankId) -> TrackerResult<Bank> {
        let removed = {
            let mut state = self.write_state()?;
            let index = state
                .banks
                .iter()
                .position(|b| &b.id == id)
                .ok_or_else(|| TrackerError::bank_not_found(id.as_str()))?;

            let mut next = state.banks.clone();
            let removed = next.remove(index);
            self.local.save_banks(&next)?;
            state.banks = next;
            removed
        };

        log::info!("Deleted bank {}", removed.name);
        self.notify();
        Ok(removed)
    }

    /// Erase all local data. Does not notify, so nothing is pushed.
    pub fn clear_all(&self) -> TrackerResult<()> {
        let mut state = self.write_state()?;
        self.local.clear_all()?;
        *state = State::default();
        log::info!("Cleared all local data");
        Ok(())
    }

    fn read_state(&self) -> TrackerResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_state(&self) -> TrackerResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener.on_change();
        }
    }
}

/// Normalize and validate user input into a transaction
fn build_transaction(
    id: Option<TransactionId>,
    mut input: NewTransaction,
    banks: &[Bank],
) -> TrackerResult<Transaction> {
    input.label = input.label.trim().to_string();
    input.date = input.date.trunc_subsecs(3);

    if !input.mode.requires_bank() {
        input.bank_id = None;
    } else if let Some(bank_id) = &input.bank_id {
        if !banks.iter().any(|b| &b.id == bank_id) {
            return Err(TrackerError::Validation(format!(
                "Bank does not exist: {}",
                bank_id
            )));
        }
    }

    let txn = match id {
        Some(id) => Transaction::with_id(id, input),
        None => Transaction::new(input),
    };
    txn.validate()
        .map_err(|e| TrackerError::Validation(e.to_string()))?;
    Ok(txn)
}

/// Exact match first, then a prefix that matches exactly one candidate
fn resolve_unique<'a, T, I, F>(candidates: I, input: &str, key: F) -> Option<&'a T>
where
    I: Iterator<Item = &'a T> + Clone,
    F: Fn(&T) -> &str,
{
    if input.is_empty() {
        return None;
    }
    if let Some(exact) = candidates.clone().find(|c| key(*c) == input) {
        return Some(exact);
    }
    let mut matches = candidates.filter(|c| key(*c).starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_iso_date, PaymentMode, TransactionType};
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener {
        calls: AtomicUsize,
    }

    impl ChangeListener for CountingListener {
        fn on_change(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn store_with_listener() -> (AppStore, Arc<CountingListener>, LocalStore) {
        let local = LocalStore::in_memory();
        let listener = Arc::new(CountingListener::default());
        let store = AppStore::new(local.clone()).with_listener(listener.clone());
        (store, listener, local)
    }

    fn groceries() -> NewTransaction {
        NewTransaction {
            kind: TransactionType::Expense,
            amount: dec!(250),
            label: "Groceries".into(),
            mode: PaymentMode::Cash,
            bank_id: None,
            date: parse_iso_date("2024-03-15").unwrap(),
        }
    }

    #[test]
    fn test_add_transaction_persists_and_notifies() {
        let (store, listener, local) = store_with_listener();

        let txn = store.add_transaction(groceries()).unwrap();

        assert!(uuid::Uuid::parse_str(txn.id.as_str()).is_ok());
        assert_eq!(store.transactions(), vec![txn.clone()]);
        assert_eq!(local.get_transactions(), vec![txn]);
        assert_eq!(listener.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let (store, listener, local) = store_with_listener();

        let mut zero = groceries();
        zero.amount = dec!(0);
        let mut blank = groceries();
        blank.label = "   ".into();
        let mut no_bank = groceries();
        no_bank.mode = PaymentMode::BankTransfer;
        let mut unknown_bank = no_bank.clone();
        unknown_bank.bank_id = Some(BankId::new());

        for input in [zero, blank, no_bank, unknown_bank] {
            let err = store.add_transaction(input).unwrap_err();
            assert!(err.is_validation(), "unexpected error: {}", err);
        }

        assert!(store.transactions().is_empty());
        assert!(local.get_transactions().is_empty());
        assert_eq!(listener.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_input_is_normalized() {
        let (store, _, _) = store_with_listener();
        let bank = store.add_bank("  HDFC ").unwrap();
        assert_eq!(bank.name, "HDFC");

        let mut input = groceries();
        input.label = "  Groceries  ".into();
        input.bank_id = Some(bank.id.clone());
        input.date = Utc.timestamp_nanos(1_710_460_800_123_456_789);

        let txn = store.add_transaction(input).unwrap();
        assert_eq!(txn.label, "Groceries");
        assert_eq!(txn.bank_id, None);
        assert_eq!(txn.date.timestamp_subsec_nanos(), 123_000_000);

        let mut transfer = groceries();
        transfer.mode = PaymentMode::BankTransfer;
        transfer.bank_id = Some(bank.id.clone());
        let txn = store.add_transaction(transfer).unwrap();
        assert_eq!(txn.bank_id, Some(bank.id));
    }

    #[test]
    fn test_batch_add_is_one_write() {
        let (store, listener, _) = store_with_listener();

        assert!(store.add_transactions(Vec::new()).unwrap().is_empty());
        assert_eq!(listener.calls.load(Ordering::SeqCst), 0);

        let mut salary = groceries();
        salary.kind = TransactionType::Income;
        salary.label = "Salary".into();
        let added = store.add_transactions(vec![groceries(), salary]).unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(store.transactions(), added);
        assert_eq!(listener.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batch_with_one_invalid_entry_adds_nothing() {
        let (store, _, _) = store_with_listener();
        let mut bad = groceries();
        bad.amount = dec!(-5);

        assert!(store.add_transactions(vec![groceries(), bad]).is_err());
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_update_and_delete_transaction() {
        let (store, listener, local) = store_with_listener();
        let txn = store.add_transaction(groceries()).unwrap();

        let mut edit = groceries();
        edit.amount = dec!(300);
        let updated = store.update_transaction(&txn.id, edit).unwrap();
        assert_eq!(updated.id, txn.id);
        assert_eq!(store.transaction(&txn.id).unwrap().amount, dec!(300));

        let removed = store.delete_transaction(&txn.id).unwrap();
        assert_eq!(removed.id, txn.id);
        assert!(store.transactions().is_empty());
        assert!(local.get_transactions().is_empty());
        assert_eq!(listener.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let (store, listener, _) = store_with_listener();
        let missing = TransactionId::new();

        assert!(store.update_transaction(&missing, groceries()).unwrap_err().is_not_found());
        assert!(store.delete_transaction(&missing).unwrap_err().is_not_found());
        assert!(store.delete_bank(&BankId::new()).unwrap_err().is_not_found());
        assert_eq!(listener.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicate_bank_name() {
        let (store, _, _) = store_with_listener();
        store.add_bank("SBI").unwrap();

        let err = store.add_bank(" sbi ").unwrap_err();
        assert!(matches!(err, TrackerError::Duplicate { .. }));
        assert!(store.add_bank("").unwrap_err().is_validation());
        assert_eq!(store.banks().len(), 1);
    }

    #[test]
    fn test_deleted_bank_leaves_dangling_reference() {
        let (store, _, _) = store_with_listener();
        let bank = store.add_bank("ICICI").unwrap();
        let mut transfer = groceries();
        transfer.mode = PaymentMode::BankTransfer;
        transfer.bank_id = Some(bank.id.clone());
        let txn = store.add_transaction(transfer).unwrap();

        assert_eq!(store.bank_name(&bank.id), "ICICI");
        store.delete_bank(&bank.id).unwrap();

        let kept = store.transaction(&txn.id).unwrap();
        assert_eq!(kept.bank_id, Some(bank.id.clone()));
        assert_eq!(store.bank_name(&bank.id), UNKNOWN_BANK);
    }

    #[test]
    fn test_rejected_write_leaves_memory_unchanged() {
        let local = LocalStore::new(Arc::new(MemoryStore::with_quota(600)));
        let store = AppStore::new(local.clone());
        let first = store.add_transaction(groceries()).unwrap();

        let mut big = groceries();
        big.label = "x".repeat(1000);
        let err = store.add_transaction(big).unwrap_err();

        assert!(matches!(err, TrackerError::Storage(_)));
        assert_eq!(store.transactions(), vec![first.clone()]);
        assert_eq!(local.get_transactions(), vec![first]);
    }

    #[test]
    fn test_reload_and_snapshot() {
        let (store, _, local) = store_with_listener();
        store.add_transaction(groceries()).unwrap();

        let incoming = Snapshot::new(Vec::new(), vec![Bank::new("Axis")], None);
        let stamped = local.import_data(&incoming).unwrap();
        assert_eq!(store.banks().len(), 0);

        store.reload().unwrap();
        let snapshot = store.snapshot_for_export();
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.banks[0].name, "Axis");
        assert_eq!(snapshot.last_sync, Some(stamped));
    }

    #[test]
    fn test_resolve_ids() {
        let (store, _, _) = store_with_listener();
        let txn = store.add_transaction(groceries()).unwrap();
        let bank = store.add_bank("Kotak").unwrap();

        assert_eq!(store.resolve_transaction_id(txn.id.short()).unwrap(), txn.id);
        assert_eq!(store.resolve_transaction_id(txn.id.as_str()).unwrap(), txn.id);
        assert!(store.resolve_transaction_id("").is_err());
        assert_eq!(store.resolve_bank_id("kotak").unwrap(), bank.id);
        assert_eq!(store.resolve_bank_id(bank.id.short()).unwrap(), bank.id);
        assert!(store.resolve_bank_id("Nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_clear_all() {
        let (store, listener, local) = store_with_listener();
        store.add_transaction(groceries()).unwrap();
        store.add_bank("SBI").unwrap();

        store.clear_all().unwrap();
        assert!(store.transactions().is_empty());
        assert!(store.banks().is_empty());
        assert_eq!(local.export_data(), Snapshot::default());
        assert_eq!(listener.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_mutations_are_serialized() {
        let (store, listener, local) = store_with_listener();

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..10 {
                        let mut input = groceries();
                        input.label = format!("w{}-{}", worker, i);
                        store.add_transaction(input).unwrap();
                    }
                });
            }
        });

        assert_eq!(store.transactions().len(), 80);
        assert_eq!(local.get_transactions().len(), 80);
        assert_eq!(listener.calls.load(Ordering::SeqCst), 80);
    }
}
