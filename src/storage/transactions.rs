//! Transaction repository for JSON storage
//!
//! Keeps transactions in memory with two secondary indexes: by account and by
//! import fingerprint, the latter answering "was this row imported before?"
//! without a scan.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::SpendwiseError;
use crate::models::{AccountId, Transaction, TransactionId};

use super::collection::lock_error;
use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

#[derive(Default)]
struct Indexed {
    by_id: HashMap<TransactionId, Transaction>,
    by_account: HashMap<AccountId, Vec<TransactionId>>,
    by_import_id: HashMap<String, TransactionId>,
}

impl Indexed {
    fn insert(&mut self, txn: Transaction) {
        self.remove(txn.id);
        if let Some(account_id) = txn.account_id {
            self.by_account.entry(account_id).or_default().push(txn.id);
        }
        if let Some(import_id) = &txn.import_id {
            self.by_import_id.insert(import_id.clone(), txn.id);
        }
        self.by_id.insert(txn.id, txn);
    }

    fn remove(&mut self, id: TransactionId) -> Option<Transaction> {
        let old = self.by_id.remove(&id)?;
        if let Some(account_id) = old.account_id {
            if let Some(ids) = self.by_account.get_mut(&account_id) {
                ids.retain(|&tid| tid != id);
            }
        }
        if let Some(import_id) = &old.import_id {
            if self.by_import_id.get(import_id) == Some(&id) {
                self.by_import_id.remove(import_id);
            }
        }
        Some(old)
    }
}

/// Newest first; ties broken by creation time then id so listings are stable
fn newest_first(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.date
        .cmp(&a.date)
        .then(b.created_at.cmp(&a.created_at))
        .then(a.id.cmp(&b.id))
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<Indexed>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Indexed::default()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> Result<(), SpendwiseError> {
        let file_data: TransactionData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;

        *data = Indexed::default();
        for txn in file_data.transactions {
            data.insert(txn);
        }
        debug!(count = data.by_id.len(), "loaded transactions");
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendwiseError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.by_id.get(&id).cloned())
    }

    /// All transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut transactions: Vec<_> = data.by_id.values().cloned().collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    /// All transactions, oldest first
    pub fn get_chronological(&self) -> Result<Vec<Transaction>, SpendwiseError> {
        let mut transactions = self.get_all()?;
        transactions.reverse();
        Ok(transactions)
    }

    pub fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        let ids = data
            .by_account
            .get(&account_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut transactions: Vec<_> = ids
            .iter()
            .filter_map(|id| data.by_id.get(id).cloned())
            .collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    /// Transactions dated within `start..=end`, newest first
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, SpendwiseError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect())
    }

    /// Transactions without a real category
    pub fn get_uncategorized(&self) -> Result<Vec<Transaction>, SpendwiseError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| !t.is_categorized())
            .collect())
    }

    pub fn find_by_import_id(&self, import_id: &str) -> Result<Option<Transaction>, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .by_import_id
            .get(import_id)
            .and_then(|id| data.by_id.get(id))
            .cloned())
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), SpendwiseError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(txn);
        Ok(())
    }

    pub fn delete(&self, id: TransactionId) -> Result<bool, SpendwiseError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(id).is_some())
    }

    pub fn count(&self) -> Result<usize, SpendwiseError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn txn(day: u32, cents: i64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            "Coffee",
            Money::from_cents(cents),
            "USD",
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_get_by_account() {
        let (_temp_dir, repo) = create_test_repo();
        let account1 = AccountId::new();
        let account2 = AccountId::new();

        repo.upsert(txn(15, -100).with_account(account1)).unwrap();
        repo.upsert(txn(15, -200).with_account(account1)).unwrap();
        repo.upsert(txn(15, -300).with_account(account2)).unwrap();
        repo.upsert(txn(15, -400)).unwrap();

        assert_eq!(repo.get_by_account(account1).unwrap().len(), 2);
        assert_eq!(repo.get_by_account(account2).unwrap().len(), 1);
    }

    #[test]
    fn test_reassigning_account_updates_index() {
        let (_temp_dir, repo) = create_test_repo();
        let account1 = AccountId::new();
        let account2 = AccountId::new();

        let mut t = txn(1, -100).with_account(account1);
        repo.upsert(t.clone()).unwrap();
        t.account_id = Some(account2);
        repo.upsert(t).unwrap();

        assert!(repo.get_by_account(account1).unwrap().is_empty());
        assert_eq!(repo.get_by_account(account2).unwrap().len(), 1);
    }

    #[test]
    fn test_import_id_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        let mut t = txn(3, -999);
        t.import_id = Some(t.generate_import_id());
        let import_id = t.import_id.clone().unwrap();
        repo.upsert(t.clone()).unwrap();

        assert_eq!(repo.find_by_import_id(&import_id).unwrap().unwrap().id, t.id);
        repo.delete(t.id).unwrap();
        assert!(repo.find_by_import_id(&import_id).unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let t = txn(15, -5000);
        let id = t.id;
        repo.upsert(t).unwrap();
        repo.save().unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.get(id).unwrap().unwrap().amount.cents(), -5000);
    }

    #[test]
    fn test_ordering_and_date_range() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(txn(10, -100)).unwrap();
        repo.upsert(txn(20, -300)).unwrap();
        repo.upsert(txn(15, -200)).unwrap();

        let newest: Vec<_> = repo.get_all().unwrap().iter().map(|t| t.amount.cents()).collect();
        assert_eq!(newest, vec![-300, -200, -100]);

        let oldest: Vec<_> = repo
            .get_chronological()
            .unwrap()
            .iter()
            .map(|t| t.amount.cents())
            .collect();
        assert_eq!(oldest, vec![-100, -200, -300]);

        let range = repo
            .get_by_date_range(
                NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            )
            .unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].amount.cents(), -200);
    }
}
