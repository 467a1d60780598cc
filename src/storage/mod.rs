//! Storage layer for Spendwise
//!
//! JSON file storage with atomic writes. Each collection lives in its own
//! file under the data directory and is loaded whole into memory.

pub mod categories;
pub mod collection;
pub mod file_io;
pub mod init;
pub mod merchants;
pub mod transactions;

pub use categories::CategoryRepository;
pub use collection::{
    AccountRepository, AlertRepository, BudgetRepository, Collection, GoalRepository, Record,
    RuleRepository,
};
pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};
pub use init::initialize_storage;
pub use merchants::MerchantRepository;
pub use transactions::TransactionRepository;

use tracing::debug;

use crate::config::paths::SpendwisePaths;
use crate::error::SpendwiseError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SpendwisePaths,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    pub budgets: BudgetRepository,
    pub goals: GoalRepository,
    pub alerts: AlertRepository,
    pub merchants: MerchantRepository,
    pub rules: RuleRepository,
}

impl Storage {
    pub fn new(paths: SpendwisePaths) -> Result<Self, SpendwiseError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            goals: GoalRepository::new(paths.goals_file()),
            alerts: AlertRepository::new(paths.alerts_file()),
            merchants: MerchantRepository::new(paths.merchants_file()),
            rules: RuleRepository::new(paths.rules_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &SpendwisePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), SpendwiseError> {
        self.accounts.load()?;
        self.transactions.load()?;
        self.categories.load()?;
        self.budgets.load()?;
        self.goals.load()?;
        self.alerts.load()?;
        self.merchants.load()?;
        self.rules.load()?;
        debug!(base = %self.paths.base_dir().display(), "storage loaded");
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), SpendwiseError> {
        self.accounts.save()?;
        self.transactions.save()?;
        self.categories.save()?;
        self.budgets.save()?;
        self.goals.save()?;
        self.alerts.save()?;
        self.merchants.save()?;
        self.rules.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_save_all_then_load_all() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();
        storage
            .accounts
            .upsert(Account::new("Checking", AccountType::Checking, "USD"))
            .unwrap();
        storage.save_all().unwrap();

        let mut reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();
        assert_eq!(reopened.accounts.count().unwrap(), 1);
        assert_eq!(reopened.transactions.count().unwrap(), 0);
    }
}
