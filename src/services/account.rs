//! Account service
//!
//! Asset and liability accounts with user-maintained balances. Transactions
//! may point at an account, but balances are set directly (statement
//! balances), the way net worth is tracked.

use tracing::info;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Account, AccountId, AccountType, Money};
use crate::storage::Storage;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// An account with figures computed from its transactions
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    pub transaction_count: usize,
    /// Sum of the account's transaction amounts
    pub activity: Money,
}

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub name: String,
    pub account_type: AccountType,
    pub currency: String,
    pub balance: Money,
    pub category: Option<String>,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateAccountInput) -> SpendwiseResult<Account> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(SpendwiseError::Validation(
                "Account name cannot be empty".into(),
            ));
        }

        if self.get_by_name(name)?.is_some() {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let mut account =
            Account::with_balance(name, input.account_type, input.currency, input.balance);
        account.category = input
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        account
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        info!(account = %account.name, kind = ?account.kind(), "created account");

        Ok(account)
    }

    pub fn get(&self, id: AccountId) -> SpendwiseResult<Option<Account>> {
        self.storage.accounts.get(id)
    }

    /// Get an account by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> SpendwiseResult<Option<Account>> {
        let name = name.trim();
        self.storage
            .accounts
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Find an account by name or ID
    pub fn find(&self, identifier: &str) -> SpendwiseResult<Option<Account>> {
        if let Some(account) = self.get_by_name(identifier)? {
            return Ok(Some(account));
        }
        self.storage.accounts.find(|a| a.id.matches(identifier))
    }

    /// Find an account or fail with a not-found error
    pub fn require(&self, identifier: &str) -> SpendwiseResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| SpendwiseError::account_not_found(identifier))
    }

    /// Accounts ordered assets first, then by name
    pub fn list(&self, include_archived: bool) -> SpendwiseResult<Vec<Account>> {
        self.storage
            .accounts
            .filter(|a| include_archived || !a.archived)
    }

    pub fn list_with_summaries(&self, include_archived: bool) -> SpendwiseResult<Vec<AccountSummary>> {
        self.list(include_archived)?
            .into_iter()
            .map(|account| self.get_summary(account))
            .collect()
    }

    pub fn get_summary(&self, account: Account) -> SpendwiseResult<AccountSummary> {
        let transactions = self.storage.transactions.get_by_account(account.id)?;
        Ok(AccountSummary {
            transaction_count: transactions.len(),
            activity: transactions.iter().map(|t| t.amount).sum(),
            account,
        })
    }

    /// Record a new balance (e.g. from a statement)
    pub fn set_balance(&self, id: AccountId, balance: Money) -> SpendwiseResult<Account> {
        let mut account = self.load(id)?;
        account.set_balance(balance);
        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        Ok(account)
    }

    pub fn rename(&self, id: AccountId, name: &str) -> SpendwiseResult<Account> {
        let mut account = self.load(id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SpendwiseError::Validation(
                "Account name cannot be empty".into(),
            ));
        }
        if let Some(other) = self.get_by_name(name)? {
            if other.id != id {
                return Err(SpendwiseError::Duplicate {
                    entity_type: "Account",
                    identifier: name.to_string(),
                });
            }
        }

        account.name = name.to_string();
        account.updated_at = chrono::Utc::now();
        account
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        Ok(account)
    }

    /// Archive an account (soft delete)
    pub fn archive(&self, id: AccountId) -> SpendwiseResult<Account> {
        let mut account = self.load(id)?;
        if account.archived {
            return Err(SpendwiseError::Validation(
                "Account is already archived".into(),
            ));
        }
        account.archive();
        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        Ok(account)
    }

    pub fn unarchive(&self, id: AccountId) -> SpendwiseResult<Account> {
        let mut account = self.load(id)?;
        if !account.archived {
            return Err(SpendwiseError::Validation("Account is not archived".into()));
        }
        account.unarchive();
        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        Ok(account)
    }

    fn load(&self, id: AccountId) -> SpendwiseResult<Account> {
        self.storage
            .accounts
            .get(id)?
            .ok_or_else(|| SpendwiseError::account_not_found(id.to_string()))
    }
}
