//! Transaction service
//!
//! CRUD for transactions. New transactions get their merchant pattern and,
//! unless a category is given, a categorization attempt.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::categorize::{extract_merchant_pattern, Categorizer};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{
    category_names_match, AccountId, Categorization, Money, Transaction, TransactionId,
};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    /// Category label (normalized, case-insensitive)
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Only transactions without a real category
    pub uncategorized: bool,
    /// Substring of the description (case-insensitive)
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn uncategorized(mut self) -> Self {
        self.uncategorized = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        if let Some(start) = self.start_date {
            if txn.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if txn.date > end {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !category_names_match(txn.category_label(), category) {
                return false;
            }
        }
        if self.uncategorized && txn.is_categorized() {
            return false;
        }
        if let Some(needle) = &self.search {
            if !txn
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub account_id: Option<AccountId>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub currency: String,
    /// Category label set by hand; categorized automatically when absent
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a transaction
    ///
    /// `categorizer` is consulted when no category is given.
    pub fn create(
        &self,
        input: CreateTransactionInput,
        categorizer: Option<&Categorizer>,
    ) -> SpendwiseResult<Transaction> {
        if let Some(account_id) = input.account_id {
            let account = self
                .storage
                .accounts
                .get(account_id)?
                .ok_or_else(|| SpendwiseError::account_not_found(account_id.to_string()))?;
            if account.archived {
                return Err(SpendwiseError::Validation(
                    "Cannot add transactions to an archived account".into(),
                ));
            }
        }

        if input.description.trim().is_empty() {
            return Err(SpendwiseError::Validation(
                "Transaction description cannot be empty".into(),
            ));
        }

        let mut txn = Transaction::new(input.date, input.description, input.amount, input.currency);
        txn.account_id = input.account_id;
        txn.merchant = extract_merchant_pattern(&txn.description);
        if let Some(notes) = input.notes {
            txn.notes = notes;
        }

        match input.category {
            Some(label) => {
                let category = self
                    .storage
                    .categories
                    .get_category_by_name(&label)?
                    .ok_or_else(|| SpendwiseError::category_not_found(label.clone()))?;
                txn.set_category(category.name, Categorization::manual());
            }
            None => {
                if let Some(categorizer) = categorizer {
                    let history = self.storage.merchants.get_all()?;
                    let result = categorizer.categorize(&txn.description, &history);
                    if result.is_categorized() {
                        txn.set_category(result.category.clone(), result.categorization());
                    }
                }
            }
        }

        txn.import_id = Some(txn.generate_import_id());
        txn.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        debug!(id = %txn.id, category = txn.category_label(), "created transaction");

        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> SpendwiseResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full or short ID
    pub fn find(&self, identifier: &str) -> SpendwiseResult<Option<Transaction>> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            if let Some(txn) = self.storage.transactions.get(id)? {
                return Ok(Some(txn));
            }
        }

        let mut matches = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter(|t| t.id.matches(identifier));
        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(Some(txn)),
            (Some(_), Some(_)) => Err(SpendwiseError::Validation(format!(
                "'{}' matches more than one transaction; use more characters",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    /// Find a transaction or fail with a not-found error
    pub fn require(&self, identifier: &str) -> SpendwiseResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(identifier))
    }

    /// Transactions matching a filter, newest first
    pub fn list(&self, filter: &TransactionFilter) -> SpendwiseResult<Vec<Transaction>> {
        let mut transactions = match filter.account_id {
            Some(account_id) => self.storage.transactions.get_by_account(account_id)?,
            None => self.storage.transactions.get_all()?,
        };
        transactions.retain(|t| filter.matches(t));

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    /// Update the editable fields of a transaction
    pub fn update(
        &self,
        id: TransactionId,
        date: Option<NaiveDate>,
        description: Option<String>,
        amount: Option<Money>,
        notes: Option<String>,
    ) -> SpendwiseResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;

        if let Some(date) = date {
            txn.date = date;
        }
        if let Some(description) = description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(SpendwiseError::Validation(
                    "Transaction description cannot be empty".into(),
                ));
            }
            txn.merchant = extract_merchant_pattern(&description);
            txn.description = description;
        }
        if let Some(amount) = amount {
            txn.amount = amount;
        }
        if let Some(notes) = notes {
            txn.notes = notes;
        }
        txn.updated_at = Utc::now();

        txn.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        Ok(txn)
    }

    /// Remove the category from a transaction
    pub fn clear_category(&self, id: TransactionId) -> SpendwiseResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;
        txn.clear_category();
        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        Ok(txn)
    }

    pub fn delete(&self, id: TransactionId) -> SpendwiseResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;
        Ok(txn)
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.storage.transactions.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use crate::models::{Account, AccountType, CategorizationSource};
    use crate::storage::initialize_storage;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn input(day: u32, description: &str, cents: i64) -> CreateTransactionInput {
        CreateTransactionInput {
            account_id: None,
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            description: description.into(),
            amount: Money::from_cents(cents),
            currency: "USD".into(),
            category: None,
            notes: None,
        }
    }

    #[test]
    fn test_create_autocategorizes() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);

        let txn = service
            .create(input(15, "SHELL OIL 57444", -4000), Some(&Categorizer::builtin()))
            .unwrap();
        assert_eq!(txn.category.as_deref(), Some("Fuel"));
        assert_eq!(txn.merchant, "SHELL OIL");
        assert_eq!(txn.categorization.unwrap().source, CategorizationSource::Rule);
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_create_with_manual_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);

        let mut with_category = input(15, "SHELL OIL", -4000);
        with_category.category = Some("travel".into());
        let txn = service.create(with_category, Some(&Categorizer::builtin())).unwrap();
        assert_eq!(txn.category.as_deref(), Some("Travel"));
        assert_eq!(txn.categorization.unwrap().source, CategorizationSource::Manual);

        let mut unknown = input(15, "SHELL OIL", -4000);
        unknown.category = Some("Nope".into());
        assert!(service.create(unknown, None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);

        assert!(service.create(input(1, "  ", -100), None).unwrap_err().is_validation());

        let mut bad_currency = input(1, "x", -100);
        bad_currency.currency = "DOLLAR".into();
        assert!(service.create(bad_currency, None).unwrap_err().is_validation());

        let mut archived = Account::new("Old", AccountType::Checking, "USD");
        archived.archive();
        let account_id = archived.id;
        storage.accounts.upsert(archived).unwrap();
        let mut on_archived = input(1, "x", -100);
        on_archived.account_id = Some(account_id);
        assert!(service.create(on_archived, None).unwrap_err().is_validation());
    }

    #[test]
    fn test_list_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let categorizer = Categorizer::builtin();
        service.create(input(1, "NETFLIX.COM", -1599), Some(&categorizer)).unwrap();
        service.create(input(5, "WHOLE FOODS", -8000), Some(&categorizer)).unwrap();
        service.create(input(9, "ZQXJ HOLDINGS", -100), Some(&categorizer)).unwrap();

        let all = service.list(&TransactionFilter::new()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].description, "ZQXJ HOLDINGS");

        let groceries = service.list(&TransactionFilter::new().category("groceries")).unwrap();
        assert_eq!(groceries.len(), 1);

        let uncategorized = service.list(&TransactionFilter::new().uncategorized()).unwrap();
        assert_eq!(uncategorized.len(), 1);

        let start = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let ranged = service.list(&TransactionFilter::new().date_range(start, end)).unwrap();
        assert_eq!(ranged.len(), 1);

        let limited = service.list(&TransactionFilter::new().limit(2)).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_find_update_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let txn = service.create(input(1, "Coffee", -450), None).unwrap();

        let found = service.require(&txn.id.to_string()).unwrap();
        assert_eq!(found.id, txn.id);

        let updated = service
            .update(txn.id, None, Some("SQ BLUE BOTTLE".into()), Some(Money::from_cents(-500)), None)
            .unwrap();
        assert_eq!(updated.merchant, "BLUE BOTTLE");
        assert_eq!(updated.amount.cents(), -500);

        service.delete(txn.id).unwrap();
        assert!(service.get(txn.id).unwrap().is_none());
        assert!(service.delete(txn.id).unwrap_err().is_not_found());
    }
}
