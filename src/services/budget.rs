//! Budget service
//!
//! Spending limits per category and their utilisation in the current period.

use chrono::NaiveDate;
use tracing::info;

use crate::config::Settings;
use crate::currency::CurrencyConverter;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{category_names_match, Budget, BudgetId, BudgetPeriod, Money, PeriodRange};
use crate::storage::Storage;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
    converter: CurrencyConverter,
}

/// Input for creating a budget
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    pub category: String,
    pub amount: Money,
    pub currency: String,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
}

/// Utilisation of a budget in one period
#[derive(Debug, Clone)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub period: PeriodRange,
    /// Net outflow in the budget's currency; refunds reduce it
    pub spent: Money,
    pub remaining: Money,
    pub transaction_count: usize,
}

impl BudgetStatus {
    /// Spent as a percentage of the limit
    pub fn percent_used(&self) -> f64 {
        if !self.budget.amount.is_positive() {
            return 0.0;
        }
        self.spent.cents() as f64 / self.budget.amount.cents() as f64 * 100.0
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budget.amount
    }

    /// Label of the period, used to key alerts
    pub fn period_key(&self) -> String {
        self.period.to_string()
    }
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            converter: CurrencyConverter::new(settings),
        }
    }

    /// Create a budget; one budget per category and period kind
    pub fn create(&self, input: CreateBudgetInput) -> SpendwiseResult<Budget> {
        let category = self
            .storage
            .categories
            .get_category_by_name(&input.category)?
            .ok_or_else(|| SpendwiseError::category_not_found(input.category.clone()))?;

        let existing = self.storage.budgets.find(|b| {
            b.period == input.period && category_names_match(&b.category, &category.name)
        })?;
        if existing.is_some() {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Budget",
                identifier: format!("{} ({})", category.name, input.period),
            });
        }

        // Fail now rather than on every status check
        self.converter.rate(&input.currency)?;

        let budget = Budget::new(
            category.name,
            input.amount,
            input.currency,
            input.period,
            input.start_date,
        );
        budget
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        info!(budget = %budget, "created budget");
        Ok(budget)
    }

    pub fn get(&self, id: BudgetId) -> SpendwiseResult<Option<Budget>> {
        self.storage.budgets.get(id)
    }

    /// Find a budget by category label or ID
    ///
    /// A category with several budgets resolves to the first in listing
    /// order.
    pub fn find(&self, identifier: &str) -> SpendwiseResult<Option<Budget>> {
        if let Some(budget) = self
            .storage
            .budgets
            .find(|b| category_names_match(&b.category, identifier))?
        {
            return Ok(Some(budget));
        }
        self.storage.budgets.find(|b| b.id.matches(identifier))
    }

    pub fn require(&self, identifier: &str) -> SpendwiseResult<Budget> {
        self.find(identifier)?
            .ok_or_else(|| SpendwiseError::budget_not_found(identifier))
    }

    pub fn list(&self) -> SpendwiseResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    pub fn set_amount(&self, id: BudgetId, amount: Money) -> SpendwiseResult<Budget> {
        let mut budget = self
            .get(id)?
            .ok_or_else(|| SpendwiseError::budget_not_found(id.to_string()))?;
        budget.set_amount(amount);
        budget
            .validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        Ok(budget)
    }

    pub fn delete(&self, id: BudgetId) -> SpendwiseResult<Budget> {
        let budget = self
            .get(id)?
            .ok_or_else(|| SpendwiseError::budget_not_found(id.to_string()))?;
        self.storage.budgets.delete(id)?;
        self.storage.budgets.save()?;
        Ok(budget)
    }

    /// Status of one budget in the period containing `as_of`
    ///
    /// None when the budget has not started yet.
    pub fn status(&self, budget: &Budget, as_of: NaiveDate) -> SpendwiseResult<Option<BudgetStatus>> {
        let Some(period) = budget.current_period(as_of) else {
            return Ok(None);
        };

        let transactions: Vec<_> = self
            .storage
            .transactions
            .get_by_date_range(period.start, period.end)?
            .into_iter()
            .filter(|t| {
                t.category
                    .as_deref()
                    .is_some_and(|c| category_names_match(c, &budget.category))
            })
            .collect();

        let net = self
            .converter
            .sum(transactions.iter().map(|t| (t.amount, t.currency.as_str())))?;
        let rate = self.converter.rate(&budget.currency)?;
        let outflow = -net;
        let spent = if outflow.is_positive() {
            outflow.convert(1.0 / rate)
        } else {
            Money::zero()
        };

        Ok(Some(BudgetStatus {
            remaining: budget.amount - spent,
            spent,
            period,
            transaction_count: transactions.len(),
            budget: budget.clone(),
        }))
    }

    /// Status of every active budget as of a date
    pub fn status_all(&self, as_of: NaiveDate) -> SpendwiseResult<Vec<BudgetStatus>> {
        let mut result = Vec::new();
        for budget in self.list()? {
            if let Some(status) = self.status(&budget, as_of)? {
                result.push(status);
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use crate::models::{Categorization, Transaction};
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

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn monthly(category: &str, cents: i64) -> CreateBudgetInput {
        CreateBudgetInput {
            category: category.into(),
            amount: Money::from_cents(cents),
            currency: "USD".into(),
            period: BudgetPeriod::Monthly,
            start_date: date(1, 1),
        }
    }

    fn spend(storage: &Storage, day: NaiveDate, category: &str, cents: i64, currency: &str) {
        let mut txn = Transaction::new(day, "x", Money::from_cents(cents), currency);
        txn.set_category(category, Categorization::manual());
        storage.transactions.upsert(txn).unwrap();
    }

    #[test]
    fn test_create_uses_stored_label() {
        let (_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage, &Settings::default());

        let budget = service.create(monthly("food dining", 40000)).unwrap();
        assert_eq!(budget.category, "Food & Dining");

        assert!(matches!(
            service.create(monthly("Food & Dining", 1000)),
            Err(SpendwiseError::Duplicate { .. })
        ));
        assert!(service.create(monthly("Yachts", 1000)).unwrap_err().is_not_found());
        assert!(service.create(monthly("Travel", 0)).unwrap_err().is_validation());
    }

    #[test]
    fn test_status_counts_current_period_only() {
        let (_dir, storage) = create_test_storage();
        let mut settings = Settings::default();
        settings.exchange_rates.insert("EUR".into(), 1.5);
        let service = BudgetService::new(&storage, &settings);
        let budget = service.create(monthly("Groceries", 50000)).unwrap();

        spend(&storage, date(3, 2), "Groceries", -20000, "USD");
        spend(&storage, date(3, 20), "groceries", -10000, "EUR");
        spend(&storage, date(3, 21), "Groceries", 2500, "USD");
        spend(&storage, date(2, 27), "Groceries", -99999, "USD");
        spend(&storage, date(3, 5), "Shopping", -5000, "USD");

        let status = service.status(&budget, date(3, 25)).unwrap().unwrap();
        assert_eq!(status.transaction_count, 3);
        assert_eq!(status.spent.cents(), 32500);
        assert_eq!(status.remaining.cents(), 17500);
        assert!((status.percent_used() - 65.0).abs() < 1e-9);
        assert!(!status.is_over_budget());
        assert_eq!(status.period_key(), "2025-03-01..2025-03-31");
    }

    #[test]
    fn test_status_before_start_and_refund_only() {
        let (_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage, &Settings::default());
        let mut input = monthly("Travel", 10000);
        input.start_date = date(6, 1);
        let budget = service.create(input).unwrap();

        assert!(service.status(&budget, date(5, 31)).unwrap().is_none());

        spend(&storage, date(6, 3), "Travel", 4000, "USD");
        let status = service.status(&budget, date(6, 10)).unwrap().unwrap();
        assert!(status.spent.is_zero());
    }

    #[test]
    fn test_over_budget_and_update() {
        let (_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage, &Settings::default());
        let budget = service.create(monthly("Shopping", 10000)).unwrap();
        spend(&storage, date(4, 2), "Shopping", -15000, "USD");

        let status = service.status(&budget, date(4, 30)).unwrap().unwrap();
        assert!(status.is_over_budget());
        assert_eq!(status.remaining.cents(), -5000);

        let updated = service.set_amount(budget.id, Money::from_cents(20000)).unwrap();
        assert_eq!(updated.amount.cents(), 20000);
        assert_eq!(service.require("shopping").unwrap().id, budget.id);

        service.delete(budget.id).unwrap();
        assert!(service.list().unwrap().is_empty());
    }
}
