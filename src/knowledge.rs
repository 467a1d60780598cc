//! Knowledge document
//!
//! A compact JSON digest of the user's finances: recent totals, top
//! categories and merchants, the monthly trend, budgets, goals and net
//! worth. It grounds AI insights and chat, and is small enough to send as
//! prompt context.

use std::fs;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Settings, SpendwisePaths};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::Money;
use crate::reports::{
    BudgetReport, CategoryBreakdownReport, GoalReport, MonthlySummaryReport, NetWorthReport,
};
use crate::storage::{write_json_atomic, Storage};

/// Trailing window summarised by the document
pub const KNOWLEDGE_WINDOW_DAYS: i64 = 90;

const TOP_CATEGORIES: usize = 8;

const KNOWLEDGE_SCHEMA_VERSION: u32 = 1;

fn major(amount: Money) -> f64 {
    amount.as_major()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub spending: f64,
    pub net: f64,
    pub transaction_count: usize,
    pub uncategorized_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFigure {
    pub category: String,
    pub amount: f64,
    pub count: usize,
    /// Percentage of total spending
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantFigure {
    pub merchant: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthFigure {
    pub month: String,
    pub income: f64,
    pub spending: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetFigure {
    pub category: String,
    pub period: String,
    pub limit: f64,
    pub spent: f64,
    pub percent_used: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalFigure {
    pub name: String,
    pub target: f64,
    pub current: f64,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthFigure {
    pub assets: f64,
    pub liabilities: f64,
    pub net: f64,
}

/// Digest of the user's finances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub schema_version: u32,
    pub generated_on: NaiveDate,
    pub base_currency: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub totals: Totals,
    pub top_categories: Vec<CategoryFigure>,
    pub top_merchants: Vec<MerchantFigure>,
    pub monthly_trend: Vec<MonthFigure>,
    pub budgets: Vec<BudgetFigure>,
    pub goals: Vec<GoalFigure>,
    pub net_worth: NetWorthFigure,
}

impl KnowledgeDocument {
    /// Compile the document for the 90 days ending at `as_of`
    pub fn compile(storage: &Storage, settings: &Settings, as_of: NaiveDate) -> SpendwiseResult<Self> {
        let window_start = as_of - Duration::days(KNOWLEDGE_WINDOW_DAYS - 1);

        let breakdown = CategoryBreakdownReport::generate(storage, settings, window_start, as_of)?;
        let monthly = MonthlySummaryReport::generate(storage, settings, window_start, as_of)?;
        let budgets = BudgetReport::generate(storage, settings, as_of)?;
        let goals = GoalReport::generate(storage, as_of, true)?;
        let net_worth = NetWorthReport::generate(storage, settings, false)?;

        let transaction_count = monthly.months.iter().map(|m| m.transaction_count).sum();
        let uncategorized_count = storage
            .transactions
            .get_by_date_range(window_start, as_of)?
            .iter()
            .filter(|t| !t.is_categorized())
            .count();

        let document = Self {
            schema_version: KNOWLEDGE_SCHEMA_VERSION,
            generated_on: as_of,
            base_currency: breakdown.base_currency.clone(),
            window_start,
            window_end: as_of,
            totals: Totals {
                income: major(monthly.total_income),
                spending: major(monthly.total_spending),
                net: major(monthly.net()),
                transaction_count,
                uncategorized_count,
            },
            top_categories: breakdown
                .categories
                .iter()
                .take(TOP_CATEGORIES)
                .map(|c| CategoryFigure {
                    category: c.category.clone(),
                    amount: major(c.amount),
                    count: c.transaction_count,
                    share: (c.percentage * 10.0).round() / 10.0,
                })
                .collect(),
            top_merchants: breakdown
                .merchants
                .iter()
                .map(|m| MerchantFigure {
                    merchant: m.merchant.clone(),
                    amount: major(m.amount),
                    count: m.transaction_count,
                })
                .collect(),
            monthly_trend: monthly
                .months
                .iter()
                .map(|m| MonthFigure {
                    month: m.label(),
                    income: major(m.income),
                    spending: major(m.spending),
                    net: major(m.net),
                })
                .collect(),
            budgets: budgets
                .rows
                .iter()
                .map(|b| BudgetFigure {
                    category: b.budget.category.clone(),
                    period: b.budget.period.to_string(),
                    limit: major(b.budget.amount),
                    spent: major(b.spent),
                    percent_used: b.percent_used().round(),
                    currency: b.budget.currency.clone(),
                })
                .collect(),
            goals: goals
                .goals
                .iter()
                .map(|g| GoalFigure {
                    name: g.goal.name.clone(),
                    target: major(g.goal.target_amount),
                    current: major(g.goal.current_amount),
                    progress: g.percent.round(),
                    target_date: g.goal.target_date,
                })
                .collect(),
            net_worth: NetWorthFigure {
                assets: major(net_worth.summary.total_assets),
                liabilities: major(net_worth.summary.total_liabilities),
                net: major(net_worth.summary.net_worth),
            },
        };

        info!(
            transactions = transaction_count,
            categories = document.top_categories.len(),
            "compiled knowledge document"
        );
        Ok(document)
    }

    /// Compile as of today
    pub fn compile_today(storage: &Storage, settings: &Settings) -> SpendwiseResult<Self> {
        Self::compile(storage, settings, Utc::now().date_naive())
    }

    pub fn save(&self, paths: &SpendwisePaths) -> SpendwiseResult<()> {
        write_json_atomic(paths.knowledge_file(), self)
    }

    /// Load the saved document, if one was compiled before
    pub fn load(paths: &SpendwisePaths) -> SpendwiseResult<Option<Self>> {
        let path = paths.knowledge_file();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let document = serde_json::from_str(&contents).map_err(|e| {
            SpendwiseError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(document))
    }

    /// Pretty JSON for prompts and display
    pub fn to_json(&self) -> SpendwiseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Categorization, Goal, Transaction};
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

    fn add(storage: &Storage, date: NaiveDate, cents: i64, category: Option<&str>) {
        let mut txn = Transaction::new(date, "Corner Store", Money::from_cents(cents), "USD");
        txn.merchant = "CORNER STORE".into();
        if let Some(category) = category {
            txn.set_category(category, Categorization::manual());
        }
        storage.transactions.upsert(txn).unwrap();
    }

    #[test]
    fn test_compile_window_and_totals() {
        let (_dir, storage) = create_test_storage();
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

        add(&storage, as_of, -5_000, Some("Groceries"));
        add(&storage, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(), 200_000, Some("Income"));
        add(&storage, NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(), -1_250, None);
        // Outside the 90-day window
        add(&storage, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), -99_900, Some("Travel"));

        storage
            .accounts
            .upsert(Account::with_balance(
                "Checking",
                AccountType::Checking,
                "USD",
                Money::from_cents(300_000),
            ))
            .unwrap();
        storage
            .goals
            .upsert(Goal::new("Trip", Money::from_cents(100_000), "USD"))
            .unwrap();

        let doc = KnowledgeDocument::compile(&storage, &Settings::default(), as_of).unwrap();
        assert_eq!(doc.window_start, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
        assert_eq!(doc.totals.income, 2000.0);
        assert_eq!(doc.totals.spending, 62.5);
        assert_eq!(doc.totals.transaction_count, 3);
        assert_eq!(doc.totals.uncategorized_count, 1);
        assert_eq!(doc.top_categories[0].category, "Groceries");
        assert_eq!(doc.top_merchants[0].merchant, "CORNER STORE");
        assert_eq!(doc.monthly_trend.len(), 3);
        assert_eq!(doc.goals[0].name, "Trip");
        assert_eq!(doc.net_worth.net, 3000.0);
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, storage) = create_test_storage();
        let paths = storage.paths().clone();
        assert!(KnowledgeDocument::load(&paths).unwrap().is_none());

        let as_of = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let doc = KnowledgeDocument::compile(&storage, &Settings::default(), as_of).unwrap();
        doc.save(&paths).unwrap();

        let loaded = KnowledgeDocument::load(&paths).unwrap().unwrap();
        assert_eq!(loaded, doc);
        assert!(doc.to_json().unwrap().contains("\"base_currency\": \"USD\""));
    }
}
