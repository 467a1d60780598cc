//! Core data models for Spendwise
//!
//! This module contains the data structures of the personal-finance domain:
//! accounts, transactions, categories, budgets, goals, alerts, learned
//! merchant history and user categorization rules.

pub mod account;
pub mod alert;
pub mod budget;
pub mod category;
pub mod goal;
pub mod ids;
pub mod merchant;
pub mod money;
pub mod rule;
pub mod transaction;

pub use account::{Account, AccountKind, AccountType};
pub use alert::{Alert, AlertKind, Severity};
pub use budget::{Budget, BudgetPeriod, PeriodRange};
pub use category::{
    category_names_match, normalize_category_name, Bucket, Category, CategoryGroup,
};
pub use goal::Goal;
pub use ids::{
    AccountId, AlertId, BudgetId, CategoryGroupId, CategoryId, GoalId, RuleId, TransactionId,
};
pub use merchant::{HistorySuggestion, MerchantProfile};
pub use money::{Money, MoneyParseError};
pub use rule::{CategoryRule, RuleMatch};
pub use transaction::{Categorization, CategorizationSource, Transaction, UNCATEGORIZED};
