//! Service layer for Spendwise
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, computed fields, and cross-entity operations.

pub mod account;
pub mod ai;
pub mod alert;
pub mod budget;
pub mod categorization;
pub mod category;
pub mod duplicates;
pub mod goal;
pub mod import;
pub mod transaction;

pub use account::{AccountService, AccountSummary, CreateAccountInput};
pub use ai::{AiCategorizationSummary, AiService};
pub use alert::AlertService;
pub use budget::{BudgetService, BudgetStatus, CreateBudgetInput};
pub use categorization::{CategorizationService, CategorizationSummary, NewRule};
pub use category::{CategoryGroupWithCategories, CategoryService, RelabelCounts};
pub use duplicates::DuplicateService;
pub use goal::{CreateGoalInput, GoalService};
pub use import::{ImportOptions, ImportPreview, ImportResult, ImportService, ImportStatus};
pub use transaction::{CreateTransactionInput, TransactionFilter, TransactionService};
