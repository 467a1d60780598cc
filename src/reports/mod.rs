//! Reports module for Spendwise
//!
//! Aggregations over stored data: monthly cash flow, spending by category,
//! budget utilisation, net worth and goal progress. Amounts are converted to
//! the base currency. Transactions in transfer categories count as neither
//! income nor spending.

pub mod budgets;
pub mod categories;
pub mod goals;
pub mod monthly;
pub mod net_worth;

pub use budgets::BudgetReport;
pub use categories::{CategoryBreakdownReport, CategorySpending, MerchantSpending};
pub use goals::{GoalProgress, GoalReport};
pub use monthly::{MonthSummary, MonthlySummaryReport};
pub use net_worth::{AccountBalance, AccountTypeGroup, NetWorthReport, NetWorthSummary};

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::currency::CurrencyConverter;
use crate::error::SpendwiseResult;
use crate::models::{Bucket, Money, Transaction};
use crate::storage::Storage;

/// A transaction with its amount in the base currency
#[derive(Debug, Clone)]
pub struct Flow {
    pub transaction: Transaction,
    pub amount: Money,
}

impl Flow {
    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_spending(&self) -> bool {
        self.amount.is_negative()
    }
}

/// Non-transfer transactions dated within `start..=end`, oldest first
pub fn collect_flows(
    storage: &Storage,
    converter: &CurrencyConverter,
    start: NaiveDate,
    end: NaiveDate,
) -> SpendwiseResult<Vec<Flow>> {
    let transfer_labels: HashSet<String> = storage
        .categories
        .get_all_categories()?
        .into_iter()
        .filter(|c| c.bucket == Bucket::Transfer)
        .map(|c| c.name.to_lowercase())
        .collect();

    let mut transactions = storage.transactions.get_by_date_range(start, end)?;
    transactions.reverse();

    let mut flows = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        let is_transfer = transaction
            .category
            .as_deref()
            .is_some_and(|c| transfer_labels.contains(&c.to_lowercase()));
        if is_transfer {
            continue;
        }
        let amount = converter.to_base(transaction.amount, &transaction.currency)?;
        flows.push(Flow {
            transaction,
            amount,
        });
    }
    Ok(flows)
}

/// Share of `part` in `total` as a percentage, 0 when the total is zero
pub(crate) fn percentage(part: Money, total: Money) -> f64 {
    if total.is_zero() {
        0.0
    } else {
        part.abs().cents() as f64 / total.abs().cents() as f64 * 100.0
    }
}
