//! Budget Report
//!
//! Utilisation of every budget in its current period.

use chrono::NaiveDate;

use crate::config::Settings;
use crate::error::SpendwiseResult;
use crate::services::budget::{BudgetService, BudgetStatus};
use crate::storage::Storage;

/// Budget Report
#[derive(Debug, Clone)]
pub struct BudgetReport {
    pub as_of: NaiveDate,
    /// Highest utilisation first
    pub rows: Vec<BudgetStatus>,
}

impl BudgetReport {
    pub fn generate(storage: &Storage, settings: &Settings, as_of: NaiveDate) -> SpendwiseResult<Self> {
        let mut rows = BudgetService::new(storage, settings).status_all(as_of)?;
        rows.sort_by(|a, b| b.percent_used().total_cmp(&a.percent_used()));
        Ok(Self { as_of, rows })
    }

    pub fn over_budget_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_over_budget()).count()
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Budget Status as of {}\n", self.as_of));
        output.push_str(&"=".repeat(78));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("No active budgets.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<22} {:<8} {:>12} {:>12} {:>12} {:>7}\n",
            "Category", "Period", "Budget", "Spent", "Remaining", "Used"
        ));
        output.push_str(&"-".repeat(78));
        output.push('\n');

        for row in &self.rows {
            let marker = if row.is_over_budget() { " !" } else { "" };
            output.push_str(&format!(
                "{:<22} {:<8} {:>12} {:>12} {:>12} {:>6.0}%{}\n",
                row.budget.category,
                row.budget.period.to_string(),
                row.budget.amount.format_with_code(&row.budget.currency),
                row.spent,
                row.remaining,
                row.percent_used(),
                marker
            ));
        }

        let over = self.over_budget_count();
        if over > 0 {
            output.push_str(&format!("\n{} budget(s) over limit (!)\n", over));
        }
        output
    }
}
