//! Budget and goal display formatting

use chrono::NaiveDate;
use tabled::Tabled;

use super::render_table;
use crate::models::{Budget, Goal};
use crate::services::budget::BudgetStatus;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Used")]
    used: String,
}

/// Format budgets with their current-period status where one exists
pub fn format_budget_list(budgets: &[Budget], statuses: &[BudgetStatus]) -> String {
    if budgets.is_empty() {
        return "No budgets found.".to_string();
    }

    let rows = budgets
        .iter()
        .map(|budget| {
            let status = statuses.iter().find(|s| s.budget.id == budget.id);
            let (spent, used) = match status {
                Some(s) => {
                    let flag = if s.is_over_budget() { " (!)" } else { "" };
                    (
                        s.spent.to_string(),
                        format!("{:.0}%{}", s.percent_used(), flag),
                    )
                }
                None => ("-".to_string(), format!("starts {}", budget.start_date)),
            };
            BudgetRow {
                id: budget.id.short(),
                category: budget.category.clone(),
                period: budget.period.to_string(),
                limit: budget.amount.format_with_code(&budget.currency),
                spent,
                used,
            }
        })
        .collect();

    render_table(rows)
}

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Goal")]
    name: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Due")]
    due: String,
}

/// Format savings goals
pub fn format_goal_list(goals: &[Goal], as_of: NaiveDate) -> String {
    if goals.is_empty() {
        return "No goals found.".to_string();
    }

    let rows = goals
        .iter()
        .map(|goal| {
            let due = match (goal.target_date, goal.monthly_contribution_needed(as_of)) {
                _ if goal.is_complete() => "done".to_string(),
                (Some(date), Some(monthly)) => format!("{} ({}/mo)", date, monthly),
                (Some(date), None) => date.to_string(),
                (None, _) => String::new(),
            };
            GoalRow {
                id: goal.id.short(),
                name: goal.name.clone(),
                saved: goal.current_amount.to_string(),
                target: goal.target_amount.format_with_code(&goal.currency),
                progress: format!("{:.0}%", goal.progress_percent()),
                due,
            }
        })
        .collect();

    render_table(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetPeriod, Money, PeriodRange};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_budget_list() {
        let groceries = Budget::new(
            "Groceries",
            Money::from_cents(40000),
            "USD",
            BudgetPeriod::Monthly,
            date(2025, 1, 1),
        );
        let future = Budget::new(
            "Travel",
            Money::from_cents(100000),
            "USD",
            BudgetPeriod::Yearly,
            date(2026, 1, 1),
        );
        let status = BudgetStatus {
            budget: groceries.clone(),
            period: PeriodRange {
                start: date(2025, 3, 1),
                end: date(2025, 3, 31),
            },
            spent: Money::from_cents(44000),
            remaining: Money::from_cents(-4000),
            transaction_count: 6,
        };

        let output = format_budget_list(&[groceries, future], &[status]);
        assert!(output.contains("400.00 USD"));
        assert!(output.contains("110% (!)"));
        assert!(output.contains("starts 2026-01-01"));
    }

    #[test]
    fn test_goal_list() {
        let mut goal = Goal::new("Emergency fund", Money::from_cents(100000), "USD")
            .with_target_date(date(2025, 12, 31));
        goal.contribute(Money::from_cents(25000));

        let output = format_goal_list(&[goal], date(2025, 6, 30));
        assert!(output.contains("Emergency fund"));
        assert!(output.contains("25%"));
        assert!(output.contains("2025-12-31"));
        assert_eq!(format_goal_list(&[], date(2025, 6, 30)), "No goals found.");
    }
}
