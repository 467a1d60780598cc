//! Goal Progress Report

use chrono::NaiveDate;

use crate::error::SpendwiseResult;
use crate::models::{Goal, Money};
use crate::services::GoalService;
use crate::storage::Storage;

/// Progress of one goal
#[derive(Debug, Clone)]
pub struct GoalProgress {
    pub goal: Goal,
    pub percent: f64,
    pub remaining: Money,
    /// Monthly saving needed to meet the target date
    pub monthly_needed: Option<Money>,
    /// Target date has passed without the goal being reached
    pub overdue: bool,
}

/// Goal Progress Report
#[derive(Debug, Clone)]
pub struct GoalReport {
    pub as_of: NaiveDate,
    pub goals: Vec<GoalProgress>,
}

impl GoalReport {
    pub fn generate(storage: &Storage, as_of: NaiveDate, include_complete: bool) -> SpendwiseResult<Self> {
        let goals = GoalService::new(storage)
            .list(include_complete)?
            .into_iter()
            .map(|goal| GoalProgress {
                percent: goal.progress_percent(),
                remaining: goal.remaining(),
                monthly_needed: goal.monthly_contribution_needed(as_of),
                overdue: !goal.is_complete() && goal.target_date.is_some_and(|d| d < as_of),
                goal,
            })
            .collect();
        Ok(Self { as_of, goals })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Goals as of {}\n", self.as_of));
        output.push_str(&"=".repeat(78));
        output.push('\n');

        if self.goals.is_empty() {
            output.push_str("No goals.\n");
            return output;
        }

        for row in &self.goals {
            let goal = &row.goal;
            let filled = (row.percent / 5.0).round() as usize;
            let bar = format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled.min(20)));
            output.push_str(&format!(
                "{:<24} {} {:>5.1}%  {} / {}\n",
                goal.name,
                bar,
                row.percent,
                goal.current_amount,
                goal.target_amount.format_with_code(&goal.currency)
            ));

            let mut detail = format!("  Remaining: {}", row.remaining);
            if let Some(date) = goal.target_date {
                detail.push_str(&format!("  Due: {}", date));
            }
            if let Some(monthly) = row.monthly_needed {
                if !monthly.is_zero() {
                    detail.push_str(&format!("  Needs {}/month", monthly));
                }
            }
            if row.overdue {
                detail.push_str("  OVERDUE");
            }
            output.push_str(&detail);
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use tempfile::TempDir;

    #[test]
    fn test_goal_report() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let mut late = Goal::new("New Roof", Money::from_cents(1_000_000), "USD")
            .with_target_date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        late.contribute(Money::from_cents(250_000));
        storage.goals.upsert(late).unwrap();
        let mut done = Goal::new("Bike", Money::from_cents(50_000), "USD");
        done.contribute(Money::from_cents(50_000));
        storage.goals.upsert(done).unwrap();

        let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let report = GoalReport::generate(&storage, as_of, false).unwrap();
        assert_eq!(report.goals.len(), 1);
        let roof = &report.goals[0];
        assert!((roof.percent - 25.0).abs() < 1e-9);
        assert_eq!(roof.remaining.cents(), 750_000);
        assert!(roof.overdue);
        assert!(report.format_terminal().contains("OVERDUE"));

        assert_eq!(GoalReport::generate(&storage, as_of, true).unwrap().goals.len(), 2);
    }
}
