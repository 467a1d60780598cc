//! Savings goal service

use chrono::NaiveDate;
use tracing::info;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Goal, GoalId, Money};
use crate::storage::Storage;

/// Service for savings goals
pub struct GoalService<'a> {
    storage: &'a Storage,
}

/// Input for creating a goal
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    pub name: String,
    pub target_amount: Money,
    pub currency: String,
    pub target_date: Option<NaiveDate>,
    pub starting_amount: Money,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateGoalInput) -> SpendwiseResult<Goal> {
        if self.get_by_name(&input.name)?.is_some() {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Goal",
                identifier: input.name.trim().to_string(),
            });
        }

        let mut goal = Goal::new(input.name, input.target_amount, input.currency);
        if let Some(date) = input.target_date {
            goal = goal.with_target_date(date);
        }
        goal.set_current(input.starting_amount);
        goal.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;
        info!(goal = %goal.name, "created goal");
        Ok(goal)
    }

    pub fn get_by_name(&self, name: &str) -> SpendwiseResult<Option<Goal>> {
        let name = name.trim();
        self.storage.goals.find(|g| g.name.eq_ignore_ascii_case(name))
    }

    /// Find a goal by name or ID
    pub fn find(&self, identifier: &str) -> SpendwiseResult<Option<Goal>> {
        if let Some(goal) = self.get_by_name(identifier)? {
            return Ok(Some(goal));
        }
        self.storage.goals.find(|g| g.id.matches(identifier))
    }

    pub fn require(&self, identifier: &str) -> SpendwiseResult<Goal> {
        self.find(identifier)?
            .ok_or_else(|| SpendwiseError::goal_not_found(identifier))
    }

    /// Goals with a deadline first, soonest first
    pub fn list(&self, include_complete: bool) -> SpendwiseResult<Vec<Goal>> {
        self.storage
            .goals
            .filter(|g| include_complete || !g.is_complete())
    }

    /// Add to (or withdraw from, when negative) a goal's savings
    pub fn contribute(&self, id: GoalId, amount: Money) -> SpendwiseResult<Goal> {
        let mut goal = self.load(id)?;
        if (goal.current_amount + amount).is_negative() {
            return Err(SpendwiseError::Validation(format!(
                "Cannot withdraw {} from '{}': only {} saved",
                amount.abs(),
                goal.name,
                goal.current_amount
            )));
        }
        let was_complete = goal.is_complete();
        goal.contribute(amount);
        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;
        if goal.is_complete() && !was_complete {
            info!(goal = %goal.name, "goal reached");
        }
        Ok(goal)
    }

    pub fn set_current(&self, id: GoalId, amount: Money) -> SpendwiseResult<Goal> {
        if amount.is_negative() {
            return Err(SpendwiseError::Validation(
                "Saved amount cannot be negative".into(),
            ));
        }
        let mut goal = self.load(id)?;
        goal.set_current(amount);
        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;
        Ok(goal)
    }

    pub fn delete(&self, id: GoalId) -> SpendwiseResult<Goal> {
        let goal = self.load(id)?;
        self.storage.goals.delete(id)?;
        self.storage.goals.save()?;
        Ok(goal)
    }

    fn load(&self, id: GoalId) -> SpendwiseResult<Goal> {
        self.storage
            .goals
            .get(id)?
            .ok_or_else(|| SpendwiseError::goal_not_found(id.to_string()))
    }
}
