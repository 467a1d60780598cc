//! Savings goal model

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::GoalId;
use super::money::Money;

/// A savings goal with a target amount and optional deadline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,

    pub name: String,

    pub target_amount: Money,

    /// Amount saved so far
    #[serde(default)]
    pub current_amount: Money,

    pub currency: String,

    #[serde(default)]
    pub target_date: Option<NaiveDate>,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(name: impl Into<String>, target_amount: Money, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            name: name.into().trim().to_string(),
            target_amount,
            current_amount: Money::zero(),
            currency: currency.into().trim().to_uppercase(),
            target_date: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    /// Add (or with a negative amount, withdraw) savings
    pub fn contribute(&mut self, amount: Money) {
        self.current_amount += amount;
        self.updated_at = Utc::now();
    }

    pub fn set_current(&mut self, amount: Money) {
        self.current_amount = amount;
        self.updated_at = Utc::now();
    }

    /// Progress toward the target, 0 to 100
    pub fn progress_percent(&self) -> f64 {
        if !self.target_amount.is_positive() {
            return 100.0;
        }
        let pct = self.current_amount.cents() as f64 / self.target_amount.cents() as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }

    /// Amount still needed (never negative)
    pub fn remaining(&self) -> Money {
        let remaining = self.target_amount - self.current_amount;
        if remaining.is_negative() {
            Money::zero()
        } else {
            remaining
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Amount to save per month to hit the target date
    ///
    /// Counts the current month, so a deadline this month asks for the whole
    /// remainder. None without a target date.
    pub fn monthly_contribution_needed(&self, as_of: NaiveDate) -> Option<Money> {
        let target = self.target_date?;
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Some(Money::zero());
        }

        let months = (target.year() - as_of.year()) * 12 + target.month() as i32
            - as_of.month() as i32
            + 1;
        if months <= 1 {
            return Some(remaining);
        }

        let per_month = (remaining.cents() + months as i64 - 1) / months as i64;
        Some(Money::from_cents(per_month))
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        Ok(())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} ({:.0}%)",
            self.name,
            self.current_amount,
            self.target_amount.format_with_code(&self.currency),
            self.progress_percent()
        )
    }
}

/// Validation errors for goals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    NonPositiveTarget,
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Goal name cannot be empty"),
            Self::NonPositiveTarget => write!(f, "Goal target must be positive"),
        }
    }
}

impl std::error::Error for GoalValidationError {}
