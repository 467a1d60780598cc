//! Budget model
//!
//! A spending limit for one category over a recurring period.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BudgetId;
use super::money::Money;

/// How often a budget resets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            "yearly" | "year" | "annual" | "y" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// The period instance containing `date`
    pub fn range_containing(&self, date: NaiveDate) -> PeriodRange {
        match self {
            Self::Weekly => {
                let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                PeriodRange {
                    start,
                    end: start + Duration::days(6),
                }
            }
            Self::Monthly => {
                let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
                let next = if date.month() == 12 {
                    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
                };
                let end = next.map(|d| d - Duration::days(1)).unwrap_or(date);
                PeriodRange { start, end }
            }
            Self::Yearly => PeriodRange {
                start: NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
                end: NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
            },
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

/// An inclusive date range for one budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Days elapsed from the start through `date`, clamped to the range
    pub fn days_elapsed(&self, date: NaiveDate) -> i64 {
        let total = self.total_days();
        ((date - self.start).num_days() + 1).clamp(0, total)
    }

    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A spending limit for a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    /// Category label the budget applies to
    pub category: String,

    /// Limit per period, in `currency`
    pub amount: Money,

    pub currency: String,

    pub period: BudgetPeriod,

    /// The budget does not apply before this date
    pub start_date: NaiveDate,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            category: category.into(),
            amount,
            currency: currency.into().trim().to_uppercase(),
            period,
            start_date,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The current period as of `date`, or None before the budget starts
    ///
    /// The first period is clipped so spending before `start_date` does not
    /// count.
    pub fn current_period(&self, date: NaiveDate) -> Option<PeriodRange> {
        if date < self.start_date {
            return None;
        }
        let mut range = self.period.range_containing(date);
        if range.start < self.start_date {
            range.start = self.start_date;
        }
        Some(range)
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.category.trim().is_empty() {
            return Err(BudgetValidationError::MissingCategory);
        }
        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.category,
            self.amount.format_with_code(&self.currency),
            self.period
        )
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    MissingCategory,
    NonPositiveAmount,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCategory => write!(f, "Budget must name a category"),
            Self::NonPositiveAmount => write!(f, "Budget amount must be positive"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
