//! Alert model
//!
//! Alerts are produced by budget checks and by AI insight generation, and
//! stay listed until the user dismisses them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AlertId, BudgetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Observation from AI analysis
    Insight,
    /// A budget crossed a utilisation threshold
    BudgetWarning,
    /// Unusual activity
    Anomaly,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insight => write!(f, "Insight"),
            Self::BudgetWarning => write!(f, "Budget"),
            Self::Anomaly => write!(f, "Anomaly"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Lenient parse, used for AI output; unknown values become Info
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" | "high" | "error" => Self::Critical,
            "warning" | "warn" | "medium" => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,

    pub kind: AlertKind,

    pub severity: Severity,

    pub title: String,

    pub message: String,

    /// Category the alert concerns, if any
    #[serde(default)]
    pub category: Option<String>,

    /// Budget the alert concerns, for budget warnings
    #[serde(default)]
    pub budget_id: Option<BudgetId>,

    /// Budget period the alert was raised for (e.g. "2025-01-01..2025-01-31")
    #[serde(default)]
    pub period: Option<String>,

    #[serde(default)]
    pub dismissed: bool,

    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            category: None,
            budget_id: None,
            period: None,
            dismissed: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn for_budget(mut self, budget_id: BudgetId, period: impl Into<String>) -> Self {
        self.budget_id = Some(budget_id);
        self.period = Some(period.into());
        self
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn is_active(&self) -> bool {
        !self.dismissed
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_alert() {
        let budget_id = BudgetId::new();
        let mut alert = Alert::new(
            AlertKind::BudgetWarning,
            Severity::Warning,
            "Groceries at 85%",
            "Spent 340.00 of 400.00",
        )
        .with_category("Groceries")
        .for_budget(budget_id, "2025-01-01..2025-01-31");

        assert!(alert.is_active());
        assert_eq!(alert.budget_id, Some(budget_id));
        assert_eq!(alert.to_string(), "[warning] Groceries at 85%: Spent 340.00 of 400.00");

        alert.dismiss();
        assert!(!alert.is_active());
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::parse_lenient("HIGH"), Severity::Critical);
        assert_eq!(Severity::parse_lenient("warn"), Severity::Warning);
        assert_eq!(Severity::parse_lenient("whatever"), Severity::Info);
    }
}
