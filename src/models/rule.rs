//! User-defined categorization rule model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::RuleId;

/// How a rule's pattern is compared with a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleMatch {
    /// Case-insensitive substring
    #[default]
    Contains,
    /// Case-insensitive regular expression
    Regex,
    /// Whole description or merchant pattern, case-insensitive
    Exact,
}

impl RuleMatch {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "contains" | "substring" => Some(Self::Contains),
            "regex" | "re" => Some(Self::Regex),
            "exact" | "equals" => Some(Self::Exact),
            _ => None,
        }
    }
}

impl fmt::Display for RuleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains => write!(f, "contains"),
            Self::Regex => write!(f, "regex"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

fn default_rule_confidence() -> f64 {
    0.95
}

fn default_true() -> bool {
    true
}

/// A rule mapping descriptions to a category label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: RuleId,

    /// Display name, reported as the matched rule
    pub name: String,

    pub pattern: String,

    #[serde(default)]
    pub match_kind: RuleMatch,

    /// Category label assigned on match
    pub category: String,

    /// Lower values are evaluated first
    #[serde(default)]
    pub priority: i32,

    #[serde(default = "default_rule_confidence")]
    pub confidence: f64,

    #[serde(default = "default_true")]
    pub enabled: bool,

    pub created_at: DateTime<Utc>,
}

impl CategoryRule {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        match_kind: RuleMatch,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: RuleId::new(),
            name: name.into().trim().to_string(),
            pattern: pattern.into(),
            match_kind,
            category: category.into(),
            priority: 0,
            confidence: default_rule_confidence(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.name.is_empty() {
            return Err(RuleValidationError::EmptyName);
        }
        if self.pattern.trim().is_empty() {
            return Err(RuleValidationError::EmptyPattern);
        }
        if self.category.trim().is_empty() {
            return Err(RuleValidationError::EmptyCategory);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(RuleValidationError::ConfidenceOutOfRange(self.confidence));
        }
        if self.match_kind == RuleMatch::Regex {
            regex::Regex::new(&self.pattern)
                .map_err(|e| RuleValidationError::InvalidRegex(e.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for CategoryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} '{}' -> {})",
            self.name, self.match_kind, self.pattern, self.category
        )
    }
}

/// Validation errors for rules
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValidationError {
    EmptyName,
    EmptyPattern,
    EmptyCategory,
    ConfidenceOutOfRange(f64),
    InvalidRegex(String),
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Rule name cannot be empty"),
            Self::EmptyPattern => write!(f, "Rule pattern cannot be empty"),
            Self::EmptyCategory => write!(f, "Rule must assign a category"),
            Self::ConfidenceOutOfRange(value) => {
                write!(f, "Rule confidence must be within 0..=1, got {}", value)
            }
            Self::InvalidRegex(msg) => write!(f, "Invalid rule regex: {}", msg),
        }
    }
}

impl std::error::Error for RuleValidationError {}
