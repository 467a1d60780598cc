//! Transaction model
//!
//! A single dated monetary movement with a description, amount, currency and
//! an optional category label together with how that label was decided.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, TransactionId};
use super::money::Money;

/// Label used when nothing could categorize a transaction
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Where a category label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorizationSource {
    /// A user-defined rule
    UserRule,
    /// The built-in merchant rule table
    Rule,
    /// The user's own past categorizations of the same merchant
    History,
    /// An AI provider suggestion
    Ai,
    /// Set by hand
    Manual,
    /// Nothing matched
    None,
}

impl fmt::Display for CategorizationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UserRule => "user rule",
            Self::Rule => "rule",
            Self::History => "history",
            Self::Ai => "ai",
            Self::Manual => "manual",
            Self::None => "none",
        };
        write!(f, "{}", label)
    }
}

/// How a transaction's category was decided
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub source: CategorizationSource,

    /// Confidence in 0.0..=1.0
    pub confidence: f64,

    /// Name of the matching rule, when a rule decided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Categorization {
    pub fn manual() -> Self {
        Self {
            source: CategorizationSource::Manual,
            confidence: 1.0,
            rule: None,
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// The account this transaction belongs to, if known
    #[serde(default)]
    pub account_id: Option<AccountId>,

    pub date: NaiveDate,

    /// Description as written by the bank
    pub description: String,

    /// Amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// ISO 4217 currency code
    pub currency: String,

    /// Category label
    #[serde(default)]
    pub category: Option<String>,

    /// How the category was decided
    #[serde(default)]
    pub categorization: Option<Categorization>,

    /// Normalized merchant pattern derived from the description
    #[serde(default)]
    pub merchant: String,

    #[serde(default)]
    pub notes: String,

    /// Fingerprint for re-import detection
    #[serde(default)]
    pub import_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new uncategorized transaction
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            account_id: None,
            date,
            description: description.into().trim().to_string(),
            amount,
            currency: currency.into().trim().to_uppercase(),
            category: None,
            categorization: None,
            merchant: String::new(),
            notes: String::new(),
            import_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the transaction to an account
    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn is_inflow(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_outflow(&self) -> bool {
        self.amount.is_negative()
    }

    /// Whether a real category (not the fallback label) is assigned
    pub fn is_categorized(&self) -> bool {
        self.category
            .as_deref()
            .map(|c| !c.eq_ignore_ascii_case(UNCATEGORIZED))
            .unwrap_or(false)
    }

    /// The category label, or the fallback label
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// Assign a category together with how it was decided
    pub fn set_category(&mut self, category: impl Into<String>, categorization: Categorization) {
        self.category = Some(category.into());
        self.categorization = Some(categorization);
        self.updated_at = Utc::now();
    }

    pub fn clear_category(&mut self) {
        self.category = None;
        self.categorization = None;
        self.updated_at = Utc::now();
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TransactionValidationError::InvalidCurrency(
                self.currency.clone(),
            ));
        }

        if self.description.len() > 500 {
            return Err(TransactionValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        if let Some(c) = &self.categorization {
            if !(0.0..=1.0).contains(&c.confidence) {
                return Err(TransactionValidationError::ConfidenceOutOfRange(
                    c.confidence,
                ));
            }
        }

        Ok(())
    }

    /// Fingerprint of date, amount, currency and description
    ///
    /// Stable across builds (FNV-1a), so fingerprints written to disk stay
    /// comparable after upgrades.
    pub fn fingerprint(
        date: NaiveDate,
        amount: Money,
        currency: &str,
        description: &str,
    ) -> String {
        const OFFSET: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;

        let key = format!(
            "{}|{}|{}|{}",
            date,
            amount.cents(),
            currency.trim().to_uppercase(),
            description.trim().to_lowercase()
        );
        let hash = key
            .bytes()
            .fold(OFFSET, |h, b| (h ^ b as u64).wrapping_mul(PRIME));
        format!("imp-{:016x}", hash)
    }

    /// Fingerprint of this transaction
    pub fn generate_import_id(&self) -> String {
        Self::fingerprint(self.date, self.amount, &self.currency, &self.description)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount.format_with_code(&self.currency)
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionValidationError {
    InvalidCurrency(String),
    DescriptionTooLong(usize),
    ConfidenceOutOfRange(f64),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCurrency(code) => {
                write!(f, "Currency must be a 3-letter code, got '{}'", code)
            }
            Self::DescriptionTooLong(len) => {
                write!(f, "Description too long ({} chars, max 500)", len)
            }
            Self::ConfidenceOutOfRange(value) => {
                write!(f, "Confidence must be within 0..=1, got {}", value)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
