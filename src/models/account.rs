//! Account model
//!
//! Accounts cover both sides of the balance sheet: assets (bank accounts,
//! cash, investments, property) and liabilities (cards, loans, mortgages).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::money::Money;

/// Which side of the balance sheet an account sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => write!(f, "Asset"),
            Self::Liability => write!(f, "Liability"),
        }
    }
}

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Cash,
    Investment,
    Property,
    Vehicle,
    CreditCard,
    Loan,
    Mortgage,
    Other,
}

impl AccountType {
    /// The balance-sheet side implied by this type
    pub fn kind(&self) -> AccountKind {
        match self {
            Self::CreditCard | Self::Loan | Self::Mortgage => AccountKind::Liability,
            _ => AccountKind::Asset,
        }
    }

    pub fn is_liability(&self) -> bool {
        self.kind() == AccountKind::Liability
    }

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "checking" => Some(Self::Checking),
            "savings" => Some(Self::Savings),
            "cash" => Some(Self::Cash),
            "investment" | "brokerage" => Some(Self::Investment),
            "property" | "real_estate" => Some(Self::Property),
            "vehicle" | "car" => Some(Self::Vehicle),
            "credit" | "credit_card" | "creditcard" => Some(Self::CreditCard),
            "loan" => Some(Self::Loan),
            "mortgage" => Some(Self::Mortgage),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Checking,
            Self::Savings,
            Self::Cash,
            Self::Investment,
            Self::Property,
            Self::Vehicle,
            Self::CreditCard,
            Self::Loan,
            Self::Mortgage,
            Self::Other,
        ]
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::Cash => "Cash",
            Self::Investment => "Investment",
            Self::Property => "Property",
            Self::Vehicle => "Vehicle",
            Self::CreditCard => "Credit Card",
            Self::Loan => "Loan",
            Self::Mortgage => "Mortgage",
            Self::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

/// A financial account, asset or liability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    /// Account name (e.g., "Joint Checking")
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Free-form grouping label (household member, business, ...)
    #[serde(default)]
    pub category: Option<String>,

    /// Current balance, stored as a positive amount for liabilities owed
    pub balance: Money,

    /// ISO 4217 currency code
    pub currency: String,

    /// Whether this account is archived (soft-deleted)
    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: AccountType, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            name: name.into().trim().to_string(),
            account_type,
            category: None,
            balance: Money::zero(),
            currency: currency.into().trim().to_uppercase(),
            archived: false,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account with an opening balance
    pub fn with_balance(
        name: impl Into<String>,
        account_type: AccountType,
        currency: impl Into<String>,
        balance: Money,
    ) -> Self {
        let mut account = Self::new(name, account_type, currency);
        account.balance = balance;
        account
    }

    pub fn kind(&self) -> AccountKind {
        self.account_type.kind()
    }

    pub fn set_balance(&mut self, balance: Money) {
        self.balance = balance;
        self.updated_at = Utc::now();
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    /// Contribution of this account to net worth, in its own currency
    ///
    /// Liability balances count against net worth whichever sign they were
    /// entered with.
    pub fn net_worth_contribution(&self) -> Money {
        match self.kind() {
            AccountKind::Asset => self.balance,
            AccountKind::Liability => -self.balance.abs(),
        }
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AccountValidationError::InvalidCurrency(self.currency.clone()));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidCurrency(String),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
            Self::InvalidCurrency(code) => {
                write!(f, "Currency must be a 3-letter code, got '{}'", code)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let account = Account::new(" Checking ", AccountType::Checking, "usd");
        assert_eq!(account.name, "Checking");
        assert_eq!(account.currency, "USD");
        assert_eq!(account.kind(), AccountKind::Asset);
        assert!(!account.archived);
        assert_eq!(account.balance, Money::zero());
    }

    #[test]
    fn test_kind_from_type() {
        assert!(AccountType::CreditCard.is_liability());
        assert!(AccountType::Mortgage.is_liability());
        assert!(AccountType::Loan.is_liability());
        assert!(!AccountType::Property.is_liability());
        assert!(!AccountType::Savings.is_liability());
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(AccountType::parse("credit-card"), Some(AccountType::CreditCard));
        assert_eq!(AccountType::parse("Real Estate"), Some(AccountType::Property));
        assert_eq!(AccountType::parse("MORTGAGE"), Some(AccountType::Mortgage));
        assert_eq!(AccountType::parse("spaceship"), None);
    }

    #[test]
    fn test_net_worth_contribution() {
        let asset = Account::with_balance("House", AccountType::Property, "USD", Money::from_cents(30_000_000));
        assert_eq!(asset.net_worth_contribution().cents(), 30_000_000);

        let owed = Account::with_balance("Mortgage", AccountType::Mortgage, "USD", Money::from_cents(20_000_000));
        assert_eq!(owed.net_worth_contribution().cents(), -20_000_000);

        let negative_entry = Account::with_balance("Card", AccountType::CreditCard, "USD", Money::from_cents(-5_000));
        assert_eq!(negative_entry.net_worth_contribution().cents(), -5_000);
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new("Test", AccountType::Checking, "USD");
        assert!(account.validate().is_ok());

        account.name = String::new();
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));

        account.name = "a".repeat(101);
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::NameTooLong(_))
        ));

        account.name = "Test".into();
        account.currency = "US".into();
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let account = Account::new("Test", AccountType::CreditCard, "EUR");
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"type\":\"credit_card\""));
        let deserialized: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(account.id, deserialized.id);
        assert_eq!(deserialized.account_type, AccountType::CreditCard);
    }
}
