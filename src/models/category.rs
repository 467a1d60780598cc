//! Category and CategoryGroup models
//!
//! Categories are the labels transactions, budgets and rules refer to. They
//! can be organized into groups and carry a spending bucket used by reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryGroupId, CategoryId};

/// Characters removed from user-entered category names
const DISALLOWED_NAME_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Normalize a category name
///
/// Strips `<`, `>`, `"`, `'` and `&`, collapses runs of whitespace and trims.
/// Clean names pass through unchanged.
///
/// ```
/// use spendwise::models::normalize_category_name;
/// assert_eq!(normalize_category_name("  Kids <Toys> "), "Kids Toys");
/// assert_eq!(normalize_category_name("Groceries"), "Groceries");
/// ```
pub fn normalize_category_name(name: &str) -> String {
    name.chars()
        .filter(|c| !DISALLOWED_NAME_CHARS.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two category labels refer to the same category
pub fn category_names_match(a: &str, b: &str) -> bool {
    normalize_category_name(a).to_lowercase() == normalize_category_name(b).to_lowercase()
}

/// Spending bucket a category rolls up into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Needs,
    #[default]
    Wants,
    Savings,
    Income,
    Transfer,
}

impl Bucket {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "needs" | "need" => Some(Self::Needs),
            "wants" | "want" => Some(Self::Wants),
            "savings" | "saving" => Some(Self::Savings),
            "income" => Some(Self::Income),
            "transfer" | "transfers" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Whether spending in this bucket counts toward expense totals
    pub fn is_spending(&self) -> bool {
        matches!(self, Self::Needs | Self::Wants)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Needs => "Needs",
            Self::Wants => "Wants",
            Self::Savings => "Savings",
            Self::Income => "Income",
            Self::Transfer => "Transfer",
        };
        write!(f, "{}", label)
    }
}

/// A group of related categories (e.g., "Essentials", "Lifestyle")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: CategoryGroupId,

    pub name: String,

    /// Sort order for display
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryGroup {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryGroupId::new(),
            name: normalize_category_name(name),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sort_order(name: &str, sort_order: i32) -> Self {
        let mut group = Self::new(name);
        group.sort_order = sort_order;
        group
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A category label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// The group this category belongs to, if any
    #[serde(default)]
    pub group_id: Option<CategoryGroupId>,

    #[serde(default)]
    pub bucket: Bucket,

    /// Sort order within the group
    #[serde(default)]
    pub sort_order: i32,

    /// Hidden categories are kept for history but left out of listings
    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a category from a user-entered name (normalized)
    pub fn new(name: &str, bucket: Bucket) -> Self {
        Self::with_exact_name(normalize_category_name(name), bucket)
    }

    /// Create a category keeping the name as given
    ///
    /// Used for the built-in labels, which contain `&`.
    pub fn with_exact_name(name: impl Into<String>, bucket: Bucket) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            group_id: None,
            bucket,
            sort_order: 0,
            hidden: false,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_group(mut self, group_id: CategoryGroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Whether this category answers to the given label
    pub fn matches_name(&self, label: &str) -> bool {
        category_names_match(&self.name, label)
    }

    /// Rename from a user-entered name (normalized)
    pub fn rename(&mut self, name: &str) {
        self.name = normalize_category_name(name);
        self.updated_at = Utc::now();
    }

    pub fn move_to_group(&mut self, group_id: Option<CategoryGroupId>) {
        self.group_id = group_id;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    if name.len() > 50 {
        return Err(CategoryValidationError::NameTooLong(name.len()));
    }

    Ok(())
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
