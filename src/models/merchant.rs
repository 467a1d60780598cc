//! Merchant profile model
//!
//! Learned categorization history for one merchant pattern. Each time a user
//! categorizes a transaction, the category is counted against the merchant so
//! later transactions from the same merchant can be categorized from history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::category::category_names_match;

/// Confidence given to a category the user pinned to a merchant
const PINNED_CONFIDENCE: f64 = 0.95;

/// A category suggested from merchant history
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySuggestion {
    pub category: String,
    pub confidence: f64,
}

/// Categorization history for a merchant pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Normalized merchant pattern (see `extract_merchant_pattern`)
    pub pattern: String,

    /// Category usage frequency (category label -> count)
    #[serde(default)]
    pub category_frequency: BTreeMap<String, u32>,

    /// Category pinned by the user, overriding frequency
    #[serde(default)]
    pub default_category: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MerchantProfile {
    pub fn new(pattern: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            pattern: pattern.into(),
            category_frequency: BTreeMap::new(),
            default_category: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Count one use of `category` for this merchant
    pub fn record_category_usage(&mut self, category: &str) {
        let key = self
            .category_frequency
            .keys()
            .find(|existing| category_names_match(existing, category))
            .cloned()
            .unwrap_or_else(|| category.to_string());
        *self.category_frequency.entry(key).or_insert(0) += 1;
        self.updated_at = Utc::now();
    }

    /// Pin a category for this merchant
    pub fn set_default_category(&mut self, category: impl Into<String>) {
        self.default_category = Some(category.into());
        self.updated_at = Utc::now();
    }

    pub fn clear_default_category(&mut self) {
        self.default_category = None;
        self.updated_at = Utc::now();
    }

    pub fn total_uses(&self) -> u32 {
        self.category_frequency.values().sum()
    }

    /// The pinned category, else the most used one
    ///
    /// Confidence for learned categories is the category's share of all
    /// recorded uses. Ties go to the alphabetically first label.
    pub fn suggestion(&self) -> Option<HistorySuggestion> {
        if let Some(category) = &self.default_category {
            return Some(HistorySuggestion {
                category: category.clone(),
                confidence: PINNED_CONFIDENCE,
            });
        }

        let total = self.total_uses();
        if total == 0 {
            return None;
        }

        let mut best: Option<(&String, u32)> = None;
        for (category, &count) in &self.category_frequency {
            if best.map(|(_, c)| count > c).unwrap_or(true) {
                best = Some((category, count));
            }
        }

        best.map(|(category, count)| HistorySuggestion {
            category: category.clone(),
            confidence: count as f64 / total as f64,
        })
    }

    /// Fuzzy similarity of this merchant's pattern to another pattern (0.0 to 1.0)
    pub fn similarity_score(&self, pattern: &str) -> f64 {
        let own = self.pattern.trim().to_uppercase();
        let query = pattern.trim().to_uppercase();

        if own.is_empty() || query.is_empty() {
            return 0.0;
        }

        if own == query {
            return 1.0;
        }

        if own.contains(&query) || query.contains(&own) {
            return 0.8;
        }

        let own_words: HashSet<&str> = own.split_whitespace().collect();
        let query_words: HashSet<&str> = query.split_whitespace().collect();
        let intersection = own_words.intersection(&query_words).count();
        let union = own_words.union(&query_words).count();

        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

impl fmt::Display for MerchantProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_learning() {
        let mut profile = MerchantProfile::new("WHOLE FOODS");
        profile.record_category_usage("Groceries");
        profile.record_category_usage("groceries");
        profile.record_category_usage("Household");

        assert_eq!(profile.category_frequency.get("Groceries"), Some(&2));
        assert_eq!(profile.total_uses(), 3);

        let suggestion = profile.suggestion().unwrap();
        assert_eq!(suggestion.category, "Groceries");
        assert!((suggestion.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_pinned_category_wins() {
        let mut profile = MerchantProfile::new("COSTCO");
        profile.record_category_usage("Groceries");
        profile.set_default_category("Shopping");

        let suggestion = profile.suggestion().unwrap();
        assert_eq!(suggestion.category, "Shopping");
        assert_eq!(suggestion.confidence, PINNED_CONFIDENCE);

        profile.clear_default_category();
        assert_eq!(profile.suggestion().unwrap().category, "Groceries");
    }

    #[test]
    fn test_empty_profile_has_no_suggestion() {
        assert!(MerchantProfile::new("NOBODY").suggestion().is_none());
    }

    #[test]
    fn test_tie_breaks_alphabetically() {
        let mut profile = MerchantProfile::new("TARGET");
        profile.record_category_usage("Shopping");
        profile.record_category_usage("Groceries");
        assert_eq!(profile.suggestion().unwrap().category, "Groceries");
    }

    #[test]
    fn test_similarity_score() {
        let profile = MerchantProfile::new("TRADER JOES");
        assert_eq!(profile.similarity_score("trader joes"), 1.0);
        assert_eq!(profile.similarity_score("TRADER JOES PORTLAND"), 0.8);
        assert!((profile.similarity_score("JOES PIZZA") - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(profile.similarity_score("SHELL"), 0.0);
        assert_eq!(profile.similarity_score(""), 0.0);
    }
}
