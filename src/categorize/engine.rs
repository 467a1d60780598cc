//! The categorizer
//!
//! Decides a category for a description by trying, in order: user rules
//! (by priority), the built-in rule table, the user's merchant history, and
//! finally the "Uncategorized" fallback with zero confidence.

use tracing::debug;

use crate::config::CategorizationSettings;
use crate::error::SpendwiseError;
use crate::models::{
    Categorization, CategorizationSource, CategoryRule, HistorySuggestion, MerchantProfile,
    UNCATEGORIZED,
};

use super::merchant::extract_merchant_pattern;
use super::rules::{match_builtin, CompiledRule};

/// Minimum pattern similarity for a fuzzy history match
const FUZZY_HISTORY_MIN_SIMILARITY: f64 = 0.6;

/// The outcome of categorizing one description
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    pub category: String,
    pub source: CategorizationSource,
    pub confidence: f64,
    /// Name of the rule that matched, for rule sources
    pub rule: Option<String>,
    /// Merchant pattern extracted from the description
    pub merchant: String,
}

impl CategoryMatch {
    fn uncategorized(merchant: String) -> Self {
        Self {
            category: UNCATEGORIZED.to_string(),
            source: CategorizationSource::None,
            confidence: 0.0,
            rule: None,
            merchant,
        }
    }

    fn from_rule(rule: &CompiledRule, source: CategorizationSource, merchant: String) -> Self {
        Self {
            category: rule.category.clone(),
            source,
            confidence: rule.confidence,
            rule: Some(rule.name.clone()),
            merchant,
        }
    }

    pub fn is_categorized(&self) -> bool {
        self.source != CategorizationSource::None
    }

    /// The metadata stored on the transaction
    pub fn categorization(&self) -> Categorization {
        Categorization {
            source: self.source,
            confidence: self.confidence,
            rule: self.rule.clone(),
        }
    }
}

/// Rule- and history-based categorizer
#[derive(Debug, Clone)]
pub struct Categorizer {
    user_rules: Vec<CompiledRule>,
    use_builtin_rules: bool,
    history_min_confidence: f64,
}

impl Categorizer {
    /// Build a categorizer from stored user rules
    ///
    /// Disabled rules are skipped. Rules run in ascending priority, ties in
    /// the order given.
    pub fn new(
        rules: &[CategoryRule],
        settings: &CategorizationSettings,
    ) -> Result<Self, SpendwiseError> {
        let mut enabled: Vec<&CategoryRule> = rules.iter().filter(|r| r.enabled).collect();
        enabled.sort_by_key(|r| r.priority);

        let user_rules = enabled
            .into_iter()
            .map(CompiledRule::from_user_rule)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            user_rules,
            use_builtin_rules: settings.use_builtin_rules,
            history_min_confidence: settings.history_min_confidence,
        })
    }

    /// A categorizer with no user rules and default settings
    pub fn builtin() -> Self {
        let settings = CategorizationSettings::default();
        Self {
            user_rules: Vec::new(),
            use_builtin_rules: settings.use_builtin_rules,
            history_min_confidence: settings.history_min_confidence,
        }
    }

    /// Categorize a description
    pub fn categorize(&self, description: &str, history: &[MerchantProfile]) -> CategoryMatch {
        let merchant = extract_merchant_pattern(description);

        if let Some(rule) = self.user_rules.iter().find(|r| r.matches(description)) {
            debug!(rule = %rule.name, category = %rule.category, "user rule matched");
            return CategoryMatch::from_rule(rule, CategorizationSource::UserRule, merchant);
        }

        if self.use_builtin_rules {
            if let Some(rule) = match_builtin(description) {
                debug!(rule = %rule.name, category = %rule.category, "built-in rule matched");
                return CategoryMatch::from_rule(rule, CategorizationSource::Rule, merchant);
            }
        }

        if let Some(suggestion) = history_lookup(&merchant, history) {
            if suggestion.confidence >= self.history_min_confidence {
                debug!(merchant = %merchant, category = %suggestion.category, "history matched");
                return CategoryMatch {
                    category: suggestion.category,
                    source: CategorizationSource::History,
                    confidence: suggestion.confidence,
                    rule: None,
                    merchant,
                };
            }
        }

        CategoryMatch::uncategorized(merchant)
    }
}

/// Look up a merchant pattern in the learned history
///
/// An exact pattern match is used as is; otherwise the most similar profile
/// is used with its confidence scaled by the similarity.
pub fn history_lookup(merchant: &str, history: &[MerchantProfile]) -> Option<HistorySuggestion> {
    if merchant.trim().is_empty() {
        return None;
    }

    if let Some(profile) = history
        .iter()
        .find(|p| p.pattern.eq_ignore_ascii_case(merchant.trim()))
    {
        if let Some(suggestion) = profile.suggestion() {
            return Some(suggestion);
        }
    }

    let mut best: Option<(f64, HistorySuggestion)> = None;
    for profile in history {
        let similarity = profile.similarity_score(merchant);
        if similarity < FUZZY_HISTORY_MIN_SIMILARITY {
            continue;
        }
        if best.as_ref().map(|(s, _)| similarity > *s).unwrap_or(true) {
            if let Some(suggestion) = profile.suggestion() {
                best = Some((similarity, suggestion));
            }
        }
    }

    best.map(|(similarity, suggestion)| HistorySuggestion {
        category: suggestion.category,
        confidence: suggestion.confidence * similarity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleMatch;

    fn profile(pattern: &str, category: &str, uses: u32) -> MerchantProfile {
        let mut p = MerchantProfile::new(pattern);
        for _ in 0..uses {
            p.record_category_usage(category);
        }
        p
    }

    #[test]
    fn test_builtin_rule() {
        let result = Categorizer::builtin().categorize("UBER EATS 123", &[]);
        assert_eq!(result.category, "Food & Dining");
        assert_eq!(result.source, CategorizationSource::Rule);
        assert_eq!(result.rule.as_deref(), Some("Uber Eats"));
        assert_eq!(result.merchant, "UBER EATS");
    }

    #[test]
    fn test_user_rules_take_precedence_and_respect_priority() {
        let rules = vec![
            CategoryRule::new("Work rides", "UBER", RuleMatch::Contains, "Business Travel")
                .with_priority(5),
            CategoryRule::new("Team lunch", "UBER EATS", RuleMatch::Contains, "Team Meals")
                .with_priority(1),
        ];
        let categorizer = Categorizer::new(&rules, &CategorizationSettings::default()).unwrap();

        let eats = categorizer.categorize("UBER EATS", &[]);
        assert_eq!(eats.category, "Team Meals");
        assert_eq!(eats.source, CategorizationSource::UserRule);

        let trip = categorizer.categorize("UBER TRIP", &[]);
        assert_eq!(trip.category, "Business Travel");
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let mut rule = CategoryRule::new("Off", "NETFLIX", RuleMatch::Contains, "Fun");
        rule.enabled = false;
        let categorizer = Categorizer::new(&[rule], &CategorizationSettings::default()).unwrap();
        assert_eq!(categorizer.categorize("NETFLIX.COM", &[]).category, "Subscriptions");
    }

    #[test]
    fn test_history_fallback() {
        let history = vec![profile("CORNER DELI", "Food & Dining", 3)];
        let result = Categorizer::builtin().categorize("POS CORNER DELI 0042", &history);
        assert_eq!(result.source, CategorizationSource::History);
        assert_eq!(result.category, "Food & Dining");
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_fuzzy_history_scaled_confidence() {
        let history = vec![profile("CORNER DELI", "Food & Dining", 2)];
        let result = Categorizer::builtin().categorize("CORNER DELI BROOKLYN", &history);
        assert_eq!(result.source, CategorizationSource::History);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_low_confidence_history_ignored() {
        let mut split = MerchantProfile::new("MIXED SHOP");
        split.record_category_usage("A");
        split.record_category_usage("B");
        split.record_category_usage("C");
        let result = Categorizer::builtin().categorize("MIXED SHOP", &[split]);
        assert!(!result.is_categorized());
    }

    #[test]
    fn test_uncategorized_fallback() {
        let result = Categorizer::builtin().categorize("ZQXJ HOLDINGS", &[]);
        assert_eq!(result.category, UNCATEGORIZED);
        assert_eq!(result.confidence, 0.0);
        assert!(result.rule.is_none());
        assert!(!result.is_categorized());
    }

    #[test]
    fn test_builtin_rules_can_be_disabled() {
        let settings = CategorizationSettings {
            use_builtin_rules: false,
            ..CategorizationSettings::default()
        };
        let categorizer = Categorizer::new(&[], &settings).unwrap();
        assert!(!categorizer.categorize("NETFLIX", &[]).is_categorized());
    }
}
