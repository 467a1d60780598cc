//! Categorization service
//!
//! Runs the categorizer over stored transactions, records manual
//! categorizations into merchant history, and manages user rules.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::categorize::{extract_merchant_pattern, CategoryMatch, Categorizer};
use crate::config::CategorizationSettings;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{
    normalize_category_name, Categorization, CategorizationSource, CategoryRule, RuleMatch,
    Transaction, TransactionId,
};
use crate::storage::Storage;

/// Outcome of a categorization run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizationSummary {
    /// Transactions looked at
    pub examined: usize,
    /// Transactions that received a category
    pub categorized: usize,
    /// Transactions nothing matched
    pub unmatched: usize,
    /// Categorized count per source
    pub by_source: BTreeMap<String, usize>,
}

/// Input for a new user rule
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub pattern: String,
    pub match_kind: RuleMatch,
    pub category: String,
    pub priority: i32,
}

/// Service for categorization
pub struct CategorizationService<'a> {
    storage: &'a Storage,
    settings: &'a CategorizationSettings,
}

impl<'a> CategorizationService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a CategorizationSettings) -> Self {
        Self { storage, settings }
    }

    /// A categorizer loaded with the stored user rules
    pub fn categorizer(&self) -> SpendwiseResult<Categorizer> {
        let rules = self.storage.rules.get_all()?;
        Categorizer::new(&rules, self.settings)
    }

    /// Categorize a description without touching storage
    pub fn suggest(&self, description: &str) -> SpendwiseResult<CategoryMatch> {
        let history = self.storage.merchants.get_all()?;
        Ok(self.categorizer()?.categorize(description, &history))
    }

    /// Categorize stored transactions
    ///
    /// Only uncategorized transactions are considered unless `force` is set.
    /// Manually categorized transactions are never overwritten, and an
    /// existing label is kept when nothing matches.
    pub fn run(&self, force: bool) -> SpendwiseResult<CategorizationSummary> {
        let categorizer = self.categorizer()?;
        let history = self.storage.merchants.get_all()?;
        let mut summary = CategorizationSummary::default();

        for mut txn in self.storage.transactions.get_all()? {
            if is_manual(&txn) || (!force && txn.is_categorized()) {
                continue;
            }
            summary.examined += 1;

            let result = categorizer.categorize(&txn.description, &history);
            txn.merchant = result.merchant.clone();

            if result.is_categorized() {
                *summary.by_source.entry(result.source.to_string()).or_default() += 1;
                summary.categorized += 1;
                txn.set_category(result.category.clone(), result.categorization());
            } else {
                summary.unmatched += 1;
            }
            self.storage.transactions.upsert(txn)?;
        }

        self.storage.transactions.save()?;
        info!(
            examined = summary.examined,
            categorized = summary.categorized,
            force,
            "categorization run finished"
        );
        Ok(summary)
    }

    /// Set a transaction's category by hand and learn from it
    ///
    /// The label must name an existing category; the stored spelling is used.
    pub fn assign(&self, id: TransactionId, category: &str) -> SpendwiseResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;

        let label = self.resolve_label(category)?;
        txn.set_category(label.clone(), Categorization::manual());
        if txn.merchant.is_empty() {
            txn.merchant = extract_merchant_pattern(&txn.description);
        }

        self.learn(&txn.merchant, &label)?;
        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        Ok(txn)
    }

    /// Count one use of `category` for a merchant pattern
    pub fn learn(&self, merchant: &str, category: &str) -> SpendwiseResult<()> {
        if merchant.trim().is_empty() {
            return Ok(());
        }
        let mut profile = self.storage.merchants.get_or_new(merchant)?;
        profile.record_category_usage(category);
        debug!(merchant, category, uses = profile.total_uses(), "learned category");
        self.storage.merchants.upsert(profile)?;
        self.storage.merchants.save()
    }

    /// Pin a category to a merchant, or clear the pin with `None`
    pub fn pin_merchant(&self, merchant: &str, category: Option<&str>) -> SpendwiseResult<()> {
        let pattern = extract_merchant_pattern(merchant);
        let mut profile = self.storage.merchants.get_or_new(&pattern)?;
        match category {
            Some(label) => profile.set_default_category(self.resolve_label(label)?),
            None => profile.clear_default_category(),
        }
        self.storage.merchants.upsert(profile)?;
        self.storage.merchants.save()
    }

    /// Add a user rule
    pub fn add_rule(&self, input: NewRule) -> SpendwiseResult<CategoryRule> {
        let category = self.canonical_label(&input.category)?;
        let rule = CategoryRule::new(input.name, input.pattern, input.match_kind, category)
            .with_priority(input.priority);
        rule.validate()
            .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

        if self
            .storage
            .rules
            .find(|r| r.name.eq_ignore_ascii_case(&rule.name))?
            .is_some()
        {
            return Err(SpendwiseError::Duplicate {
                entity_type: "Rule",
                identifier: rule.name.clone(),
            });
        }

        self.storage.rules.upsert(rule.clone())?;
        self.storage.rules.save()?;
        info!(rule = %rule.name, category = %rule.category, "added rule");
        Ok(rule)
    }

    /// User rules in evaluation order
    pub fn list_rules(&self) -> SpendwiseResult<Vec<CategoryRule>> {
        self.storage.rules.get_all()
    }

    /// Find a rule by name or id
    pub fn find_rule(&self, identifier: &str) -> SpendwiseResult<Option<CategoryRule>> {
        let identifier = identifier.trim();
        self.storage
            .rules
            .find(|r| r.name.eq_ignore_ascii_case(identifier) || r.id.matches(identifier))
    }

    /// Remove a rule by name or id
    pub fn remove_rule(&self, identifier: &str) -> SpendwiseResult<CategoryRule> {
        let rule = self
            .find_rule(identifier)?
            .ok_or_else(|| SpendwiseError::rule_not_found(identifier))?;
        self.storage.rules.delete(rule.id)?;
        self.storage.rules.save()?;
        Ok(rule)
    }

    /// Enable or disable a rule
    pub fn set_rule_enabled(&self, identifier: &str, enabled: bool) -> SpendwiseResult<CategoryRule> {
        let mut rule = self
            .find_rule(identifier)?
            .ok_or_else(|| SpendwiseError::rule_not_found(identifier))?;
        rule.enabled = enabled;
        self.storage.rules.upsert(rule.clone())?;
        self.storage.rules.save()?;
        Ok(rule)
    }

    /// Label of an existing category, in its stored spelling
    fn resolve_label(&self, label: &str) -> SpendwiseResult<String> {
        self.storage
            .categories
            .get_category_by_name(label)?
            .map(|c| c.name)
            .ok_or_else(|| SpendwiseError::category_not_found(label))
    }

    /// Stored spelling when the category exists, the normalized label otherwise
    fn canonical_label(&self, label: &str) -> SpendwiseResult<String> {
        Ok(match self.storage.categories.get_category_by_name(label)? {
            Some(category) => category.name,
            None => normalize_category_name(label),
        })
    }
}

fn is_manual(txn: &Transaction) -> bool {
    txn.categorization
        .as_ref()
        .map(|c| c.source == CategorizationSource::Manual)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendwisePaths;
    use crate::models::Money;
    use crate::storage::initialize_storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add_txn(storage: &Storage, description: &str) -> TransactionId {
        let txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            description,
            Money::from_cents(-1200),
            "USD",
        );
        let id = txn.id;
        storage.transactions.upsert(txn).unwrap();
        id
    }

    #[test]
    fn test_run_categorizes_uncategorized() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);
        let eats = add_txn(&storage, "UBER EATS 1234");
        let unknown = add_txn(&storage, "ZQXJ HOLDINGS");

        let summary = service.run(false).unwrap();
        assert_eq!(summary.examined, 2);
        assert_eq!(summary.categorized, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.by_source.get("rule"), Some(&1));

        let eats = storage.transactions.get(eats).unwrap().unwrap();
        assert_eq!(eats.category.as_deref(), Some("Food & Dining"));
        assert_eq!(eats.merchant, "UBER EATS");
        let unknown = storage.transactions.get(unknown).unwrap().unwrap();
        assert!(!unknown.is_categorized());
    }

    #[test]
    fn test_manual_assignment_teaches_history() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);
        let first = add_txn(&storage, "POS CORNER DELI 0042");

        let txn = service.assign(first, "food & dining").unwrap();
        assert_eq!(txn.category.as_deref(), Some("Food & Dining"));
        assert_eq!(txn.categorization.unwrap().source, CategorizationSource::Manual);

        let second = add_txn(&storage, "CORNER DELI 0099");
        service.run(false).unwrap();
        let second = storage.transactions.get(second).unwrap().unwrap();
        assert_eq!(second.category.as_deref(), Some("Food & Dining"));
        assert_eq!(second.categorization.unwrap().source, CategorizationSource::History);
    }

    #[test]
    fn test_assign_unknown_category_fails() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);
        let id = add_txn(&storage, "SOMETHING");
        assert!(service.assign(id, "Nonexistent").unwrap_err().is_not_found());
    }

    #[test]
    fn test_force_keeps_manual_labels() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);
        let id = add_txn(&storage, "NETFLIX.COM");
        service.assign(id, "Entertainment").unwrap();

        let summary = service.run(true).unwrap();
        assert_eq!(summary.examined, 0);
        let txn = storage.transactions.get(id).unwrap().unwrap();
        assert_eq!(txn.category.as_deref(), Some("Entertainment"));
    }

    #[test]
    fn test_rule_lifecycle() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);

        let rule = service
            .add_rule(NewRule {
                name: "Gym".into(),
                pattern: "planet fitness".into(),
                match_kind: RuleMatch::Contains,
                category: "<Health>".into(),
                priority: 0,
            })
            .unwrap();
        assert_eq!(rule.category, "Health");

        let duplicate = service.add_rule(NewRule {
            name: "gym".into(),
            pattern: "x".into(),
            match_kind: RuleMatch::Contains,
            category: "Health".into(),
            priority: 0,
        });
        assert!(matches!(duplicate, Err(SpendwiseError::Duplicate { .. })));

        let suggestion = service.suggest("PLANET FITNESS #12").unwrap();
        assert_eq!(suggestion.category, "Health");
        assert_eq!(suggestion.source, CategorizationSource::UserRule);
        assert_eq!(suggestion.rule.as_deref(), Some("Gym"));

        service.set_rule_enabled("Gym", false).unwrap();
        assert!(!service.suggest("PLANET FITNESS #12").unwrap().is_categorized());

        service.remove_rule("gym").unwrap();
        assert!(service.list_rules().unwrap().is_empty());
        assert!(service.remove_rule("gym").unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);
        let err = service
            .add_rule(NewRule {
                name: "Bad".into(),
                pattern: "(".into(),
                match_kind: RuleMatch::Regex,
                category: "Misc".into(),
                priority: 0,
            })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_pin_merchant() {
        let (_dir, storage) = create_test_storage();
        let settings = CategorizationSettings::default();
        let service = CategorizationService::new(&storage, &settings);
        service.pin_merchant("SQ BLUE DOOR 22", Some("Entertainment")).unwrap();

        let suggestion = service.suggest("BLUE DOOR").unwrap();
        assert_eq!(suggestion.category, "Entertainment");
        assert_eq!(suggestion.source, CategorizationSource::History);
    }
}
