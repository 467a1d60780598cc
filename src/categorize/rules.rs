//! Rule tables for categorization
//!
//! The built-in table is ordered: the first matching rule wins, so specific
//! merchants sit above the generic keywords they contain ("UBER EATS" above
//! "UBER"). Money-movement rules (payments, transfers) sit above every
//! merchant, so "VENMO TRANSFER UBER EATS" is a Transfer. User rules compile
//! into the same `CompiledRule` shape.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::error::SpendwiseError;
use crate::models::{CategoryRule, RuleMatch};

use super::merchant::{clean_description, extract_merchant_pattern};

/// (name, pattern, category, confidence), highest priority first.
/// Patterns are case-insensitive regexes matched against the cleaned
/// description.
const BUILTIN_RULE_TABLE: &[(&str, &str, &str, f64)] = &[
    ("Payroll", r"\b(PAYROLL|DIRECT DEP(OSIT)?|SALARY)\b", "Income", 0.9),
    ("Interest", r"\bINTEREST (PAID|EARNED|PAYMENT)\b", "Income", 0.85),
    ("ATM", r"\bATM\b|CASH WITHDRAWAL", "Cash & ATM", 0.95),
    ("Card payment", r"\b(CREDIT CARD|CARD) PAYMENT\b|\bAUTOPAY\b", "Transfer", 0.8),
    ("Bank transfer", r"\b(TRANSFER|XFER|ZELLE|VENMO|WIRE)\b", "Transfer", 0.85),
    (
        "Bank fee",
        r"\b(OVERDRAFT|NSF|(MONTHLY )?(SERVICE|MAINTENANCE) FEE|FOREIGN TRANSACTION FEE)\b",
        "Fees",
        0.9,
    ),
    ("Uber Eats", r"\bUBER\s*EATS\b", "Food & Dining", 0.95),
    ("Food delivery", r"DOORDASH|GRUBHUB|POSTMATES|DELIVEROO|JUST EAT", "Food & Dining", 0.9),
    ("Rideshare", r"\b(UBER|LYFT)\b", "Transportation", 0.9),
    ("Transit", r"\b(MTA|TFL|BART|TRANSIT|PARKING|TOLL)\b", "Transportation", 0.8),
    (
        "Fuel",
        r"\b(SHELL|CHEVRON|EXXON|MOBIL|BP|TEXACO|ARCO|SUNOCO|VALERO)\b|GAS STATION",
        "Fuel",
        0.85,
    ),
    (
        "Airline",
        r"\bAIRLINES?\b|\bAIRWAYS\b|SOUTHWEST|RYANAIR|EASYJET|JETBLUE",
        "Travel",
        0.85,
    ),
    ("Lodging", r"AIRBNB|MARRIOTT|HILTON|HYATT|\bHOTEL|BOOKING\.COM|EXPEDIA", "Travel", 0.85),
    (
        "Streaming",
        r"NETFLIX|SPOTIFY|HULU|DISNEY\s*PLUS|HBO|YOUTUBE PREMIUM|APPLE\.COM/BILL|PRIME VIDEO",
        "Subscriptions",
        0.9,
    ),
    (
        "Groceries",
        r"WHOLE\s*FOODS|TRADER JOE|KROGER|SAFEWAY|\bALDI\b|\bLIDL\b|PUBLIX|WEGMANS|TESCO|SAINSBURY|GROCERY|SUPERMARKET",
        "Groceries",
        0.9,
    ),
    (
        "Restaurants",
        r"STARBUCKS|MCDONALD|CHIPOTLE|DUNKIN|RESTAURANT|\bCAFE\b|COFFEE|PIZZA|BURGER|\bGRILL\b",
        "Food & Dining",
        0.8,
    ),
    ("Pharmacy", r"\bCVS\b|WALGREENS|RITE AID|PHARMACY", "Health & Pharmacy", 0.85),
    (
        "Utilities",
        r"ELECTRIC|\bPOWER\b|\bWATER\b|COMCAST|XFINITY|VERIZON|AT&T|T-MOBILE|INTERNET|PG&E",
        "Utilities",
        0.85,
    ),
    ("Insurance", r"INSURANCE|GEICO|STATE FARM|PROGRESSIVE|ALLSTATE", "Insurance", 0.9),
    ("Housing", r"\bRENT\b|MORTGAGE|PROPERTY MGMT|LEASING|\bHOA\b", "Housing", 0.85),
    (
        "Shopping",
        r"AMAZON|\bAMZN\b|\bTARGET\b|WALMART|EBAY|ETSY|BEST BUY|IKEA",
        "Shopping",
        0.75,
    ),
];

/// How a compiled rule tests text
#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    Exact(String),
    Regex(Regex),
}

/// A rule ready to test descriptions
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub category: String,
    pub confidence: f64,
    matcher: Matcher,
}

impl CompiledRule {
    /// Compile a user-defined rule
    pub fn from_user_rule(rule: &CategoryRule) -> Result<Self, SpendwiseError> {
        let pattern = rule.pattern.trim();
        let matcher = match rule.match_kind {
            RuleMatch::Contains => Matcher::Contains(pattern.to_uppercase()),
            RuleMatch::Exact => Matcher::Exact(pattern.to_uppercase()),
            RuleMatch::Regex => Matcher::Regex(case_insensitive(pattern).map_err(|e| {
                SpendwiseError::Categorization(format!(
                    "Rule '{}' has an invalid pattern: {}",
                    rule.name, e
                ))
            })?),
        };

        Ok(Self {
            name: rule.name.clone(),
            category: rule.category.clone(),
            confidence: rule.confidence.clamp(0.0, 1.0),
            matcher,
        })
    }

    /// Test a description
    ///
    /// Substring and regex rules look at both the raw (uppercased) and the
    /// cleaned description; exact rules compare against the whole description
    /// or the merchant pattern.
    pub fn matches(&self, description: &str) -> bool {
        let raw = description.trim().to_uppercase();
        match &self.matcher {
            Matcher::Contains(needle) => {
                raw.contains(needle.as_str()) || clean_description(description).contains(needle.as_str())
            }
            Matcher::Exact(expected) => {
                raw == *expected || extract_merchant_pattern(description) == *expected
            }
            Matcher::Regex(re) => re.is_match(&raw) || re.is_match(&clean_description(description)),
        }
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

static BUILTIN_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    BUILTIN_RULE_TABLE
        .iter()
        .filter_map(|(name, pattern, category, confidence)| {
            match case_insensitive(pattern) {
                Ok(re) => Some(CompiledRule {
                    name: (*name).to_string(),
                    category: (*category).to_string(),
                    confidence: *confidence,
                    matcher: Matcher::Regex(re),
                }),
                Err(e) => {
                    warn!(rule = *name, error = %e, "skipping built-in rule");
                    None
                }
            }
        })
        .collect()
});

/// The built-in rules, in priority order
pub fn builtin_rules() -> &'static [CompiledRule] {
    &BUILTIN_RULES
}

/// First built-in rule matching a description
pub fn match_builtin(description: &str) -> Option<&'static CompiledRule> {
    builtin_rules().iter().find(|rule| rule.matches(description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_category(description: &str) -> Option<&'static str> {
        match_builtin(description).map(|r| r.category.as_str())
    }

    #[test]
    fn test_every_builtin_pattern_compiles() {
        assert_eq!(builtin_rules().len(), BUILTIN_RULE_TABLE.len());
    }

    #[test]
    fn test_money_movement_outranks_merchants() {
        assert_eq!(builtin_category("VENMO TRANSFER UBER EATS"), Some("Transfer"));
        assert_eq!(builtin_category("AMAZON CARD PAYMENT THANK YOU"), Some("Transfer"));
    }

    #[test]
    fn test_uber_eats_before_uber() {
        assert_eq!(builtin_category("UBER EATS 8005928996"), Some("Food & Dining"));
        assert_eq!(builtin_category("Uber *Eats"), Some("Food & Dining"));
        assert_eq!(builtin_category("UBER *TRIP HELP.UBER.COM"), Some("Transportation"));

        let names: Vec<_> = builtin_rules().iter().map(|r| r.name.as_str()).collect();
        let eats = names.iter().position(|n| *n == "Uber Eats").unwrap();
        let rideshare = names.iter().position(|n| *n == "Rideshare").unwrap();
        assert!(eats < rideshare);
    }

    #[test]
    fn test_common_merchants() {
        assert_eq!(builtin_category("WHOLEFOODS MKT #10234"), Some("Groceries"));
        assert_eq!(builtin_category("NETFLIX.COM 866-579-7172"), Some("Subscriptions"));
        assert_eq!(builtin_category("ATM WITHDRAWAL 0042 MAIN ST"), Some("Cash & ATM"));
        assert_eq!(builtin_category("ACME CORP PAYROLL PPD"), Some("Income"));
        assert_eq!(builtin_category("ZELLE TO JANE DOE"), Some("Transfer"));
        assert_eq!(builtin_category("SHELL OIL 57444"), Some("Fuel"));
        assert_eq!(builtin_category("CVS/PHARMACY #02211"), Some("Health & Pharmacy"));
        assert_eq!(builtin_category("GEICO *AUTO"), Some("Insurance"));
        assert_eq!(builtin_category("DELTA AIRLINES 0062"), Some("Travel"));
        assert_eq!(builtin_category("BLUE BOTTLE COFFEE"), Some("Food & Dining"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(builtin_category("ZQXJ HOLDINGS"), None);
        assert_eq!(builtin_category(""), None);
    }

    #[test]
    fn test_user_rule_kinds() {
        let contains = CompiledRule::from_user_rule(&CategoryRule::new(
            "Gym",
            "planet fitness",
            RuleMatch::Contains,
            "Health",
        ))
        .unwrap();
        assert!(contains.matches("PLANET FITNESS 0099 CLUB"));
        assert!(!contains.matches("PLANET HOLLYWOOD"));

        let exact = CompiledRule::from_user_rule(&CategoryRule::new(
            "Landlord",
            "ACME PROPERTIES",
            RuleMatch::Exact,
            "Housing",
        ))
        .unwrap();
        assert!(exact.matches("POS ACME PROPERTIES 0001"));
        assert!(!exact.matches("ACME PROPERTIES LLC"));

        let regex = CompiledRule::from_user_rule(&CategoryRule::new(
            "Kids",
            r"^(lego|toys ?r ?us)",
            RuleMatch::Regex,
            "Kids",
        ))
        .unwrap();
        assert!(regex.matches("Lego Store 44"));
        assert!(!regex.matches("BUY LEGO"));
    }

    #[test]
    fn test_bad_user_regex_is_categorization_error() {
        let mut rule = CategoryRule::new("Bad", "x", RuleMatch::Regex, "Misc");
        rule.pattern = "(".into();
        assert!(matches!(
            CompiledRule::from_user_rule(&rule),
            Err(SpendwiseError::Categorization(_))
        ));
    }
}
