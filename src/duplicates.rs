//! Duplicate transaction detection
//!
//! Pairs of transactions are compared on absolute amount, currency, date
//! distance and description similarity. Matching transactions are clustered
//! into groups seeded by the earliest unassigned transaction.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::DuplicateSettings;
use crate::models::{Money, Transaction};

/// How sure the detector is that a group holds duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateConfidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for DuplicateConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Transactions believed to be the same real-world payment
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// The seed first, then later matches in input order
    pub transactions: Vec<Transaction>,
    /// Weakest confidence of any member against the seed
    pub confidence: DuplicateConfidence,
}

impl DuplicateGroup {
    /// The transaction kept when resolving
    pub fn original(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Every member after the first
    pub fn extras(&self) -> &[Transaction] {
        self.transactions.get(1..).unwrap_or(&[])
    }
}

/// Result of a duplicate scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
    /// Members beyond the first, summed over groups
    pub total_duplicates: usize,
    /// Sum of |amount| of members beyond the first
    pub potential_savings: Money,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Lowercase, strip punctuation and collapse whitespace
pub fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity of the word sets of two descriptions
///
/// Two descriptions with no words at all count as identical.
pub fn description_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_description(a);
    let b = normalize_description(b);
    let words_a: std::collections::HashSet<&str> = a.split(' ').filter(|w| !w.is_empty()).collect();
    let words_b: std::collections::HashSet<&str> = b.split(' ').filter(|w| !w.is_empty()).collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    let shared = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    shared as f64 / union as f64
}

/// Pairwise duplicate detector
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    settings: DuplicateSettings,
}

impl DuplicateDetector {
    pub fn new(settings: DuplicateSettings) -> Self {
        Self { settings }
    }

    /// Compare two transactions
    ///
    /// Returns `None` for the same transaction, different currencies or
    /// different absolute amounts.
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Option<DuplicateConfidence> {
        if a.id == b.id
            || a.amount.abs() != b.amount.abs()
            || !a.currency.eq_ignore_ascii_case(&b.currency)
        {
            return None;
        }

        let days = (a.date - b.date).num_days().abs();
        if days == 0 && normalize_description(&a.description) == normalize_description(&b.description) {
            return Some(DuplicateConfidence::High);
        }

        let similarity = description_similarity(&a.description, &b.description);
        if days <= self.settings.medium_day_window && similarity > self.settings.medium_similarity {
            return Some(DuplicateConfidence::Medium);
        }
        if days <= self.settings.low_day_window && similarity > self.settings.low_similarity {
            return Some(DuplicateConfidence::Low);
        }
        None
    }

    /// Group duplicates in `transactions`
    ///
    /// Each transaction joins at most one group. Scanning the same input
    /// twice yields the same groups.
    pub fn detect(&self, transactions: &[Transaction]) -> DuplicateReport {
        let mut assigned = vec![false; transactions.len()];
        let mut report = DuplicateReport::default();

        for (i, seed) in transactions.iter().enumerate() {
            if assigned[i] {
                continue;
            }

            let mut members = vec![seed.clone()];
            let mut confidence = DuplicateConfidence::High;
            for (j, candidate) in transactions.iter().enumerate().skip(i + 1) {
                if assigned[j] {
                    continue;
                }
                if let Some(c) = self.compare(seed, candidate) {
                    assigned[j] = true;
                    confidence = confidence.min(c);
                    members.push(candidate.clone());
                }
            }

            if members.len() > 1 {
                assigned[i] = true;
                report.total_duplicates += members.len() - 1;
                report.potential_savings = report.potential_savings
                    + members[1..].iter().map(|t| t.amount.abs()).sum::<Money>();
                report.groups.push(DuplicateGroup {
                    transactions: members,
                    confidence,
                });
            }
        }

        debug!(
            scanned = transactions.len(),
            groups = report.groups.len(),
            duplicates = report.total_duplicates,
            "duplicate scan"
        );
        report
    }
}
