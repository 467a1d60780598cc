//! Merchant-pattern extraction and rule-based categorization

pub mod engine;
pub mod merchant;
pub mod rules;

pub use engine::{history_lookup, CategoryMatch, Categorizer};
pub use merchant::{clean_description, extract_merchant_pattern};
pub use rules::{builtin_rules, match_builtin, CompiledRule};
