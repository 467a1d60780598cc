//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generates an ID newtype with a short display prefix (e.g. `txn-1a2b3c4d`)
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// The 8-character short form shown in listings
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }

            /// Check whether a user-typed identifier refers to this ID.
            ///
            /// Accepts the full UUID, the display form, or the bare short form.
            pub fn matches(&self, input: &str) -> bool {
                let input = input.trim().to_lowercase();
                let input = input.strip_prefix($display_prefix).unwrap_or(&input);
                if input.len() < 4 {
                    return false;
                }
                let full = self.0.to_string();
                full == input || self.0.simple().to_string().starts_with(input) || full.starts_with(input)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.short())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(AccountId, "acc-");
define_id!(TransactionId, "txn-");
define_id!(CategoryId, "cat-");
define_id!(CategoryGroupId, "grp-");
define_id!(BudgetId, "bud-");
define_id!(GoalId, "goal-");
define_id!(AlertId, "alr-");
define_id!(RuleId, "rule-");
