//! Strongly-typed ID wrappers for YNAB entities
//!
//! YNAB identifies budgets, accounts and categories by opaque strings
//! (UUIDs, or aliases such as `last-used` for budgets). Newtype wrappers
//! prevent mixing up IDs from different entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from the API's string form
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw string form used by the API
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Short form for terminal output (prefix + first 8 chars)
            pub fn short(&self) -> String {
                let head: String = self.0.chars().take(8).collect();
                format!("{}{}", $display_prefix, head)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_id!(BudgetId, "bud-");
define_id!(AccountId, "acc-");
define_id!(CategoryId, "cat-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = AccountId::new("a1b2c3d4-0000-1111-2222-333344445555");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a1b2c3d4-0000-1111-2222-333344445555\"");

        let parsed: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_short_display() {
        let id = CategoryId::new("0123456789abcdef");
        assert_eq!(id.short(), "cat-01234567");
        assert_eq!(id.to_string(), "0123456789abcdef");

        let alias = BudgetId::new("last-used");
        assert_eq!(alias.short(), "bud-last-use");
    }
}
