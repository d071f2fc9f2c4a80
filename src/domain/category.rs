//! Category slug: the competitive scope of a boost.
//!
//! Only one boost may be active at a time within a category, so the slug is
//! the contention domain key for the whole scheduler. Slugs are normalized
//! (trimmed, lowercased) so `"Restaurants"` and `"restaurants"` compete for
//! the same slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Normalized category identifier.
///
/// Construct via [`CategorySlug::new`] or serde (which goes through the same
/// validation); the inner string is guaranteed non-empty, trimmed, and
/// lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct CategorySlug(String);

impl CategorySlug {
    /// Normalizes and validates a raw category string.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the string is empty after
    /// trimming.
    pub fn new(raw: &str) -> Result<Self, GatewayError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "category must not be empty".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CategorySlug {
    type Error = GatewayError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<CategorySlug> for String {
    fn from(slug: CategorySlug) -> Self {
        slug.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let Ok(slug) = CategorySlug::new("  Restaurants ") else {
            panic!("valid slug rejected");
        };
        assert_eq!(slug.as_str(), "restaurants");
    }

    #[test]
    fn equal_after_normalization() {
        let Ok(a) = CategorySlug::new("Plumbers") else {
            panic!("valid slug rejected");
        };
        let Ok(b) = CategorySlug::new("plumbers") else {
            panic!("valid slug rejected");
        };
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty() {
        assert!(CategorySlug::new("   ").is_err());
        assert!(CategorySlug::new("").is_err());
    }

    #[test]
    fn serde_round_trip_normalizes() {
        let deserialized: Result<CategorySlug, _> = serde_json::from_str("\"Bakeries\"");
        let Ok(slug) = deserialized else {
            panic!("deserialization failed");
        };
        assert_eq!(slug.as_str(), "bakeries");
        let json = serde_json::to_string(&slug).ok();
        assert_eq!(json.as_deref(), Some("\"bakeries\""));
    }
}
