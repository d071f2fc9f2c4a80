//! Per-connection subscription manager.
//!
//! Tracks which categories a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::CategorySlug;

/// Manages the category subscriptions of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed categories. Ignored while `subscribe_all` is set.
    categories: HashSet<CategorySlug>,
    /// Whether the client subscribes to every category (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds categories to the subscription set. `wildcard` enables the
    /// match-everything mode.
    pub fn subscribe(&mut self, categories: &[CategorySlug], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for category in categories {
            self.categories.insert(category.clone());
        }
    }

    /// Removes categories from the subscription set.
    pub fn unsubscribe(&mut self, categories: &[CategorySlug]) {
        for category in categories {
            self.categories.remove(category);
        }
    }

    /// Returns `true` if events for the given category should be forwarded.
    #[must_use]
    pub fn matches(&self, category: &CategorySlug) -> bool {
        self.subscribe_all || self.categories.contains(category)
    }

    /// Returns the number of explicitly subscribed categories.
    #[must_use]
    pub fn count(&self) -> usize {
        self.categories.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn slug(raw: &str) -> CategorySlug {
        let Ok(slug) = CategorySlug::new(raw) else {
            panic!("valid slug rejected");
        };
        slug
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&slug("restaurants")));
    }

    #[test]
    fn subscribe_specific_category() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[slug("restaurants")], false);
        assert!(mgr.matches(&slug("restaurants")));
        assert!(!mgr.matches(&slug("plumbers")));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(&slug("restaurants")));
        assert!(mgr.matches(&slug("bakeries")));
    }

    #[test]
    fn unsubscribe_removes_category() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[slug("restaurants")], false);
        assert!(mgr.matches(&slug("restaurants")));
        mgr.unsubscribe(&[slug("restaurants")]);
        assert!(!mgr.matches(&slug("restaurants")));
    }

    #[test]
    fn count_tracks_explicit_subscriptions() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[slug("restaurants"), slug("plumbers")], false);
        assert_eq!(mgr.count(), 2);
    }
}
