//! Per-category partitioned record store with fine-grained locking.
//!
//! [`BoostRegistry`] keeps one [`CategoryShard`] per category, each behind
//! its own [`tokio::sync::RwLock`]. The category is the contention domain:
//! every scheduler mutation holds exactly one shard write lock for its whole
//! read-modify-write, so two requests can never both observe a free slot,
//! while traffic for different categories proceeds concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::boost_record::BoostRecord;
use super::{BusinessId, CategorySlug};
use crate::error::GatewayError;

/// All boost records of one category.
///
/// Only reachable through the registry's per-shard lock; the methods here
/// assume the caller already holds it.
#[derive(Debug, Default)]
pub struct CategoryShard {
    records: HashMap<BusinessId, BoostRecord>,
}

impl CategoryShard {
    /// Returns the record for the given business, if registered here.
    #[must_use]
    pub fn get(&self, id: BusinessId) -> Option<&BoostRecord> {
        self.records.get(&id)
    }

    /// Returns a mutable record for the given business, if registered here.
    pub fn get_mut(&mut self, id: BusinessId) -> Option<&mut BoostRecord> {
        self.records.get_mut(&id)
    }

    /// Iterates over all records in this shard.
    pub fn records(&self) -> impl Iterator<Item = &BoostRecord> {
        self.records.values()
    }

    /// Iterates mutably over all records in this shard.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut BoostRecord> {
        self.records.values_mut()
    }

    /// The record currently holding an unexpired featured window, excluding
    /// `exclude` when given.
    ///
    /// The exclusivity invariant makes this unique; with corrupted state the
    /// first match wins.
    #[must_use]
    pub fn occupant(
        &self,
        now: DateTime<Utc>,
        exclude: Option<BusinessId>,
    ) -> Option<&BoostRecord> {
        self.records
            .values()
            .find(|r| Some(r.business_id) != exclude && r.is_boosted(now))
    }

    /// Latest `ends_at` any record in this category has committed to, over
    /// active and queued windows alike. New queued windows start here.
    #[must_use]
    pub fn latest_committed_end(&self) -> Option<DateTime<Utc>> {
        self.records
            .values()
            .filter_map(BoostRecord::latest_committed_end)
            .max()
    }

    /// 0-based position of the business's earliest pending request among all
    /// pending requests in this category, ordered by scheduled start (ties
    /// broken by arrival). `None` when the business has nothing pending.
    #[must_use]
    pub fn queue_position(&self, id: BusinessId) -> Option<usize> {
        let own_head = self.records.get(&id)?.queue.front()?;
        let own_key = (own_head.window.starts_at, own_head.queued_at);
        let ahead = self
            .records
            .values()
            .flat_map(|r| r.queue.iter())
            .filter(|q| (q.window.starts_at, q.queued_at) < own_key)
            .count();
        Some(ahead)
    }

    /// Number of records in this shard.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if this shard has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: BoostRecord) {
        self.records.insert(record.business_id, record);
    }

    fn remove(&mut self, id: BusinessId) -> Option<BoostRecord> {
        self.records.remove(&id)
    }
}

/// Central store for all boost records, partitioned by category.
///
/// # Concurrency
///
/// - Reads and writes to different categories are concurrent.
/// - Writes within one category are serialized by the shard lock.
/// - The outer map lock is only held while resolving a slug to its shard.
#[derive(Debug, Default)]
pub struct BoostRegistry {
    shards: RwLock<HashMap<CategorySlug, Arc<RwLock<CategoryShard>>>>,
    index: RwLock<HashMap<BusinessId, CategorySlug>>,
}

impl BoostRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new record, creating its category shard on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AlreadyRegistered`] if a record with the same
    /// business ID exists in any category.
    pub async fn register(&self, record: BoostRecord) -> Result<(), GatewayError> {
        let id = record.business_id;
        let category = record.category.clone();

        let mut index = self.index.write().await;
        if index.contains_key(&id) {
            return Err(GatewayError::AlreadyRegistered(*id.as_uuid()));
        }

        let shard = {
            let mut shards = self.shards.write().await;
            Arc::clone(shards.entry(category.clone()).or_default())
        };
        shard.write().await.insert(record);
        index.insert(id, category);
        Ok(())
    }

    /// Inserts or replaces a record without uniqueness checks.
    ///
    /// Used when restoring persisted snapshots at startup.
    pub async fn upsert(&self, record: BoostRecord) {
        let id = record.business_id;
        let category = record.category.clone();

        let mut index = self.index.write().await;
        let shard = {
            let mut shards = self.shards.write().await;
            Arc::clone(shards.entry(category.clone()).or_default())
        };
        shard.write().await.insert(record);
        index.insert(id, category);
    }

    /// Returns the shard for a category behind its per-category lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CategoryNotFound`] if no business is
    /// registered under the category.
    pub async fn shard(
        &self,
        category: &CategorySlug,
    ) -> Result<Arc<RwLock<CategoryShard>>, GatewayError> {
        let shards = self.shards.read().await;
        shards
            .get(category)
            .cloned()
            .ok_or_else(|| GatewayError::CategoryNotFound(category.to_string()))
    }

    /// Resolves a business ID to its category and shard.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is not
    /// registered.
    pub async fn locate(
        &self,
        id: BusinessId,
    ) -> Result<(CategorySlug, Arc<RwLock<CategoryShard>>), GatewayError> {
        let category = {
            let index = self.index.read().await;
            index
                .get(&id)
                .cloned()
                .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?
        };
        let shard = self.shard(&category).await?;
        Ok((category, shard))
    }

    /// Returns every category with at least one registered record.
    pub async fn categories(&self) -> Vec<CategorySlug> {
        self.shards.read().await.keys().cloned().collect()
    }

    /// Returns a point-in-time clone of one record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is not
    /// registered.
    pub async fn snapshot(&self, id: BusinessId) -> Result<BoostRecord, GatewayError> {
        let (_, shard) = self.locate(id).await?;
        let shard = shard.read().await;
        shard
            .get(id)
            .cloned()
            .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))
    }

    /// Returns point-in-time clones of every record across all categories.
    pub async fn all_records(&self) -> Vec<BoostRecord> {
        let shards: Vec<Arc<RwLock<CategoryShard>>> =
            self.shards.read().await.values().cloned().collect();
        let mut records = Vec::new();
        for shard in shards {
            let shard = shard.read().await;
            records.extend(shard.records().cloned());
        }
        records
    }

    /// Unregisters a record, returning it. Empty shards are dropped so the
    /// sweep never scans dead categories.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is not
    /// registered.
    pub async fn remove(&self, id: BusinessId) -> Result<BoostRecord, GatewayError> {
        let mut index = self.index.write().await;
        let category = index
            .get(&id)
            .cloned()
            .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;

        let mut shards = self.shards.write().await;
        let shard = shards
            .get(&category)
            .cloned()
            .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;

        let mut guard = shard.write().await;
        let record = guard
            .remove(id)
            .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
        if guard.is_empty() {
            shards.remove(&category);
        }
        drop(guard);
        index.remove(&id);
        Ok(record)
    }

    /// Total number of registered records.
    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    /// Returns `true` if no record is registered.
    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::boost_record::{BoostWindow, QueuedBoost};
    use chrono::Duration;

    fn slug(raw: &str) -> CategorySlug {
        let Ok(slug) = CategorySlug::new(raw) else {
            panic!("valid slug rejected");
        };
        slug
    }

    fn record_in(category: &str) -> BoostRecord {
        BoostRecord::new(
            BusinessId::new(),
            "Test Business".to_string(),
            slug(category),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn register_and_snapshot() {
        let registry = BoostRegistry::new();
        let record = record_in("restaurants");
        let id = record.business_id;

        let result = registry.register(record).await;
        assert!(result.is_ok());

        let snap = registry.snapshot(id).await;
        let Ok(snap) = snap else {
            panic!("snapshot failed");
        };
        assert_eq!(snap.business_id, id);
        assert!(snap.active.is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let registry = BoostRegistry::new();
        let record = record_in("restaurants");
        let duplicate = record.clone();

        assert!(registry.register(record).await.is_ok());
        assert!(registry.register(duplicate).await.is_err());
    }

    #[tokio::test]
    async fn locate_unknown_business_fails() {
        let registry = BoostRegistry::new();
        assert!(registry.locate(BusinessId::new()).await.is_err());
    }

    #[tokio::test]
    async fn unknown_category_fails() {
        let registry = BoostRegistry::new();
        assert!(registry.shard(&slug("ghost-town")).await.is_err());
    }

    #[tokio::test]
    async fn occupant_skips_expired_and_excluded() {
        let registry = BoostRegistry::new();
        let now = Utc::now();

        let mut expired = record_in("restaurants");
        expired.activate(BoostWindow::starting_at(
            now - Duration::hours(48),
            Duration::hours(24),
        ));
        let mut live = record_in("restaurants");
        live.activate(BoostWindow::starting_at(now, Duration::hours(24)));
        let live_id = live.business_id;

        let _ = registry.register(expired).await;
        let _ = registry.register(live).await;

        let shard = registry.shard(&slug("restaurants")).await;
        let Ok(shard) = shard else {
            panic!("shard lookup failed");
        };
        let guard = shard.read().await;

        let found = guard.occupant(now, None).map(|r| r.business_id);
        assert_eq!(found, Some(live_id));
        assert!(guard.occupant(now, Some(live_id)).is_none());
    }

    #[tokio::test]
    async fn queue_position_orders_across_records() {
        let registry = BoostRegistry::new();
        let now = Utc::now();
        let first_window = BoostWindow::starting_at(now + Duration::hours(24), Duration::hours(24));
        let second_window = BoostWindow::starting_at(first_window.ends_at, Duration::hours(24));

        let mut first = record_in("restaurants");
        first.enqueue(QueuedBoost {
            requested_by: first.business_id,
            window: first_window,
            queued_at: now,
        });
        let first_id = first.business_id;

        let mut second = record_in("restaurants");
        second.enqueue(QueuedBoost {
            requested_by: second.business_id,
            window: second_window,
            queued_at: now + Duration::minutes(5),
        });
        let second_id = second.business_id;

        let _ = registry.register(first).await;
        let _ = registry.register(second).await;

        let shard = registry.shard(&slug("restaurants")).await;
        let Ok(shard) = shard else {
            panic!("shard lookup failed");
        };
        let guard = shard.read().await;
        assert_eq!(guard.queue_position(first_id), Some(0));
        assert_eq!(guard.queue_position(second_id), Some(1));
    }

    #[tokio::test]
    async fn remove_drops_empty_shard() {
        let registry = BoostRegistry::new();
        let record = record_in("bakeries");
        let id = record.business_id;
        let _ = registry.register(record).await;

        let removed = registry.remove(id).await;
        assert!(removed.is_ok());
        assert!(registry.categories().await.is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn upsert_overwrites_for_restore() {
        let registry = BoostRegistry::new();
        let mut record = record_in("bakeries");
        let id = record.business_id;
        registry.upsert(record.clone()).await;

        record.name = "Renamed".to_string();
        registry.upsert(record).await;

        let snap = registry.snapshot(id).await;
        let Ok(snap) = snap else {
            panic!("snapshot failed");
        };
        assert_eq!(snap.name, "Renamed");
        assert_eq!(registry.len().await, 1);
    }
}
