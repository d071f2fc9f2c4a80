//! Boost service: the scheduler's operations.
//!
//! Every mutation follows the pattern: resolve the category shard → hold its
//! write lock for the whole read-modify-write → drop the lock → emit events
//! → return the result. The shard lock is what makes the exclusivity check
//! atomic with the write; two concurrent requests for the same category can
//! never both observe a free slot.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{
    BoostEvent, BoostRecord, BoostRegistry, BoostWindow, BusinessId, CategorySlug, EventBus,
    PromotionSource, QueuedBoost,
};
use crate::error::GatewayError;

/// Outcome of a boost request: immediate activation, or queued behind the
/// current occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostDecision {
    /// The slot was free; the requester is featured as of now.
    Activated {
        /// The window just taken.
        window: BoostWindow,
    },
    /// The slot was occupied; the request is parked.
    Queued {
        /// The window this request will occupy once promoted. Advisory;
        /// an administrative reset can reshape the queue before then.
        window: BoostWindow,
        /// 0-based position among the category's pending requests.
        position: usize,
    },
}

/// Read-only snapshot of one record's boost state.
///
/// `active` is always computed against `now`, never read from a stored
/// flag, so an expired-but-unswept boost reports as inactive.
#[derive(Debug, Clone, Serialize)]
pub struct BoostStatus {
    /// Record identifier.
    pub business_id: BusinessId,
    /// Display name.
    pub name: String,
    /// Competition scope.
    pub category: CategorySlug,
    /// Whether the record holds an unexpired featured window right now.
    pub active: bool,
    /// The held window, if any (possibly already expired).
    pub window: Option<BoostWindow>,
    /// Pending requests, in arrival order.
    pub queue: Vec<QueuedBoost>,
}

/// One currently featured record, for the cross-category active listing.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveBoost {
    /// Record identifier.
    pub business_id: BusinessId,
    /// Display name.
    pub name: String,
    /// Competition scope.
    pub category: CategorySlug,
    /// The held window.
    pub window: BoostWindow,
}

/// Orchestration layer for all scheduler operations.
///
/// Stateless coordinator: owns the [`BoostRegistry`] for state and the
/// [`EventBus`] for lifecycle events. The featured-window length is fixed
/// at construction (24 h in the reference policy).
#[derive(Debug, Clone)]
pub struct BoostService {
    registry: Arc<BoostRegistry>,
    event_bus: EventBus,
    boost_duration: Duration,
}

impl BoostService {
    /// Creates a new `BoostService`.
    #[must_use]
    pub fn new(registry: Arc<BoostRegistry>, event_bus: EventBus, boost_duration: Duration) -> Self {
        Self {
            registry,
            event_bus,
            boost_duration,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`BoostRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<BoostRegistry> {
        &self.registry
    }

    /// Registers a business as boostable, starting dormant.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AlreadyRegistered`] on a duplicate ID (never
    /// expected with generated UUIDs).
    pub async fn register_business(
        &self,
        name: String,
        category: CategorySlug,
        now: DateTime<Utc>,
    ) -> Result<BoostRecord, GatewayError> {
        let record = BoostRecord::new(BusinessId::new(), name, category, now);
        self.registry.register(record.clone()).await?;

        let _ = self.event_bus.publish(BoostEvent::BusinessRegistered {
            business_id: record.business_id,
            name: record.name.clone(),
            category: record.category.clone(),
            timestamp: now,
        });

        tracing::info!(business_id = %record.business_id, category = %record.category, "business registered");
        Ok(record)
    }

    /// Unregisters a business entirely.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
    pub async fn remove_business(
        &self,
        id: BusinessId,
        now: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        let record = self.registry.remove(id).await?;

        let _ = self.event_bus.publish(BoostEvent::BusinessRemoved {
            business_id: id,
            category: record.category,
            timestamp: now,
        });

        tracing::info!(business_id = %id, "business removed");
        Ok(())
    }

    /// Requests the featured slot for a business.
    ///
    /// With the slot free the requester is activated for one full window
    /// starting at `now`. With the slot occupied the request is enqueued on
    /// the requester's own record, its window starting where the category's
    /// latest committed window ends, so chained requests stack contiguously.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::BusinessNotFound`] for an unknown ID.
    /// - [`GatewayError::InvalidRequest`] when `category` is not the
    ///   business's own category.
    /// - [`GatewayError::BoostAlreadyActive`] when the requester already
    ///   holds an unexpired window.
    pub async fn request_boost(
        &self,
        id: BusinessId,
        category: &CategorySlug,
        now: DateTime<Utc>,
    ) -> Result<BoostDecision, GatewayError> {
        let (own_category, shard) = self.registry.locate(id).await?;
        if &own_category != category {
            return Err(GatewayError::InvalidRequest(format!(
                "business belongs to category '{own_category}', not '{category}'"
            )));
        }

        let mut shard = shard.write().await;
        let record = shard
            .get(id)
            .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
        if let Some(window) = record.active
            && !window.has_ended(now)
        {
            return Err(GatewayError::BoostAlreadyActive {
                until: window.ends_at,
            });
        }

        let occupied = shard.occupant(now, Some(id)).is_some();
        if occupied {
            let starts_at = shard.latest_committed_end().unwrap_or(now).max(now);
            let window = BoostWindow::starting_at(starts_at, self.boost_duration);
            let position = shard
                .records()
                .flat_map(|r| r.queue.iter())
                .filter(|q| (q.window.starts_at, q.queued_at) < (window.starts_at, now))
                .count();

            let record = shard
                .get_mut(id)
                .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
            record.enqueue(QueuedBoost {
                requested_by: id,
                window,
                queued_at: now,
            });
            drop(shard);

            let _ = self.event_bus.publish(BoostEvent::BoostQueued {
                business_id: id,
                category: category.clone(),
                starts_at: window.starts_at,
                ends_at: window.ends_at,
                position,
                timestamp: now,
            });
            tracing::info!(business_id = %id, %category, position, "boost queued");
            Ok(BoostDecision::Queued { window, position })
        } else {
            let window = BoostWindow::starting_at(now, self.boost_duration);
            let record = shard
                .get_mut(id)
                .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
            record.activate(window);
            drop(shard);

            let _ = self.event_bus.publish(BoostEvent::BoostActivated {
                business_id: id,
                category: category.clone(),
                starts_at: window.starts_at,
                ends_at: window.ends_at,
                timestamp: now,
            });
            tracing::info!(business_id = %id, %category, "boost activated");
            Ok(BoostDecision::Activated { window })
        }
    }

    /// Claims the head of the business's own queue (pull model).
    ///
    /// # Errors
    ///
    /// - [`GatewayError::BusinessNotFound`] for an unknown ID.
    /// - [`GatewayError::QueueEmpty`] with nothing queued.
    /// - [`GatewayError::BoostNotStarted`] before the head window opens.
    /// - [`GatewayError::SlotOccupied`] while another business still holds
    ///   an unexpired window (exclusivity is enforced here too).
    pub async fn claim_queued_boost(
        &self,
        id: BusinessId,
        now: DateTime<Utc>,
    ) -> Result<BoostWindow, GatewayError> {
        let (category, shard) = self.registry.locate(id).await?;
        let mut shard = shard.write().await;

        {
            let record = shard
                .get(id)
                .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
            let head = record.queue.front().ok_or(GatewayError::QueueEmpty)?;
            if !head.window.has_started(now) {
                return Err(GatewayError::BoostNotStarted {
                    starts_at: head.window.starts_at,
                });
            }
        }

        if let Some(until) = shard
            .occupant(now, Some(id))
            .and_then(|r| r.active)
            .map(|w| w.ends_at)
        {
            return Err(GatewayError::SlotOccupied { until });
        }

        let record = shard
            .get_mut(id)
            .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
        let promoted = record.promote_head().ok_or(GatewayError::QueueEmpty)?;
        drop(shard);

        let _ = self.event_bus.publish(BoostEvent::BoostPromoted {
            business_id: id,
            category,
            starts_at: promoted.window.starts_at,
            ends_at: promoted.window.ends_at,
            source: PromotionSource::Claim,
            timestamp: now,
        });
        tracing::info!(business_id = %id, "queued boost claimed");
        Ok(promoted.window)
    }

    /// Administrative reset: drops the active window and empties the queue
    /// in one critical section.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
    pub async fn clear_boost(&self, id: BusinessId, now: DateTime<Utc>) -> Result<(), GatewayError> {
        let (category, shard) = self.registry.locate(id).await?;
        {
            let mut shard = shard.write().await;
            let record = shard
                .get_mut(id)
                .ok_or(GatewayError::BusinessNotFound(*id.as_uuid()))?;
            record.clear_boost();
        }

        let _ = self.event_bus.publish(BoostEvent::BoostCleared {
            business_id: id,
            category,
            timestamp: now,
        });
        tracing::info!(business_id = %id, "boost cleared");
        Ok(())
    }

    /// Read-only boost status for one business.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
    pub async fn boost_status(
        &self,
        id: BusinessId,
        now: DateTime<Utc>,
    ) -> Result<BoostStatus, GatewayError> {
        let record = self.registry.snapshot(id).await?;
        Ok(BoostStatus {
            business_id: record.business_id,
            name: record.name,
            category: record.category,
            active: record.active.is_some_and(|w| !w.has_ended(now)),
            window: record.active,
            queue: record.queue.into_iter().collect(),
        })
    }

    /// 0-based queue position of the business's earliest pending request
    /// within its category, or `None` with nothing pending.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
    pub async fn queue_position(&self, id: BusinessId) -> Result<Option<usize>, GatewayError> {
        let (_, shard) = self.registry.locate(id).await?;
        let shard = shard.read().await;
        Ok(shard.queue_position(id))
    }

    /// All currently featured records across all categories, latest-expiring
    /// first (the observed listing order, preserved for compatibility).
    pub async fn list_active_boosts(&self, now: DateTime<Utc>) -> Vec<ActiveBoost> {
        let mut active: Vec<ActiveBoost> = self
            .registry
            .all_records()
            .await
            .into_iter()
            .filter_map(|record| {
                let window = record.active.filter(|w| !w.has_ended(now))?;
                Some(ActiveBoost {
                    business_id: record.business_id,
                    name: record.name,
                    category: record.category,
                    window,
                })
            })
            .collect();
        active.sort_by(|a, b| b.window.ends_at.cmp(&a.window.ends_at));
        active
    }

    /// Featured-window length this service schedules with.
    #[must_use]
    pub const fn boost_duration(&self) -> Duration {
        self.boost_duration
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

    fn make_service() -> BoostService {
        BoostService::new(
            Arc::new(BoostRegistry::new()),
            EventBus::new(64),
            Duration::hours(24),
        )
    }

    async fn register(service: &BoostService, name: &str, category: &str) -> BusinessId {
        let record = service
            .register_business(name.to_string(), slug(category), Utc::now())
            .await;
        let Ok(record) = record else {
            panic!("registration failed");
        };
        record.business_id
    }

    #[tokio::test]
    async fn uncontended_request_activates_immediately() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "Mario's Pizza", "restaurants").await;

        let decision = service.request_boost(a, &slug("restaurants"), t0).await;
        let Ok(BoostDecision::Activated { window }) = decision else {
            panic!("expected immediate activation");
        };
        assert_eq!(window.starts_at, t0);
        assert_eq!(window.ends_at, t0 + Duration::hours(24));
    }

    #[tokio::test]
    async fn contended_request_queues_contiguously() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "Mario's Pizza", "restaurants").await;
        let b = register(&service, "Luigi's Pasta", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let decision = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let Ok(BoostDecision::Queued { window, position }) = decision else {
            panic!("expected queued decision");
        };
        assert_eq!(window.starts_at, t0 + Duration::hours(24));
        assert_eq!(window.ends_at, t0 + Duration::hours(48));
        assert_eq!(position, 0);

        let pos = service.queue_position(b).await;
        let Ok(pos) = pos else {
            panic!("queue position failed");
        };
        assert_eq!(pos, Some(0));
    }

    #[tokio::test]
    async fn chained_requests_stack_behind_the_queue_tail() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;
        let c = register(&service, "C", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;
        let decision = service
            .request_boost(c, &slug("restaurants"), t0 + Duration::hours(2))
            .await;

        let Ok(BoostDecision::Queued { window, position }) = decision else {
            panic!("expected queued decision");
        };
        // C stacks behind B's queued window, not behind A's active one.
        assert_eq!(window.starts_at, t0 + Duration::hours(48));
        assert_eq!(window.ends_at, t0 + Duration::hours(72));
        assert_eq!(position, 1);
    }

    #[tokio::test]
    async fn redundant_request_while_active_is_rejected() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let second = service
            .request_boost(a, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let Err(GatewayError::BoostAlreadyActive { until }) = second else {
            panic!("expected already-active rejection");
        };
        assert_eq!(until, t0 + Duration::hours(24));
    }

    #[tokio::test]
    async fn wrong_category_is_rejected() {
        let service = make_service();
        let a = register(&service, "A", "restaurants").await;

        let result = service.request_boost(a, &slug("plumbers"), Utc::now()).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn unknown_business_is_not_found() {
        let service = make_service();
        let result = service
            .request_boost(BusinessId::new(), &slug("restaurants"), Utc::now())
            .await;
        assert!(matches!(result, Err(GatewayError::BusinessNotFound(_))));
    }

    #[tokio::test]
    async fn premature_claim_is_rejected() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let claim = service
            .claim_queued_boost(b, t0 + Duration::hours(20))
            .await;
        let Err(GatewayError::BoostNotStarted { starts_at }) = claim else {
            panic!("expected not-started rejection");
        };
        assert_eq!(starts_at, t0 + Duration::hours(24));
    }

    #[tokio::test]
    async fn eligible_claim_promotes_exactly_one_entry() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let claim = service
            .claim_queued_boost(b, t0 + Duration::hours(25))
            .await;
        let Ok(window) = claim else {
            panic!("expected successful claim");
        };
        assert_eq!(window.starts_at, t0 + Duration::hours(24));

        let status = service.boost_status(b, t0 + Duration::hours(25)).await;
        let Ok(status) = status else {
            panic!("status failed");
        };
        assert!(status.active);
        assert!(status.queue.is_empty());
    }

    #[tokio::test]
    async fn claim_is_rejected_while_slot_is_occupied() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        // A resets and immediately re-boosts, taking a window that overlaps
        // B's scheduled start. B's claim must not double-activate.
        let _ = service.clear_boost(a, t0 + Duration::hours(23)).await;
        let _ = service
            .request_boost(a, &slug("restaurants"), t0 + Duration::hours(23))
            .await;

        let claim = service
            .claim_queued_boost(b, t0 + Duration::hours(25))
            .await;
        let Err(GatewayError::SlotOccupied { until }) = claim else {
            panic!("expected occupied rejection");
        };
        assert_eq!(until, t0 + Duration::hours(47));

        let listing = service.list_active_boosts(t0 + Duration::hours(25)).await;
        assert_eq!(listing.len(), 1);
    }

    #[tokio::test]
    async fn claim_with_empty_queue_is_rejected() {
        let service = make_service();
        let a = register(&service, "A", "restaurants").await;
        let claim = service.claim_queued_boost(a, Utc::now()).await;
        assert!(matches!(claim, Err(GatewayError::QueueEmpty)));
    }

    #[tokio::test]
    async fn concurrent_requests_yield_one_activation() {
        let service = Arc::new(make_service());
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let s1 = Arc::clone(&service);
        let s2 = Arc::clone(&service);
        let h1 = tokio::spawn(async move { s1.request_boost(a, &slug("restaurants"), t0).await });
        let h2 = tokio::spawn(async move { s2.request_boost(b, &slug("restaurants"), t0).await });

        let (r1, r2) = (h1.await, h2.await);
        let (Ok(Ok(d1)), Ok(Ok(d2))) = (r1, r2) else {
            panic!("both requests should succeed");
        };

        let activated = [d1, d2]
            .iter()
            .filter(|d| matches!(d, BoostDecision::Activated { .. }))
            .count();
        let queued = [d1, d2]
            .iter()
            .filter(|d| matches!(d, BoostDecision::Queued { .. }))
            .count();
        assert_eq!(activated, 1);
        assert_eq!(queued, 1);
    }

    #[tokio::test]
    async fn status_reports_expired_boost_as_inactive() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let _ = service.request_boost(a, &slug("restaurants"), t0).await;

        // No sweep has run; the stored window is stale but status must not
        // trust it.
        let status = service.boost_status(a, t0 + Duration::hours(25)).await;
        let Ok(status) = status else {
            panic!("status failed");
        };
        assert!(!status.active);
        assert!(status.window.is_some());
    }

    #[tokio::test]
    async fn active_listing_is_latest_expiring_first() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "plumbers").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("plumbers"), t0 + Duration::hours(2))
            .await;

        let listing = service.list_active_boosts(t0 + Duration::hours(3)).await;
        let ids: Vec<BusinessId> = listing.iter().map(|e| e.business_id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn clear_boost_resets_window_and_queue() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let cleared = service.clear_boost(b, t0 + Duration::hours(2)).await;
        assert!(cleared.is_ok());

        let status = service.boost_status(b, t0 + Duration::hours(2)).await;
        let Ok(status) = status else {
            panic!("status failed");
        };
        assert!(!status.active);
        assert!(status.window.is_none());
        assert!(status.queue.is_empty());
    }

    #[tokio::test]
    async fn activation_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;

        // Skip the registration event.
        let _ = rx.recv().await;
        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "boost_activated");
        assert_eq!(event.business_id(), a);
    }
}
