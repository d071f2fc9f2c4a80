//! Queue sweep: expiry of finished boosts and promotion of queued ones.
//!
//! The sweep is invoked by the [`super::Sweeper`] tick driver on a fixed
//! interval, by the admin REST endpoint, or directly by tests — the logic
//! assumes nothing about its trigger. Each category is processed under its
//! own shard lock, and one category's failure never aborts the rest.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::BoostService;
use crate::domain::{BoostEvent, CategorySlug, PromotionSource};
use crate::error::GatewayError;

/// What one sweep action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepActionKind {
    /// A finished window was cleared.
    Expired,
    /// A queued boost was promoted into the free slot.
    Activated,
    /// Processing this category failed; see the message.
    Failed,
}

/// One action taken during a sweep, with a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct SweepAction {
    /// What happened.
    pub action: SweepActionKind,
    /// Operator-facing description.
    pub message: String,
}

/// All actions taken for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySweep {
    /// The category swept.
    pub category: CategorySlug,
    /// Actions in execution order (expiries before the promotion).
    pub actions: Vec<SweepAction>,
}

/// Outcome of one full sweep pass.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Number of categories scanned without error.
    pub processed_categories: usize,
    /// Categories where the sweep acted or failed; quiet categories are
    /// omitted.
    pub categories: Vec<CategorySweep>,
}

impl SweepReport {
    /// Returns `true` if the sweep changed nothing and nothing failed.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.categories.is_empty()
    }
}

impl BoostService {
    /// Runs one sweep pass over every category.
    ///
    /// Per category: clear every expired window, then, if the slot is free,
    /// promote the eligible queued head with the earliest scheduled start
    /// (arrival order breaks ties). At most one promotion per category per
    /// pass, since the slot is then occupied. Running the sweep twice with
    /// the same `now` changes nothing on the second pass.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let categories = self.registry().categories().await;
        let mut report = SweepReport {
            processed_categories: 0,
            categories: Vec::new(),
        };

        for category in categories {
            match self.sweep_category(&category, now).await {
                Ok(actions) => {
                    report.processed_categories += 1;
                    if !actions.is_empty() {
                        report.categories.push(CategorySweep { category, actions });
                    }
                }
                Err(err) => {
                    tracing::error!(%category, error = %err, "sweep failed for category");
                    report.categories.push(CategorySweep {
                        category,
                        actions: vec![SweepAction {
                            action: SweepActionKind::Failed,
                            message: err.to_string(),
                        }],
                    });
                }
            }
        }

        report
    }

    /// Sweeps one category under its shard write lock.
    async fn sweep_category(
        &self,
        category: &CategorySlug,
        now: DateTime<Utc>,
    ) -> Result<Vec<SweepAction>, GatewayError> {
        let shard = match self.registry().shard(category).await {
            Ok(shard) => shard,
            // The last record of the category was removed between the
            // category scan and here; nothing to sweep.
            Err(GatewayError::CategoryNotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut actions = Vec::new();
        let mut events = Vec::new();
        let mut shard = shard.write().await;

        for record in shard.records_mut() {
            if let Some(window) = record.active
                && window.has_ended(now)
            {
                record.expire();
                actions.push(SweepAction {
                    action: SweepActionKind::Expired,
                    message: format!("boost for '{}' expired at {}", record.name, window.ends_at),
                });
                events.push(BoostEvent::BoostExpired {
                    business_id: record.business_id,
                    category: category.clone(),
                    ended_at: window.ends_at,
                    timestamp: now,
                });
            }
        }

        if shard.occupant(now, None).is_none() {
            let candidate = shard
                .records()
                .filter_map(|r| {
                    let head = r.queue.front()?;
                    Some((head.window.starts_at, head.queued_at, r.business_id))
                })
                .filter(|(starts_at, _, _)| *starts_at <= now)
                .min_by_key(|(starts_at, queued_at, _)| (*starts_at, *queued_at));

            if let Some((_, _, id)) = candidate
                && let Some(record) = shard.get_mut(id)
                && let Some(promoted) = record.promote_head()
            {
                actions.push(SweepAction {
                    action: SweepActionKind::Activated,
                    message: format!(
                        "activated queued boost for '{}' ({} to {})",
                        record.name, promoted.window.starts_at, promoted.window.ends_at
                    ),
                });
                events.push(BoostEvent::BoostPromoted {
                    business_id: id,
                    category: category.clone(),
                    starts_at: promoted.window.starts_at,
                    ends_at: promoted.window.ends_at,
                    source: PromotionSource::Sweep,
                    timestamp: now,
                });
            }
        }

        drop(shard);
        for event in events {
            let _ = self.event_bus().publish(event);
        }
        Ok(actions)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{BoostRegistry, BusinessId, EventBus};
    use crate::service::boost_service::{BoostDecision, BoostService};

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
    async fn sweep_expires_and_promotes() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let report = service.sweep(t0 + Duration::hours(25)).await;
        assert_eq!(report.processed_categories, 1);
        assert_eq!(report.categories.len(), 1);

        let Some(swept) = report.categories.first() else {
            panic!("expected category actions");
        };
        let kinds: Vec<SweepActionKind> = swept.actions.iter().map(|a| a.action).collect();
        assert_eq!(
            kinds,
            vec![SweepActionKind::Expired, SweepActionKind::Activated]
        );

        let now = t0 + Duration::hours(25);
        let status_a = service.boost_status(a, now).await;
        let status_b = service.boost_status(b, now).await;
        let (Ok(status_a), Ok(status_b)) = (status_a, status_b) else {
            panic!("status failed");
        };
        assert!(!status_a.active);
        assert!(status_b.active);
        assert_eq!(
            status_b.window.map(|w| (w.starts_at, w.ends_at)),
            Some((t0 + Duration::hours(24), t0 + Duration::hours(48)))
        );
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        let now = t0 + Duration::hours(25);
        let first = service.sweep(now).await;
        assert!(!first.is_quiet());

        let second = service.sweep(now).await;
        assert!(second.is_quiet());
        assert_eq!(second.processed_categories, 1);
    }

    #[tokio::test]
    async fn sweep_expires_without_promotion_when_queue_is_empty() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let _ = service.request_boost(a, &slug("restaurants"), t0).await;

        let report = service.sweep(t0 + Duration::hours(25)).await;
        let Some(swept) = report.categories.first() else {
            panic!("expected category actions");
        };
        assert_eq!(swept.actions.len(), 1);
        assert_eq!(
            swept.actions.first().map(|a| a.action),
            Some(SweepActionKind::Expired)
        );
    }

    #[tokio::test]
    async fn sweep_promotes_in_arrival_order() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;
        let c = register(&service, "C", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;
        let _ = service
            .request_boost(c, &slug("restaurants"), t0 + Duration::hours(2))
            .await;

        // First expiry window: B (queued first) must win the slot.
        let _ = service.sweep(t0 + Duration::hours(25)).await;
        let listing = service.list_active_boosts(t0 + Duration::hours(25)).await;
        assert_eq!(listing.iter().map(|e| e.business_id).collect::<Vec<_>>(), vec![b]);

        // Second expiry window: C follows.
        let _ = service.sweep(t0 + Duration::hours(49)).await;
        let listing = service.list_active_boosts(t0 + Duration::hours(49)).await;
        assert_eq!(listing.iter().map(|e| e.business_id).collect::<Vec<_>>(), vec![c]);
    }

    #[tokio::test]
    async fn sweep_leaves_other_categories_untouched() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let p = register(&service, "P", "plumbers").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service.request_boost(p, &slug("plumbers"), t0).await;

        // Neither window has expired yet; the sweep must not touch either.
        let report = service.sweep(t0 + Duration::hours(12)).await;
        assert!(report.is_quiet());
        assert_eq!(report.processed_categories, 2);
    }

    #[tokio::test]
    async fn sweep_does_not_promote_before_scheduled_start() {
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let _ = service.request_boost(a, &slug("restaurants"), t0).await;
        let _ = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;

        // A's window is administratively cleared, freeing the slot early.
        // B's queued start (t0+24h) has not opened, so the sweep must not
        // promote it yet.
        let _ = service.clear_boost(a, t0 + Duration::hours(2)).await;
        let report = service.sweep(t0 + Duration::hours(3)).await;
        assert!(report.is_quiet());

        let position = service.queue_position(b).await;
        let Ok(position) = position else {
            panic!("queue position failed");
        };
        assert_eq!(position, Some(0));
    }

    #[tokio::test]
    async fn scenario_full_cycle() {
        // Scenario walk-through: activation, queueing, expiry sweep,
        // promotion, and the active listing afterward.
        let service = make_service();
        let t0 = Utc::now();
        let a = register(&service, "A", "restaurants").await;
        let b = register(&service, "B", "restaurants").await;

        let first = service.request_boost(a, &slug("restaurants"), t0).await;
        assert!(matches!(first, Ok(BoostDecision::Activated { .. })));

        let second = service
            .request_boost(b, &slug("restaurants"), t0 + Duration::hours(1))
            .await;
        assert!(matches!(second, Ok(BoostDecision::Queued { position: 0, .. })));

        let report = service.sweep(t0 + Duration::hours(25)).await;
        assert_eq!(report.processed_categories, 1);

        let listing = service.list_active_boosts(t0 + Duration::hours(25)).await;
        assert_eq!(
            listing.iter().map(|e| e.business_id).collect::<Vec<_>>(),
            vec![b]
        );
    }
}
