//! Background persistence worker and startup restore.
//!
//! The worker subscribes to the [`EventBus`] and appends every lifecycle
//! event to the `boost_events` log; on a slower cadence it snapshots all
//! boost records and prunes old snapshots. Store failures are logged and
//! dropped — the scheduler never retries persistence internally.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::postgres::PostgresPersistence;
use crate::clock::Clock;
use crate::domain::{BoostRecord, BoostRegistry, EventBus};
use crate::error::GatewayError;

/// Event-log and snapshot worker.
#[derive(Debug)]
pub struct PersistenceWorker {
    store: PostgresPersistence,
    event_bus: EventBus,
    registry: Arc<BoostRegistry>,
    clock: Arc<dyn Clock>,
    snapshot_interval: std::time::Duration,
    cleanup_after_days: u64,
}

impl PersistenceWorker {
    /// Creates a worker; `cleanup_after_days == 0` disables pruning.
    #[must_use]
    pub fn new(
        store: PostgresPersistence,
        event_bus: EventBus,
        registry: Arc<BoostRegistry>,
        clock: Arc<dyn Clock>,
        snapshot_interval: std::time::Duration,
        cleanup_after_days: u64,
    ) -> Self {
        Self {
            store,
            event_bus,
            registry,
            clock,
            snapshot_interval,
            cleanup_after_days,
        }
    }

    /// Spawns the worker loop onto the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut events = self.event_bus.subscribe();
            let mut snapshot_ticker = tokio::time::interval(self.snapshot_interval);
            snapshot_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(event) => {
                            let payload = serde_json::to_value(&event).unwrap_or_default();
                            let result = self
                                .store
                                .save_event(
                                    *event.business_id().as_uuid(),
                                    event.category().as_str(),
                                    event.event_type_str(),
                                    &payload,
                                )
                                .await;
                            if let Err(err) = result {
                                tracing::warn!(error = %err, "failed to persist event");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(lagged = n, "event log lagged behind event bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = snapshot_ticker.tick() => {
                        self.snapshot_all().await;
                    }
                }
            }
            tracing::debug!("persistence worker stopped");
        })
    }

    /// Snapshots every record, then prunes old snapshots.
    async fn snapshot_all(&self) {
        for record in self.registry.all_records().await {
            let Ok(record_json) = serde_json::to_value(&record) else {
                tracing::warn!(business_id = %record.business_id, "record not serializable");
                continue;
            };
            let result = self
                .store
                .save_record_snapshot(
                    *record.business_id.as_uuid(),
                    record.category.as_str(),
                    &record_json,
                )
                .await;
            if let Err(err) = result {
                tracing::warn!(business_id = %record.business_id, error = %err, "failed to snapshot record");
            }
        }

        if self.cleanup_after_days > 0 {
            match self
                .store
                .delete_old_snapshots(self.clock.now(), self.cleanup_after_days)
                .await
            {
                Ok(deleted) if deleted > 0 => {
                    tracing::info!(deleted, "pruned old snapshots");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "snapshot pruning failed"),
            }
        }
    }
}

/// Restores the latest persisted snapshot of every record into the
/// registry. Called once at startup, before the server accepts traffic.
///
/// # Errors
///
/// Returns a [`GatewayError::PersistenceError`] if the snapshots cannot be
/// loaded; individual undecodable rows are skipped with a warning.
pub async fn restore_registry(
    store: &PostgresPersistence,
    registry: &BoostRegistry,
) -> Result<usize, GatewayError> {
    let snapshots = store.load_latest_snapshots().await?;
    let mut restored = 0;
    for snapshot in snapshots {
        match serde_json::from_value::<BoostRecord>(snapshot.record_json) {
            Ok(record) => {
                registry.upsert(record).await;
                restored += 1;
            }
            Err(err) => {
                tracing::warn!(business_id = %snapshot.business_id, error = %err, "skipping undecodable snapshot");
            }
        }
    }
    Ok(restored)
}
