//! Periodic tick driver for the queue sweep.
//!
//! [`Sweeper`] owns a `tokio` interval and invokes
//! [`BoostService::sweep`](super::BoostService::sweep) on each tick. It is
//! only one of the sweep's drivers (the admin endpoint and tests call the
//! sweep directly), so all scheduling policy lives here and none in the
//! sweep itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::BoostService;
use crate::clock::Clock;

/// Periodic sweep driver.
#[derive(Debug)]
pub struct Sweeper {
    service: Arc<BoostService>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Sweeper {
    /// Creates a sweeper ticking at the given interval (300 s in the
    /// reference deployment).
    #[must_use]
    pub fn new(service: Arc<BoostService>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            service,
            clock,
            interval,
        }
    }

    /// Spawns the sweep loop onto the runtime.
    ///
    /// Missed ticks are delayed rather than bursted; a late sweep is just a
    /// stale read until the next pass, never a correctness problem.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let report = self.service.sweep(self.clock.now()).await;
                if report.is_quiet() {
                    tracing::debug!(
                        categories = report.processed_categories,
                        "sweep pass: no action"
                    );
                } else {
                    for swept in &report.categories {
                        for action in &swept.actions {
                            tracing::info!(category = %swept.category, kind = ?action.action, "{}", action.message);
                        }
                    }
                }
            }
        })
    }
}
