//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::EventBus;
use crate::persistence::postgres::PostgresPersistence;
use crate::service::BoostService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Boost service for all scheduler logic.
    pub boost_service: Arc<BoostService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Time source; handlers never call `Utc::now` directly.
    pub clock: Arc<dyn Clock>,
    /// Event log store, when persistence is enabled.
    pub event_store: Option<PostgresPersistence>,
}
