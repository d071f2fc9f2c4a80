//! Admin endpoints: manual sweep trigger and the persisted event log.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::dto::SweepResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /admin/boost-sweep` — Run a sweep pass now.
///
/// The periodic sweeper drives the same logic on an interval; this endpoint
/// is the external-trigger driver (and the sweep is idempotent, so calling
/// both is harmless).
#[utoipa::path(
    post,
    path = "/api/v1/admin/boost-sweep",
    tag = "Admin",
    summary = "Run a queue sweep",
    description = "Expires finished boosts and promotes eligible queued ones, reporting per-category actions.",
    responses(
        (status = 200, description = "Sweep report", body = SweepResponse),
    )
)]
pub async fn run_sweep(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.boost_service.sweep(state.clock.now()).await;
    Json(SweepResponse::from(report))
}

/// Query parameters for the event log.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EventQueryParams {
    /// Only events created after this instant (default: beginning of time).
    pub after: Option<DateTime<Utc>>,
    /// Only events for this business.
    pub business_id: Option<uuid::Uuid>,
}

/// One persisted event log entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoredEventDto {
    /// Auto-increment row ID.
    pub id: i64,
    /// Business that generated the event.
    pub business_id: uuid::Uuid,
    /// Category the event belongs to.
    pub category: String,
    /// Event type discriminator (e.g. `"boost_activated"`).
    pub event_type: String,
    /// Event-specific payload.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// `GET /admin/boost-events` — Query the persisted event log.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] when persistence is disabled,
/// or [`GatewayError::PersistenceError`] on a database failure.
#[utoipa::path(
    get,
    path = "/api/v1/admin/boost-events",
    tag = "Admin",
    summary = "Query boost events",
    description = "Returns persisted boost lifecycle events, oldest first, optionally filtered by time and business.",
    params(EventQueryParams),
    responses(
        (status = 200, description = "Stored events", body = Vec<StoredEventDto>),
        (status = 400, description = "Persistence disabled", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventQueryParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let store = state.event_store.as_ref().ok_or_else(|| {
        GatewayError::InvalidRequest("persistence is disabled on this deployment".to_string())
    })?;

    let after = params.after.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let events = store.load_events_after(after, params.business_id).await?;

    let data: Vec<StoredEventDto> = events
        .into_iter()
        .map(|e| StoredEventDto {
            id: e.id,
            business_id: e.business_id,
            category: e.category,
            event_type: e.event_type,
            payload: e.payload,
            created_at: e.created_at,
        })
        .collect();
    Ok(Json(data))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/boost-sweep", post(run_sweep))
        .route("/admin/boost-events", get(list_events))
}
