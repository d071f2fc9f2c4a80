//! Boost scheduling handlers: request, claim, status, position, listing.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    ActiveBoostDto, BoostDecisionResponse, BoostStatusResponse, QueuePositionResponse,
    RequestBoostBody,
};
use crate::app_state::AppState;
use crate::domain::{BusinessId, CategorySlug};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /businesses/:id/boost` — Request the featured slot.
///
/// With the category slot free the business is activated immediately for
/// one full window; with the slot occupied the request is queued behind it.
///
/// # Errors
///
/// Returns [`GatewayError::BusinessNotFound`], [`GatewayError::InvalidRequest`]
/// on a category mismatch, or [`GatewayError::BoostAlreadyActive`].
#[utoipa::path(
    post,
    path = "/api/v1/businesses/{id}/boost",
    tag = "Boosts",
    summary = "Request a boost",
    description = "Activates the business immediately when its category slot is free, otherwise queues the request contiguously behind the occupant.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    request_body = RequestBoostBody,
    responses(
        (status = 200, description = "Activation or queued decision", body = BoostDecisionResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
        (status = 409, description = "Boost already active", body = ErrorResponse),
    )
)]
pub async fn request_boost(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RequestBoostBody>,
) -> Result<impl IntoResponse, GatewayError> {
    let category = CategorySlug::new(&req.category)?;
    let decision = state
        .boost_service
        .request_boost(BusinessId::from_uuid(id), &category, state.clock.now())
        .await?;
    Ok(Json(BoostDecisionResponse::from(decision)))
}

/// `POST /businesses/:id/boost/claim` — Claim the queued head.
///
/// # Errors
///
/// Returns [`GatewayError::QueueEmpty`], [`GatewayError::BoostNotStarted`],
/// or [`GatewayError::SlotOccupied`] as rejected preconditions.
#[utoipa::path(
    post,
    path = "/api/v1/businesses/{id}/boost/claim",
    tag = "Boosts",
    summary = "Claim a queued boost",
    description = "Promotes the business's own queued head once its scheduled window has opened and the slot is free.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    responses(
        (status = 200, description = "Boost activated", body = BoostDecisionResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
        (status = 409, description = "Nothing queued, window not open, or slot occupied", body = ErrorResponse),
    )
)]
pub async fn claim_boost(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let window = state
        .boost_service
        .claim_queued_boost(BusinessId::from_uuid(id), state.clock.now())
        .await?;
    Ok(Json(BoostDecisionResponse {
        active: true,
        queued: None,
        boost_starts_at: window.starts_at,
        boost_ends_at: window.ends_at,
        position: None,
    }))
}

/// `GET /businesses/:id/boost` — Boost status snapshot.
///
/// # Errors
///
/// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{id}/boost",
    tag = "Boosts",
    summary = "Get boost status",
    description = "Returns the business's boost state. `active` is evaluated against the current time, so an expired-but-unswept boost reads as inactive.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    responses(
        (status = 200, description = "Boost status", body = BoostStatusResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
    )
)]
pub async fn boost_status(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let status = state
        .boost_service
        .boost_status(BusinessId::from_uuid(id), state.clock.now())
        .await?;
    Ok(Json(BoostStatusResponse::from(status)))
}

/// `GET /businesses/:id/boost/position` — Queue position.
///
/// # Errors
///
/// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{id}/boost/position",
    tag = "Boosts",
    summary = "Get queue position",
    description = "Returns the 0-based position of the business's earliest pending request within its category, or `queued: false` with nothing pending.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    responses(
        (status = 200, description = "Queue position", body = QueuePositionResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
    )
)]
pub async fn queue_position(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let position = state
        .boost_service
        .queue_position(BusinessId::from_uuid(id))
        .await?;
    Ok(Json(QueuePositionResponse {
        business_id: id,
        queued: position.is_some(),
        position,
    }))
}

/// `DELETE /businesses/:id/boost` — Administrative reset.
///
/// Drops the active window and empties the queue in one critical section.
///
/// # Errors
///
/// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/businesses/{id}/boost",
    tag = "Boosts",
    summary = "Clear boost state",
    description = "Admin reset: drops the active window and empties the queue atomically.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    responses(
        (status = 204, description = "Boost state cleared"),
        (status = 404, description = "Business not found", body = ErrorResponse),
    )
)]
pub async fn clear_boost(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .boost_service
        .clear_boost(BusinessId::from_uuid(id), state.clock.now())
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// `GET /boosts/active` — All currently featured businesses.
#[utoipa::path(
    get,
    path = "/api/v1/boosts/active",
    tag = "Boosts",
    summary = "List active boosts",
    description = "Returns every business holding an unexpired featured window, across all categories, latest-expiring first.",
    responses(
        (status = 200, description = "Active boosts", body = Vec<ActiveBoostDto>),
    )
)]
pub async fn active_boosts(State(state): State<AppState>) -> impl IntoResponse {
    let listing = state.boost_service.list_active_boosts(state.clock.now()).await;
    let data: Vec<ActiveBoostDto> = listing.iter().map(ActiveBoostDto::from).collect();
    Json(data)
}

/// Boost scheduling routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/businesses/{id}/boost",
            post(request_boost).get(boost_status).delete(clear_boost),
        )
        .route("/businesses/{id}/boost/claim", post(claim_boost))
        .route("/businesses/{id}/boost/position", get(queue_position))
        .route("/boosts/active", get(active_boosts))
}
