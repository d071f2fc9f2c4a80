//! System endpoints: health check and boost policy.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: state.clock.now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Boost policy parameters.
#[derive(Debug, Serialize, ToSchema)]
struct BoostPolicyResponse {
    boost_duration_hours: i64,
}

/// `GET /config/boost-policy` — Scheduling policy in effect.
#[utoipa::path(
    get,
    path = "/config/boost-policy",
    tag = "System",
    summary = "Get boost policy",
    description = "Returns the featured-window length this deployment schedules with.",
    responses(
        (status = 200, description = "Boost policy", body = BoostPolicyResponse),
    )
)]
pub async fn boost_policy_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(BoostPolicyResponse {
            boost_duration_hours: state.boost_service.boost_duration().num_hours(),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/boost-policy", get(boost_policy_handler))
}
