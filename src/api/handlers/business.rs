//! Business registration handlers: register, list, get, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    BusinessListResponse, BusinessResponse, PaginationMeta, PaginationParams,
    RegisterBusinessRequest,
};
use crate::app_state::AppState;
use crate::domain::{BusinessId, CategorySlug};
use crate::error::{ErrorResponse, GatewayError};

/// Maximum accepted display-name length.
const MAX_NAME_LEN: usize = 100;

/// `POST /businesses` — Register a boostable business.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on an empty name or category.
#[utoipa::path(
    post,
    path = "/api/v1/businesses",
    tag = "Businesses",
    summary = "Register a business",
    description = "Registers a business as boostable within a category. The record starts dormant: no active boost, empty queue.",
    request_body = RegisterBusinessRequest,
    responses(
        (status = 201, description = "Business registered", body = BusinessResponse),
        (status = 400, description = "Invalid name or category", body = ErrorResponse),
    )
)]
pub async fn register_business(
    State(state): State<AppState>,
    Json(req): Json<RegisterBusinessRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let name = req.name.trim();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(GatewayError::InvalidRequest(format!(
            "name must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    let category = CategorySlug::new(&req.category)?;

    let record = state
        .boost_service
        .register_business(name.to_string(), category, state.clock.now())
        .await?;

    Ok((StatusCode::CREATED, Json(BusinessResponse::from(&record))))
}

/// `GET /businesses` — List registered businesses with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/businesses",
    tag = "Businesses",
    summary = "List businesses",
    description = "Returns a paginated list of registered businesses, oldest first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated business list", body = BusinessListResponse),
    )
)]
pub async fn list_businesses(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let mut records = state.boost_service.registry().all_records().await;
    records.sort_by(|a, b| {
        a.registered_at
            .cmp(&b.registered_at)
            .then_with(|| a.business_id.as_uuid().cmp(b.business_id.as_uuid()))
    });

    let total = records.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = ((page - 1) * per_page) as usize;
    let data: Vec<BusinessResponse> = records
        .iter()
        .skip(start)
        .take(per_page as usize)
        .map(BusinessResponse::from)
        .collect();

    Ok(Json(BusinessListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /businesses/:id` — Get one registered business.
///
/// # Errors
///
/// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{id}",
    tag = "Businesses",
    summary = "Get a business",
    description = "Returns the registration record for one business.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    responses(
        (status = 200, description = "Business record", body = BusinessResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
    )
)]
pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let record = state
        .boost_service
        .registry()
        .snapshot(BusinessId::from_uuid(id))
        .await?;
    Ok(Json(BusinessResponse::from(&record)))
}

/// `DELETE /businesses/:id` — Unregister a business.
///
/// # Errors
///
/// Returns [`GatewayError::BusinessNotFound`] if the ID is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/businesses/{id}",
    tag = "Businesses",
    summary = "Unregister a business",
    description = "Removes a business and its boost state entirely.",
    params(
        ("id" = uuid::Uuid, Path, description = "Business UUID"),
    ),
    responses(
        (status = 204, description = "Business removed"),
        (status = 404, description = "Business not found", body = ErrorResponse),
    )
)]
pub async fn delete_business(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .boost_service
        .remove_business(BusinessId::from_uuid(id), state.clock.now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Business registration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/businesses", post(register_business).get(list_businesses))
        .route("/businesses/{id}", get(get_business).delete(delete_business))
}
