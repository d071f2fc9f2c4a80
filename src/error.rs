//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a numeric error code and a specific HTTP status. Rejected claims
//! and occupied slots are expected business outcomes, not faults, and carry
//! descriptive messages rather than generic 500s.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2004,
///     "message": "boost period has not started yet (opens 2026-08-07T12:00:00Z)",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Business with the given ID is not registered.
    #[error("business not found: {0}")]
    BusinessNotFound(uuid::Uuid),

    /// No business is registered under the given category.
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// A record with this business ID already exists.
    #[error("business already registered: {0}")]
    AlreadyRegistered(uuid::Uuid),

    /// The requester already holds an unexpired featured window.
    #[error("boost already active until {until}")]
    BoostAlreadyActive {
        /// End of the currently held window.
        until: DateTime<Utc>,
    },

    /// A claim was attempted with nothing queued.
    #[error("no queued boost to claim")]
    QueueEmpty,

    /// A claim was attempted before the scheduled window opened.
    #[error("boost period has not started yet (opens {starts_at})")]
    BoostNotStarted {
        /// When the queued window opens.
        starts_at: DateTime<Utc>,
    },

    /// Another business still holds the category's featured slot.
    #[error("featured slot is occupied until {until}")]
    SlotOccupied {
        /// End of the occupying window.
        until: DateTime<Utc>,
    },

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::BusinessNotFound(_) => 2001,
            Self::CategoryNotFound(_) => 2002,
            Self::AlreadyRegistered(_) => 2003,
            Self::BoostNotStarted { .. } => 2004,
            Self::QueueEmpty => 2005,
            Self::BoostAlreadyActive { .. } => 2006,
            Self::SlotOccupied { .. } => 2007,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::BusinessNotFound(_) | Self::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered(_)
            | Self::BoostNotStarted { .. }
            | Self::QueueEmpty
            | Self::BoostAlreadyActive { .. }
            | Self::SlotOccupied { .. } => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
