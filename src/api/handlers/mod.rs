//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod boost;
pub mod business;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(business::routes())
        .merge(boost::routes())
        .merge(admin::routes())
}
