//! Business registration and listing DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::BoostRecord;

/// Request body for `POST /businesses`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterBusinessRequest {
    /// Display name (max 100 chars).
    pub name: String,
    /// Category slug the business competes in.
    pub category: String,
}

/// One registered business.
#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessResponse {
    /// Business identifier.
    pub business_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Category slug.
    pub category: String,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<&BoostRecord> for BusinessResponse {
    fn from(record: &BoostRecord) -> Self {
        Self {
            business_id: *record.business_id.as_uuid(),
            name: record.name.clone(),
            category: record.category.to_string(),
            registered_at: record.registered_at,
        }
    }
}

/// Paginated list response for `GET /businesses`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessListResponse {
    /// Business summaries.
    pub data: Vec<BusinessResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
