//! Boost scheduling DTOs: requests, decisions, status, and sweep reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::QueuedBoost;
use crate::service::{ActiveBoost, BoostDecision, BoostStatus, SweepReport};

/// Request body for `POST /businesses/{id}/boost`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestBoostBody {
    /// Category the boost competes in; must be the business's own.
    pub category: String,
}

/// Outcome of a boost request.
///
/// Immediate activation serializes as `{active: true, boost_starts_at,
/// boost_ends_at}`; a parked request adds `queued: true` and its position.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoostDecisionResponse {
    /// Whether the business is featured as of this response.
    pub active: bool,
    /// Present and `true` when the request was parked behind an occupant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queued: Option<bool>,
    /// Window start (scheduled start when queued).
    pub boost_starts_at: DateTime<Utc>,
    /// Window end (scheduled end when queued).
    pub boost_ends_at: DateTime<Utc>,
    /// 0-based position among the category's pending requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl From<BoostDecision> for BoostDecisionResponse {
    fn from(decision: BoostDecision) -> Self {
        match decision {
            BoostDecision::Activated { window } => Self {
                active: true,
                queued: None,
                boost_starts_at: window.starts_at,
                boost_ends_at: window.ends_at,
                position: None,
            },
            BoostDecision::Queued { window, position } => Self {
                active: false,
                queued: Some(true),
                boost_starts_at: window.starts_at,
                boost_ends_at: window.ends_at,
                position: Some(position),
            },
        }
    }
}

/// One pending queue entry in a status response.
#[derive(Debug, Serialize, ToSchema)]
pub struct QueuedBoostDto {
    /// Business that asked to be boosted.
    pub requested_by: uuid::Uuid,
    /// Scheduled window start.
    pub boost_starts_at: DateTime<Utc>,
    /// Scheduled window end.
    pub boost_ends_at: DateTime<Utc>,
    /// Arrival timestamp.
    pub queued_at: DateTime<Utc>,
}

impl From<&QueuedBoost> for QueuedBoostDto {
    fn from(queued: &QueuedBoost) -> Self {
        Self {
            requested_by: *queued.requested_by.as_uuid(),
            boost_starts_at: queued.window.starts_at,
            boost_ends_at: queued.window.ends_at,
            queued_at: queued.queued_at,
        }
    }
}

/// Boost status for `GET /businesses/{id}/boost`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoostStatusResponse {
    /// Business identifier.
    pub business_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Category slug.
    pub category: String,
    /// Whether the window is unexpired as of the request.
    pub active: bool,
    /// Held window start, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_starts_at: Option<DateTime<Utc>>,
    /// Held window end, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_ends_at: Option<DateTime<Utc>>,
    /// Pending requests in arrival order.
    pub queue: Vec<QueuedBoostDto>,
}

impl From<BoostStatus> for BoostStatusResponse {
    fn from(status: BoostStatus) -> Self {
        Self {
            business_id: *status.business_id.as_uuid(),
            name: status.name,
            category: status.category.to_string(),
            active: status.active,
            boost_starts_at: status.window.map(|w| w.starts_at),
            boost_ends_at: status.window.map(|w| w.ends_at),
            queue: status.queue.iter().map(QueuedBoostDto::from).collect(),
        }
    }
}

/// Queue position for `GET /businesses/{id}/boost/position`.
#[derive(Debug, Serialize, ToSchema)]
pub struct QueuePositionResponse {
    /// Business identifier.
    pub business_id: uuid::Uuid,
    /// Whether the business has a pending request at all.
    pub queued: bool,
    /// 0-based position when queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// One entry of `GET /boosts/active`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveBoostDto {
    /// Business identifier.
    pub business_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Category slug.
    pub category: String,
    /// Window start.
    pub boost_starts_at: DateTime<Utc>,
    /// Window end.
    pub boost_ends_at: DateTime<Utc>,
}

impl From<&ActiveBoost> for ActiveBoostDto {
    fn from(entry: &ActiveBoost) -> Self {
        Self {
            business_id: *entry.business_id.as_uuid(),
            name: entry.name.clone(),
            category: entry.category.to_string(),
            boost_starts_at: entry.window.starts_at,
            boost_ends_at: entry.window.ends_at,
        }
    }
}

/// One sweep action in a sweep report.
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepActionDto {
    /// Action discriminator: `expired`, `activated`, or `failed`.
    pub action: String,
    /// Operator-facing description.
    pub message: String,
}

/// Actions taken for one category.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySweepDto {
    /// Category slug.
    pub category: String,
    /// Actions in execution order.
    pub actions: Vec<SweepActionDto>,
}

/// Response body for `POST /admin/boost-sweep`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of categories scanned without error.
    pub processed_categories: usize,
    /// Categories where the sweep acted or failed.
    pub categories: Vec<CategorySweepDto>,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            processed_categories: report.processed_categories,
            categories: report
                .categories
                .into_iter()
                .map(|swept| CategorySweepDto {
                    category: swept.category.to_string(),
                    actions: swept
                        .actions
                        .into_iter()
                        .map(|a| SweepActionDto {
                            action: match a.action {
                                crate::service::SweepActionKind::Expired => "expired".to_string(),
                                crate::service::SweepActionKind::Activated => {
                                    "activated".to_string()
                                }
                                crate::service::SweepActionKind::Failed => "failed".to_string(),
                            },
                            message: a.message,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
