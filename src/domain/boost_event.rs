//! Domain events reflecting boost lifecycle transitions.
//!
//! Every scheduler mutation emits a [`BoostEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers and
//! optionally appended to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{BusinessId, CategorySlug};

/// Which path promoted a queued boost into the featured slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionSource {
    /// The owner claimed the queued boost explicitly.
    Claim,
    /// The periodic sweep promoted it after the prior window expired.
    Sweep,
}

/// Domain event emitted after every boost state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BoostEvent {
    /// A business was registered as boostable.
    BusinessRegistered {
        /// Record identifier.
        business_id: BusinessId,
        /// Display name.
        name: String,
        /// Competition scope.
        category: CategorySlug,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A business took the free featured slot immediately.
    BoostActivated {
        /// Record identifier.
        business_id: BusinessId,
        /// Competition scope.
        category: CategorySlug,
        /// Window start.
        starts_at: DateTime<Utc>,
        /// Window end.
        ends_at: DateTime<Utc>,
        /// Activation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A boost request was parked behind an occupied slot.
    BoostQueued {
        /// Record identifier.
        business_id: BusinessId,
        /// Competition scope.
        category: CategorySlug,
        /// Scheduled window start.
        starts_at: DateTime<Utc>,
        /// Scheduled window end.
        ends_at: DateTime<Utc>,
        /// 0-based position among the category's pending requests.
        position: usize,
        /// Enqueue timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A queued boost was promoted into the featured slot.
    BoostPromoted {
        /// Record identifier.
        business_id: BusinessId,
        /// Competition scope.
        category: CategorySlug,
        /// Window start.
        starts_at: DateTime<Utc>,
        /// Window end.
        ends_at: DateTime<Utc>,
        /// Whether the claim path or the sweep promoted it.
        source: PromotionSource,
        /// Promotion timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An active window ran out and was cleared by the sweep.
    BoostExpired {
        /// Record identifier.
        business_id: BusinessId,
        /// Competition scope.
        category: CategorySlug,
        /// When the window ended.
        ended_at: DateTime<Utc>,
        /// Sweep timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An admin reset a record's boost state.
    BoostCleared {
        /// Record identifier.
        business_id: BusinessId,
        /// Competition scope.
        category: CategorySlug,
        /// Reset timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A business was unregistered.
    BusinessRemoved {
        /// Record identifier.
        business_id: BusinessId,
        /// Competition scope.
        category: CategorySlug,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl BoostEvent {
    /// Returns the business ID associated with this event.
    #[must_use]
    pub fn business_id(&self) -> BusinessId {
        match self {
            Self::BusinessRegistered { business_id, .. }
            | Self::BoostActivated { business_id, .. }
            | Self::BoostQueued { business_id, .. }
            | Self::BoostPromoted { business_id, .. }
            | Self::BoostExpired { business_id, .. }
            | Self::BoostCleared { business_id, .. }
            | Self::BusinessRemoved { business_id, .. } => *business_id,
        }
    }

    /// Returns the category this event belongs to.
    #[must_use]
    pub fn category(&self) -> &CategorySlug {
        match self {
            Self::BusinessRegistered { category, .. }
            | Self::BoostActivated { category, .. }
            | Self::BoostQueued { category, .. }
            | Self::BoostPromoted { category, .. }
            | Self::BoostExpired { category, .. }
            | Self::BoostCleared { category, .. }
            | Self::BusinessRemoved { category, .. } => category,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::BusinessRegistered { .. } => "business_registered",
            Self::BoostActivated { .. } => "boost_activated",
            Self::BoostQueued { .. } => "boost_queued",
            Self::BoostPromoted { .. } => "boost_promoted",
            Self::BoostExpired { .. } => "boost_expired",
            Self::BoostCleared { .. } => "boost_cleared",
            Self::BusinessRemoved { .. } => "business_removed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn slug(raw: &str) -> CategorySlug {
        let Ok(slug) = CategorySlug::new(raw) else {
            panic!("valid slug rejected");
        };
        slug
    }

    #[test]
    fn activated_event_type() {
        let now = Utc::now();
        let event = BoostEvent::BoostActivated {
            business_id: BusinessId::new(),
            category: slug("restaurants"),
            starts_at: now,
            ends_at: now + chrono::Duration::hours(24),
            timestamp: now,
        };
        assert_eq!(event.event_type_str(), "boost_activated");
    }

    #[test]
    fn queued_event_serializes_with_tag() {
        let now = Utc::now();
        let event = BoostEvent::BoostQueued {
            business_id: BusinessId::new(),
            category: slug("plumbers"),
            starts_at: now,
            ends_at: now + chrono::Duration::hours(24),
            position: 0,
            timestamp: now,
        };
        let json = serde_json::to_string(&event);
        let Ok(json) = json else {
            panic!("serialization failed");
        };
        assert!(json.contains("boost_queued"));
        assert!(json.contains("plumbers"));
    }

    #[test]
    fn accessors_cover_all_variants() {
        let id = BusinessId::new();
        let event = BoostEvent::BoostExpired {
            business_id: id,
            category: slug("bakeries"),
            ended_at: Utc::now(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.business_id(), id);
        assert_eq!(event.category().as_str(), "bakeries");
    }
}
