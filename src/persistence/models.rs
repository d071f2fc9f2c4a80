//! Database models for the event log and record snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored event row from the `boost_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBoostEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Business that generated the event.
    pub business_id: Uuid,
    /// Category the event belongs to.
    pub category: String,
    /// Event type discriminator (e.g. `"boost_activated"`).
    pub event_type: String,
    /// JSONB payload with event-specific data.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A record snapshot row from the `boost_records` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Business the snapshot belongs to.
    pub business_id: Uuid,
    /// Category slug at snapshot time.
    pub category: String,
    /// Full [`crate::domain::BoostRecord`] as JSONB.
    pub record_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
