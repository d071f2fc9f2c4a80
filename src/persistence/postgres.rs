//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{RecordSnapshot, StoredBoostEvent};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool using the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the pool cannot be
    /// established.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        business_id: Uuid,
        category: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO boost_events (business_id, category, event_type, payload) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(business_id)
        .bind(category)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Saves a boost record snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_record_snapshot(
        &self,
        business_id: Uuid,
        category: &str,
        record_json: &serde_json::Value,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO boost_records (business_id, category, record_json) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(business_id)
        .bind(category)
        .bind(record_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Loads the latest snapshot for each business using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<RecordSnapshot>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (business_id) id, business_id, category, record_json, snapshot_at \
             FROM boost_records ORDER BY business_id, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, business_id, category, record_json, snapshot_at)| RecordSnapshot {
                    id,
                    business_id,
                    category,
                    record_json,
                    snapshot_at,
                },
            )
            .collect())
    }

    /// Loads events after the given timestamp, optionally filtered by
    /// business ID.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_events_after(
        &self,
        after: DateTime<Utc>,
        business_id: Option<Uuid>,
    ) -> Result<Vec<StoredBoostEvent>, GatewayError> {
        let rows = if let Some(bid) = business_id {
            sqlx::query_as::<_, (i64, Uuid, String, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, business_id, category, event_type, payload, created_at \
                 FROM boost_events WHERE created_at > $1 AND business_id = $2 \
                 ORDER BY created_at ASC",
            )
            .bind(after)
            .bind(bid)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (i64, Uuid, String, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, business_id, category, event_type, payload, created_at \
                 FROM boost_events WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, business_id, category, event_type, payload, created_at)| StoredBoostEvent {
                    id,
                    business_id,
                    category,
                    event_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes snapshots older than the given number of days before `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(
        &self,
        now: DateTime<Utc>,
        before_days: u64,
    ) -> Result<u64, GatewayError> {
        let cutoff = now - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM boost_records WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
