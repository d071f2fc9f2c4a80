//! Persistence layer: PostgreSQL event log and record snapshots.
//!
//! The concrete store uses `sqlx::PgPool` for async PostgreSQL access. A
//! background worker feeds the event log from the bus and snapshots boost
//! records periodically; the latest snapshots are restored into the
//! registry at startup.

pub mod models;
pub mod postgres;
pub mod worker;
