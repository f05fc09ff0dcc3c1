//! Repository for the `events` table.

use itinera_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::Event;

const COLUMNS: &str =
    "id, event_type, agency_id, source_entity_type, source_entity_id, payload, created_at";

/// Maximum number of events returned by [`EventRepo::list_recent`].
const MAX_LIMIT: i64 = 500;

/// Write and read persisted platform events.
pub struct EventRepo;

impl EventRepo {
    /// Insert an event row, returning its ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        agency_id: Option<DbId>,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO events (event_type, agency_id, source_entity_type, source_entity_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(event_type)
        .bind(agency_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// List the most recent events, newest first. `limit` is clamped to 1..=500.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events ORDER BY created_at DESC, id DESC LIMIT $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(limit.clamp(1, MAX_LIMIT))
            .fetch_all(pool)
            .await
    }
}
