//! Persisted platform event rows.

use itinera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub agency_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
