//! Writes bus events into the `events` table.
//!
//! The table is the audit trail of shares and PDF changes per agency, so
//! every event is stored as published. Write failures and lag are logged
//! and the loop keeps going; it ends once the bus is dropped.

use itinera_core::types::DbId;
use itinera_db::repositories::EventRepo;
use itinera_db::DbPool;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

use crate::bus::PlatformEvent;

/// The subscriber that stores events. Spawned once from `main`.
pub struct EventPersistence;

impl EventPersistence {
    /// Store events from `receiver` until the bus closes.
    pub async fn run(pool: DbPool, mut receiver: Receiver<PlatformEvent>) {
        let mut stored: u64 = 0;
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event log fell behind; events were not stored");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match Self::persist(&pool, &event).await {
                Ok(_) => stored += 1,
                Err(e) => tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    agency_id = ?event.agency_id,
                    itinerary_id = ?event.itinerary_id(),
                    "Failed to store event"
                ),
            }
        }
        tracing::info!(stored, "Event bus closed, event log stopped");
    }

    /// Store one event and return its row id.
    pub async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.event_type,
            event.agency_id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            &event.payload,
        )
        .await
    }
}
