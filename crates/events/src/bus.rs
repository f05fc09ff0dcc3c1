//! Broadcast bus for itinerary activity.
//!
//! Handlers publish one [`PlatformEvent`] per share or PDF-state change.
//! Subscribers (today only [`EventPersistence`](crate::EventPersistence))
//! each see every event. The bus lives in `AppState` behind an `Arc`.

use chrono::{DateTime, Utc};
use itinera_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// `source_entity_type` of events raised about an itinerary.
pub const SOURCE_ITINERARY: &str = "itinerary";

/// Events buffered per subscriber before the slowest one starts lagging.
const DEFAULT_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Something that happened to an agency's itineraries.
///
/// Mirrors a row of the `events` table. Most events come from
/// [`PlatformEvent::for_itinerary`]; the `with_*` methods fill in the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// One of the `EVENT_*` names, e.g. `"itinerary.shared"`.
    pub event_type: String,
    pub agency_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// Share dispatch details or the PDF fields after the change.
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// An event with an empty object payload and no source or agency.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            agency_id: None,
            source_entity_type: None,
            source_entity_id: None,
            payload: serde_json::json!({}),
            timestamp: Utc::now(),
        }
    }

    /// An event about one itinerary owned by `agency_id`.
    pub fn for_itinerary(
        event_type: impl Into<String>,
        agency_id: DbId,
        itinerary_id: DbId,
    ) -> Self {
        Self::new(event_type)
            .with_agency(agency_id)
            .with_source(SOURCE_ITINERARY, itinerary_id)
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_agency(mut self, agency_id: DbId) -> Self {
        self.agency_id = Some(agency_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// The itinerary this event is about, if it names one.
    pub fn itinerary_id(&self) -> Option<DbId> {
        match self.source_entity_type.as_deref() {
            Some(SOURCE_ITINERARY) => self.source_entity_id,
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Fan-out of [`PlatformEvent`]s to every subscriber.
///
/// A subscriber that falls more than the channel capacity behind loses the
/// oldest events and sees `RecvError::Lagged` on its next receive.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Hand an event to current subscribers. Dropped when nobody listens.
    pub fn publish(&self, event: PlatformEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
