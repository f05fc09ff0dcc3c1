//! Itinera event bus and event persistence.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the canonical domain event envelope.
//! - [`EventPersistence`]: background service that durably writes every
//!   event to the `events` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent, SOURCE_ITINERARY};
pub use persistence::EventPersistence;

/// An itinerary PDF was sent to a customer or a DMC.
pub const EVENT_ITINERARY_SHARED: &str = "itinerary.shared";

/// An itinerary became the active one for its enquiry.
pub const EVENT_ITINERARY_ACTIVATED: &str = "itinerary.activated";

/// An edited PDF was regenerated for an itinerary.
pub const EVENT_PDF_REGENERATED: &str = "itinerary.pdf_regenerated";

/// The edited PDF was dropped and the original is current again.
pub const EVENT_PDF_REVERTED: &str = "itinerary.pdf_reverted";

/// Every event name published by the API.
pub const ITINERARY_EVENTS: [&str; 4] = [
    EVENT_ITINERARY_SHARED,
    EVENT_ITINERARY_ACTIVATED,
    EVENT_PDF_REGENERATED,
    EVENT_PDF_REVERTED,
];
