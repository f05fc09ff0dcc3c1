//! Log of itineraries sent to customers and DMCs.

use itinera_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `itinerary_shares` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItineraryShare {
    pub id: DbId,
    pub itinerary_id: DbId,
    pub target: String,
    pub dmc_id: Option<DbId>,
    pub recipient_email: String,
    pub pdf_url: String,
    pub used_edited_pdf: bool,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

/// Insert DTO, built by the share handler from the resolved payload.
#[derive(Debug, Clone)]
pub struct CreateItineraryShare {
    pub itinerary_id: DbId,
    pub target: String,
    pub dmc_id: Option<DbId>,
    pub recipient_email: String,
    pub pdf_url: String,
    pub used_edited_pdf: bool,
    pub message: Option<String>,
}
