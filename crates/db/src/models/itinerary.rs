//! Itinerary entity model and DTOs.

use itinera_core::pdf_version::ItineraryRecord;
use itinera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `itineraries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Itinerary {
    pub id: DbId,
    pub enquiry_id: DbId,
    pub title: String,
    pub pdf_url: Option<String>,
    pub edited_pdf_url: Option<String>,
    pub pdf_versions: Option<serde_json::Value>,
    pub active_status: bool,
    pub date_generated: Option<Timestamp>,
    pub edited_at: Option<Timestamp>,
    pub last_pdf_regenerated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Itinerary {
    /// The PDF-related view of this row used by the version resolver.
    pub fn to_record(&self) -> ItineraryRecord {
        ItineraryRecord::from(self.clone())
    }
}

impl From<Itinerary> for ItineraryRecord {
    fn from(row: Itinerary) -> Self {
        ItineraryRecord {
            id: row.id,
            pdf_url: row.pdf_url,
            edited_pdf_url: row.edited_pdf_url,
            edited_at: row.edited_at,
            updated_at: Some(row.updated_at),
            last_pdf_regenerated_at: row.last_pdf_regenerated_at,
            created_at: Some(row.created_at),
            date_generated: row.date_generated,
            active_status: row.active_status,
            pdf_versions: row.pdf_versions,
        }
    }
}

/// DTO for storing a generated itinerary. `enquiry_id` comes from the URL.
///
/// If `date_generated` is `None` and `pdf_url` is set, the database time is used.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItinerary {
    #[serde(default)]
    pub enquiry_id: DbId,
    pub title: String,
    pub pdf_url: Option<String>,
    pub pdf_versions: Option<serde_json::Value>,
    pub date_generated: Option<Timestamp>,
}

/// DTO for recording a regenerated (edited) PDF.
#[derive(Debug, Clone, Deserialize)]
pub struct RegeneratedPdf {
    pub edited_pdf_url: String,
}
