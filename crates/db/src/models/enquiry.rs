//! Customer enquiry entity model and DTOs.

use chrono::NaiveDate;
use itinera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `enquiries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enquiry {
    pub id: DbId,
    pub agency_id: DbId,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub destination: Option<String>,
    pub travel_start: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an enquiry. `agency_id` is taken from the request scope.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEnquiry {
    #[serde(default)]
    pub agency_id: DbId,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub destination: Option<String>,
    pub travel_start: Option<NaiveDate>,
}
