//! Agency (tenant) entity model and DTOs.

use itinera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `agencies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agency {
    pub id: DbId,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for onboarding a new agency.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgency {
    pub name: String,
    pub contact_email: Option<String>,
}
