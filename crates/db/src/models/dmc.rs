//! Destination Management Company entity model and DTOs.

use itinera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `dmcs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dmc {
    pub id: DbId,
    pub agency_id: DbId,
    pub name: String,
    pub email: String,
    pub region: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a DMC. `agency_id` is taken from the request scope.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDmc {
    #[serde(default)]
    pub agency_id: DbId,
    pub name: String,
    pub email: String,
    pub region: Option<String>,
}
