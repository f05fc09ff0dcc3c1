//! Repository for the `dmcs` table.

use itinera_core::types::DbId;
use sqlx::PgPool;

use crate::models::dmc::{CreateDmc, Dmc};

const COLUMNS: &str = "id, agency_id, name, email, region, created_at, updated_at";

/// Provides CRUD operations for Destination Management Companies.
pub struct DmcRepo;

impl DmcRepo {
    /// Insert a new DMC. Fails with `uq_dmcs_agency_email` on a duplicate email.
    pub async fn create(pool: &PgPool, input: &CreateDmc) -> Result<Dmc, sqlx::Error> {
        let query = format!(
            "INSERT INTO dmcs (agency_id, name, email, region)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dmc>(&query)
            .bind(input.agency_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.region)
            .fetch_one(pool)
            .await
    }

    /// Find a DMC by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dmc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dmcs WHERE id = $1");
        sqlx::query_as::<_, Dmc>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an agency's DMCs ordered by name.
    pub async fn list_by_agency(pool: &PgPool, agency_id: DbId) -> Result<Vec<Dmc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dmcs WHERE agency_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Dmc>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }
}
