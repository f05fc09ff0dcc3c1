//! Repository for the `agencies` table.

use itinera_core::types::DbId;
use sqlx::PgPool;

use crate::models::agency::{Agency, CreateAgency};

const COLUMNS: &str = "id, name, contact_email, created_at, updated_at";

/// Provides CRUD operations for agencies.
pub struct AgencyRepo;

impl AgencyRepo {
    /// Insert a new agency, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAgency) -> Result<Agency, sqlx::Error> {
        let query = format!(
            "INSERT INTO agencies (name, contact_email)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agency>(&query)
            .bind(&input.name)
            .bind(&input.contact_email)
            .fetch_one(pool)
            .await
    }

    /// Find an agency by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Agency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies WHERE id = $1");
        sqlx::query_as::<_, Agency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all agencies ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Agency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies ORDER BY name");
        sqlx::query_as::<_, Agency>(&query).fetch_all(pool).await
    }
}
