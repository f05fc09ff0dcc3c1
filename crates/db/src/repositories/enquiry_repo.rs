//! Repository for the `enquiries` table.

use itinera_core::types::DbId;
use sqlx::PgPool;

use crate::models::enquiry::{CreateEnquiry, Enquiry};

const COLUMNS: &str = "id, agency_id, customer_name, customer_email, destination, \
    travel_start, created_at, updated_at";

/// Provides CRUD operations for customer enquiries.
pub struct EnquiryRepo;

impl EnquiryRepo {
    /// Insert a new enquiry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEnquiry) -> Result<Enquiry, sqlx::Error> {
        let query = format!(
            "INSERT INTO enquiries (agency_id, customer_name, customer_email, destination, travel_start)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(input.agency_id)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(&input.destination)
            .bind(input.travel_start)
            .fetch_one(pool)
            .await
    }

    /// Find an enquiry by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enquiries WHERE id = $1");
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an agency's enquiries, newest first.
    pub async fn list_by_agency(pool: &PgPool, agency_id: DbId) -> Result<Vec<Enquiry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enquiries
             WHERE agency_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }
}
