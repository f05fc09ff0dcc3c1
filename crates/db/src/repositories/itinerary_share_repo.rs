//! Repository for the `itinerary_shares` table.

use itinera_core::types::DbId;
use sqlx::PgPool;

use crate::models::itinerary_share::{CreateItineraryShare, ItineraryShare};

const COLUMNS: &str = "id, itinerary_id, target, dmc_id, recipient_email, pdf_url, \
    used_edited_pdf, message, created_at";

/// Append-only log of share actions.
pub struct ItineraryShareRepo;

impl ItineraryShareRepo {
    /// Record a share action.
    pub async fn create(
        pool: &PgPool,
        input: &CreateItineraryShare,
    ) -> Result<ItineraryShare, sqlx::Error> {
        let query = format!(
            "INSERT INTO itinerary_shares
                (itinerary_id, target, dmc_id, recipient_email, pdf_url, used_edited_pdf, message)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ItineraryShare>(&query)
            .bind(input.itinerary_id)
            .bind(&input.target)
            .bind(input.dmc_id)
            .bind(&input.recipient_email)
            .bind(&input.pdf_url)
            .bind(input.used_edited_pdf)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// List shares of an itinerary, newest first.
    pub async fn list_by_itinerary(
        pool: &PgPool,
        itinerary_id: DbId,
    ) -> Result<Vec<ItineraryShare>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM itinerary_shares
             WHERE itinerary_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ItineraryShare>(&query)
            .bind(itinerary_id)
            .fetch_all(pool)
            .await
    }
}
