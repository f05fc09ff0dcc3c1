//! Repository for the `itineraries` table.

use chrono::Utc;
use itinera_core::pdf_version::{
    retire_version, with_active_version, PdfVersionEntry, PdfVersionKind,
};
use itinera_core::types::DbId;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::models::itinerary::{CreateItinerary, Itinerary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, enquiry_id, title, pdf_url, edited_pdf_url, pdf_versions, \
    active_status, date_generated, edited_at, last_pdf_regenerated_at, created_at, updated_at";

/// Same columns qualified with the `i.` alias, for joins.
const QUALIFIED_COLUMNS: &str = "i.id, i.enquiry_id, i.title, i.pdf_url, i.edited_pdf_url, \
    i.pdf_versions, i.active_status, i.date_generated, i.edited_at, i.last_pdf_regenerated_at, \
    i.created_at, i.updated_at";

/// An itinerary row together with the agency that owns its enquiry.
#[derive(Debug, Clone, FromRow)]
pub struct AgencyItinerary {
    pub agency_id: DbId,
    #[sqlx(flatten)]
    pub itinerary: Itinerary,
}

/// Provides CRUD and PDF-state operations for itineraries.
pub struct ItineraryRepo;

impl ItineraryRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a generated itinerary.
    ///
    /// When `date_generated` is `None` but a `pdf_url` is given, the
    /// generation time defaults to now.
    pub async fn create(pool: &PgPool, input: &CreateItinerary) -> Result<Itinerary, sqlx::Error> {
        let query = format!(
            "INSERT INTO itineraries (enquiry_id, title, pdf_url, pdf_versions, date_generated)
             VALUES (
                $1, $2, $3, $4,
                COALESCE($5, CASE WHEN $3::TEXT IS NOT NULL THEN NOW() END)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Itinerary>(&query)
            .bind(input.enquiry_id)
            .bind(&input.title)
            .bind(&input.pdf_url)
            .bind(&input.pdf_versions)
            .bind(input.date_generated)
            .fetch_one(pool)
            .await
    }

    /// Find an itinerary by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Itinerary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM itineraries WHERE id = $1");
        sqlx::query_as::<_, Itinerary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all itineraries of an enquiry in insertion order.
    ///
    /// Ranking by activity is left to the resolver.
    pub async fn list_by_enquiry(
        pool: &PgPool,
        enquiry_id: DbId,
    ) -> Result<Vec<Itinerary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM itineraries WHERE enquiry_id = $1 ORDER BY id");
        sqlx::query_as::<_, Itinerary>(&query)
            .bind(enquiry_id)
            .fetch_all(pool)
            .await
    }

    /// List every itinerary with its owning agency, grouped by enquiry.
    pub async fn list_all_with_agency(pool: &PgPool) -> Result<Vec<AgencyItinerary>, sqlx::Error> {
        let query = format!(
            "SELECT e.agency_id, {QUALIFIED_COLUMNS}
             FROM itineraries i
             JOIN enquiries e ON e.id = i.enquiry_id
             ORDER BY e.agency_id, i.enquiry_id, i.id"
        );
        sqlx::query_as::<_, AgencyItinerary>(&query)
            .fetch_all(pool)
            .await
    }

    /// Return the agency that owns an itinerary (via its enquiry).
    pub async fn find_agency_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT e.agency_id FROM itineraries i
             JOIN enquiries e ON e.id = i.enquiry_id
             WHERE i.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    // ── PDF state ────────────────────────────────────────────────────

    /// Record a regenerated PDF after manual edits.
    ///
    /// Sets `edited_pdf_url` and stamps both `edited_at` and
    /// `last_pdf_regenerated_at`. Stored `pdf_versions` gain the new document
    /// as their only active entry. Returns `None` if the itinerary does not
    /// exist.
    pub async fn record_regenerated_pdf(
        pool: &PgPool,
        id: DbId,
        edited_pdf_url: &str,
    ) -> Result<Option<Itinerary>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock(&mut tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let now = Utc::now();
        let versions = with_active_version(
            current.pdf_versions.as_ref(),
            &PdfVersionEntry {
                kind: PdfVersionKind::Edited,
                url: edited_pdf_url.to_string(),
                created_at: Some(now),
                is_active: true,
            },
        );

        let query = format!(
            "UPDATE itineraries SET
                edited_pdf_url = $2,
                edited_at = $3,
                last_pdf_regenerated_at = $3,
                pdf_versions = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let itinerary = sqlx::query_as::<_, Itinerary>(&query)
            .bind(id)
            .bind(edited_pdf_url)
            .bind(now)
            .bind(versions)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(itinerary))
    }

    /// Drop the edited PDF so the original becomes current again.
    ///
    /// The edited document leaves stored `pdf_versions` and the original is
    /// flagged active there. `last_pdf_regenerated_at` is kept as activity
    /// history.
    pub async fn clear_edited_pdf(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Itinerary>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = Self::lock(&mut tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let record = current.to_record();
        let retired = retire_version(current.pdf_versions.as_ref(), record.edited_pdf());
        let versions = match record.original_pdf() {
            Some(url) => with_active_version(
                retired.as_ref(),
                &PdfVersionEntry {
                    kind: PdfVersionKind::Original,
                    url: url.to_string(),
                    created_at: record.date_generated.or(record.created_at),
                    is_active: true,
                },
            ),
            None => retired,
        };

        let query = format!(
            "UPDATE itineraries SET edited_pdf_url = NULL, edited_at = NULL, pdf_versions = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let itinerary = sqlx::query_as::<_, Itinerary>(&query)
            .bind(id)
            .bind(versions)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(itinerary))
    }

    /// Load an itinerary and hold its row lock for the rest of `tx`.
    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Itinerary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM itineraries WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Itinerary>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    // ── Activation ───────────────────────────────────────────────────

    /// Mark an itinerary as the active one for its enquiry, deactivating any
    /// sibling in the same transaction. Concurrent calls for itineraries of
    /// the same enquiry queue on the enquiry row lock.
    ///
    /// Returns `None` if the itinerary does not exist.
    pub async fn set_active(pool: &PgPool, id: DbId) -> Result<Option<Itinerary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Lock the parent enquiry so activations of sibling itineraries
        // serialize before any of them deactivates the others.
        let enquiry_id: Option<(DbId,)> = sqlx::query_as(
            "SELECT e.id FROM enquiries e
             JOIN itineraries i ON i.enquiry_id = e.id
             WHERE i.id = $1
             FOR UPDATE OF e",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((enquiry_id,)) = enquiry_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE itineraries SET active_status = false \
             WHERE enquiry_id = $1 AND active_status = true AND id <> $2",
        )
        .bind(enquiry_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE itineraries SET active_status = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let itinerary = sqlx::query_as::<_, Itinerary>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(itinerary_id = id, enquiry_id, "Itinerary activated");
        Ok(Some(itinerary))
    }
}
