//! Integration tests for itinerary persistence and PDF-state operations.
//!
//! Exercises `ItineraryRepo` against a real database:
//! - Create with defaulted `date_generated`
//! - `record_regenerated_pdf` stamps edit/regeneration times
//! - `clear_edited_pdf` reverts to the original PDF
//! - Stored `pdf_versions` follow regeneration and clearing
//! - `set_active` keeps a single active itinerary per enquiry, also under
//!   concurrent activation of siblings
//! - `list_all_with_agency` joins the owning agency
//! - Rows convert into resolver records consistently

use itinera_core::pdf_version::{build_version_list, classify, DisplayVersion};
use itinera_db::models::agency::CreateAgency;
use itinera_db::models::enquiry::CreateEnquiry;
use itinera_db::models::itinerary::CreateItinerary;
use itinera_db::repositories::{AgencyRepo, EnquiryRepo, ItineraryRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup_enquiry(pool: &PgPool, suffix: &str) -> (i64, i64) {
    let agency = AgencyRepo::create(
        pool,
        &CreateAgency {
            name: format!("Agency {suffix}"),
            contact_email: None,
        },
    )
    .await
    .unwrap();
    let enquiry = EnquiryRepo::create(
        pool,
        &CreateEnquiry {
            agency_id: agency.id,
            customer_name: format!("Customer {suffix}"),
            customer_email: Some("guest@example.com".to_string()),
            destination: Some("Bali".to_string()),
            travel_start: None,
        },
    )
    .await
    .unwrap();
    (agency.id, enquiry.id)
}

fn new_itinerary(enquiry_id: i64, title: &str, pdf_url: Option<&str>) -> CreateItinerary {
    CreateItinerary {
        enquiry_id,
        title: title.to_string(),
        pdf_url: pdf_url.map(String::from),
        pdf_versions: None,
        date_generated: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_defaults_date_generated_only_with_pdf(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "create").await;

    let with_pdf = ItineraryRepo::create(
        &pool,
        &new_itinerary(enquiry_id, "Plan A", Some("https://cdn/a.pdf")),
    )
    .await
    .unwrap();
    assert!(with_pdf.date_generated.is_some());
    assert!(!with_pdf.active_status);
    assert!(with_pdf.edited_pdf_url.is_none());

    let without_pdf = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, "Plan B", None))
        .await
        .unwrap();
    assert!(without_pdf.date_generated.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_regenerated_pdf(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "regen").await;
    let created = ItineraryRepo::create(
        &pool,
        &new_itinerary(enquiry_id, "Plan", Some("https://cdn/original.pdf")),
    )
    .await
    .unwrap();

    let updated = ItineraryRepo::record_regenerated_pdf(&pool, created.id, "https://cdn/edited.pdf")
        .await
        .unwrap()
        .expect("itinerary should exist");

    assert_eq!(updated.edited_pdf_url.as_deref(), Some("https://cdn/edited.pdf"));
    assert_eq!(updated.pdf_url.as_deref(), Some("https://cdn/original.pdf"));
    assert!(updated.edited_at.is_some());
    assert!(updated.last_pdf_regenerated_at.is_some());

    let c = classify(&updated.to_record());
    assert!(c.is_edited);
    assert_eq!(c.active_pdf_url.as_deref(), Some("https://cdn/edited.pdf"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_regenerated_pdf_missing_row(pool: PgPool) {
    let result = ItineraryRepo::record_regenerated_pdf(&pool, 999_999, "https://cdn/x.pdf")
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clear_edited_pdf_reverts_to_original(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "clear").await;
    let created = ItineraryRepo::create(
        &pool,
        &new_itinerary(enquiry_id, "Plan", Some("https://cdn/original.pdf")),
    )
    .await
    .unwrap();
    ItineraryRepo::record_regenerated_pdf(&pool, created.id, "https://cdn/edited.pdf")
        .await
        .unwrap();

    let reverted = ItineraryRepo::clear_edited_pdf(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reverted.edited_pdf_url.is_none());
    assert!(reverted.edited_at.is_none());
    assert!(reverted.last_pdf_regenerated_at.is_some());
    assert_eq!(
        classify(&reverted.to_record()).display_version,
        DisplayVersion::GeneratedOriginal
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stored_versions_follow_regeneration_and_clear(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "versions").await;
    let mut input = new_itinerary(enquiry_id, "Plan", Some("https://cdn/o.pdf"));
    input.pdf_versions = Some(serde_json::json!([
        { "type": "original", "url": "https://cdn/o.pdf", "createdAt": "2024-05-01", "isActive": true },
        { "type": "edited", "url": "https://cdn/e1.pdf", "createdAt": "2024-05-02", "isActive": false }
    ]));
    let created = ItineraryRepo::create(&pool, &input).await.unwrap();

    let regenerated = ItineraryRepo::record_regenerated_pdf(&pool, created.id, "https://cdn/e2.pdf")
        .await
        .unwrap()
        .unwrap();
    let record = regenerated.to_record();
    let versions = build_version_list(&record);
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[0].url, "https://cdn/e2.pdf");
    let active: Vec<_> = versions.iter().filter(|v| v.is_active).map(|v| v.url.as_str()).collect();
    assert_eq!(active, vec!["https://cdn/e2.pdf"]);
    assert_eq!(classify(&record).active_pdf_url.as_deref(), Some("https://cdn/e2.pdf"));

    let cleared = ItineraryRepo::clear_edited_pdf(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    let versions = build_version_list(&cleared.to_record());
    assert!(versions.iter().all(|v| v.url != "https://cdn/e2.pdf"));
    let active: Vec<_> = versions.iter().filter(|v| v.is_active).map(|v| v.url.as_str()).collect();
    assert_eq!(active, vec!["https://cdn/o.pdf"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_regeneration_without_stored_versions_keeps_them_absent(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "no-versions").await;
    let created = ItineraryRepo::create(
        &pool,
        &new_itinerary(enquiry_id, "Plan", Some("https://cdn/o.pdf")),
    )
    .await
    .unwrap();

    let updated = ItineraryRepo::record_regenerated_pdf(&pool, created.id, "https://cdn/e.pdf")
        .await
        .unwrap()
        .unwrap();
    assert!(updated.pdf_versions.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_active_is_exclusive_within_enquiry(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "active").await;
    let (_, other_enquiry_id) = setup_enquiry(&pool, "active-other").await;

    let first = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, "One", None))
        .await
        .unwrap();
    let second = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, "Two", None))
        .await
        .unwrap();
    let elsewhere = ItineraryRepo::create(&pool, &new_itinerary(other_enquiry_id, "Other", None))
        .await
        .unwrap();

    ItineraryRepo::set_active(&pool, first.id).await.unwrap().unwrap();
    ItineraryRepo::set_active(&pool, elsewhere.id).await.unwrap().unwrap();
    let activated = ItineraryRepo::set_active(&pool, second.id)
        .await
        .unwrap()
        .unwrap();
    assert!(activated.active_status);

    let rows = ItineraryRepo::list_by_enquiry(&pool, enquiry_id).await.unwrap();
    let active: Vec<_> = rows.iter().filter(|r| r.active_status).map(|r| r.id).collect();
    assert_eq!(active, vec![second.id]);

    // Other enquiries are untouched.
    let other = ItineraryRepo::find_by_id(&pool, elsewhere.id)
        .await
        .unwrap()
        .unwrap();
    assert!(other.active_status);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_active_twice_is_idempotent(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "idem").await;
    let it = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, "One", None))
        .await
        .unwrap();

    ItineraryRepo::set_active(&pool, it.id).await.unwrap().unwrap();
    let again = ItineraryRepo::set_active(&pool, it.id).await.unwrap().unwrap();
    assert!(again.active_status);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_sibling_activations_serialize(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "race").await;
    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        let it = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, title, None))
            .await
            .unwrap();
        ids.push(it.id);
    }

    for _ in 0..10 {
        let tasks: Vec<_> = ids
            .iter()
            .map(|&id| {
                let pool = pool.clone();
                tokio::spawn(async move { ItineraryRepo::set_active(&pool, id).await })
            })
            .collect();
        for task in tasks {
            let result = task.await.unwrap();
            assert!(result.is_ok(), "activation failed: {result:?}");
        }

        let rows = ItineraryRepo::list_by_enquiry(&pool, enquiry_id).await.unwrap();
        assert_eq!(rows.iter().filter(|r| r.active_status).count(), 1);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_active_missing_row(pool: PgPool) {
    assert!(ItineraryRepo::set_active(&pool, 424_242).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_active_row_violates_unique_index(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "index").await;
    let a = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, "A", None))
        .await
        .unwrap();
    let b = ItineraryRepo::create(&pool, &new_itinerary(enquiry_id, "B", None))
        .await
        .unwrap();

    sqlx::query("UPDATE itineraries SET active_status = true WHERE id = $1")
        .bind(a.id)
        .execute(&pool)
        .await
        .unwrap();
    let err = sqlx::query("UPDATE itineraries SET active_status = true WHERE id = $1")
        .bind(b.id)
        .execute(&pool)
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_all_with_agency_and_find_agency_id(pool: PgPool) {
    let (agency_a, enquiry_a) = setup_enquiry(&pool, "tenant-a").await;
    let (agency_b, enquiry_b) = setup_enquiry(&pool, "tenant-b").await;

    let it_a = ItineraryRepo::create(&pool, &new_itinerary(enquiry_a, "A", None))
        .await
        .unwrap();
    let it_b = ItineraryRepo::create(&pool, &new_itinerary(enquiry_b, "B", None))
        .await
        .unwrap();

    let rows = ItineraryRepo::list_all_with_agency(&pool).await.unwrap();
    assert_eq!(rows.len(), 2);
    let owner_of = |id: i64| rows.iter().find(|r| r.itinerary.id == id).unwrap().agency_id;
    assert_eq!(owner_of(it_a.id), agency_a);
    assert_eq!(owner_of(it_b.id), agency_b);

    assert_eq!(
        ItineraryRepo::find_agency_id(&pool, it_b.id).await.unwrap(),
        Some(agency_b)
    );
    assert_eq!(ItineraryRepo::find_agency_id(&pool, 0).await.unwrap(), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stored_pdf_versions_round_trip_as_json(pool: PgPool) {
    let (_, enquiry_id) = setup_enquiry(&pool, "json").await;
    let mut input = new_itinerary(enquiry_id, "Versions", Some("https://cdn/o.pdf"));
    input.pdf_versions = Some(serde_json::json!([
        { "type": "original", "url": "https://cdn/o.pdf", "isActive": true }
    ]));

    let created = ItineraryRepo::create(&pool, &input).await.unwrap();
    let record = created.to_record();
    assert!(record.pdf_versions.as_ref().unwrap().is_array());
    assert_eq!(record.created_at, Some(created.created_at));
}
