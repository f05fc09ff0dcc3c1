//! Integration tests for agencies, enquiries, DMCs, the share log and events.

use itinera_db::models::agency::CreateAgency;
use itinera_db::models::dmc::CreateDmc;
use itinera_db::models::enquiry::CreateEnquiry;
use itinera_db::models::itinerary::CreateItinerary;
use itinera_db::models::itinerary_share::CreateItineraryShare;
use itinera_db::repositories::{
    AgencyRepo, DmcRepo, EnquiryRepo, EventRepo, ItineraryRepo, ItineraryShareRepo,
};
use sqlx::PgPool;

fn new_agency(name: &str) -> CreateAgency {
    CreateAgency {
        name: name.to_string(),
        contact_email: Some("ops@agency.test".to_string()),
    }
}

fn new_dmc(agency_id: i64, email: &str) -> CreateDmc {
    CreateDmc {
        agency_id,
        name: "Island Ground Handling".to_string(),
        email: email.to_string(),
        region: Some("Indonesia".to_string()),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bootstrap_health_check(pool: PgPool) {
    itinera_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enquiries_are_scoped_to_agency(pool: PgPool) {
    let a = AgencyRepo::create(&pool, &new_agency("Scoped A")).await.unwrap();
    let b = AgencyRepo::create(&pool, &new_agency("Scoped B")).await.unwrap();

    for name in ["Ana", "Ben"] {
        EnquiryRepo::create(
            &pool,
            &CreateEnquiry {
                agency_id: a.id,
                customer_name: name.to_string(),
                customer_email: None,
                destination: None,
                travel_start: None,
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(EnquiryRepo::list_by_agency(&pool, a.id).await.unwrap().len(), 2);
    assert!(EnquiryRepo::list_by_agency(&pool, b.id).await.unwrap().is_empty());
    assert_eq!(AgencyRepo::list(&pool).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_dmc_email_per_agency_is_rejected(pool: PgPool) {
    let a = AgencyRepo::create(&pool, &new_agency("DMC A")).await.unwrap();
    let b = AgencyRepo::create(&pool, &new_agency("DMC B")).await.unwrap();

    DmcRepo::create(&pool, &new_dmc(a.id, "res@dmc.test")).await.unwrap();
    // Same email under another agency is fine.
    DmcRepo::create(&pool, &new_dmc(b.id, "res@dmc.test")).await.unwrap();

    let err = DmcRepo::create(&pool, &new_dmc(a.id, "res@dmc.test"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_dmcs_agency_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_share_log_lists_newest_first(pool: PgPool) {
    let agency = AgencyRepo::create(&pool, &new_agency("Shares")).await.unwrap();
    let enquiry = EnquiryRepo::create(
        &pool,
        &CreateEnquiry {
            agency_id: agency.id,
            customer_name: "Cara".to_string(),
            customer_email: Some("cara@example.com".to_string()),
            destination: None,
            travel_start: None,
        },
    )
    .await
    .unwrap();
    let itinerary = ItineraryRepo::create(
        &pool,
        &CreateItinerary {
            enquiry_id: enquiry.id,
            title: "Plan".to_string(),
            pdf_url: Some("https://cdn/o.pdf".to_string()),
            pdf_versions: None,
            date_generated: None,
        },
    )
    .await
    .unwrap();

    let first = ItineraryShareRepo::create(
        &pool,
        &CreateItineraryShare {
            itinerary_id: itinerary.id,
            target: "customer".to_string(),
            dmc_id: None,
            recipient_email: "cara@example.com".to_string(),
            pdf_url: "https://cdn/o.pdf".to_string(),
            used_edited_pdf: false,
            message: None,
        },
    )
    .await
    .unwrap();
    let second = ItineraryShareRepo::create(
        &pool,
        &CreateItineraryShare {
            itinerary_id: itinerary.id,
            target: "customer".to_string(),
            dmc_id: None,
            recipient_email: "cara@example.com".to_string(),
            pdf_url: "https://cdn/o.pdf".to_string(),
            used_edited_pdf: false,
            message: Some("Resent".to_string()),
        },
    )
    .await
    .unwrap();

    let shares = ItineraryShareRepo::list_by_itinerary(&pool, itinerary.id)
        .await
        .unwrap();
    let ids: Vec<_> = shares.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_event_insert_and_list(pool: PgPool) {
    let payload = serde_json::json!({ "itineraryId": 1 });
    let id = EventRepo::insert(&pool, "itinerary.shared", None, Some("itinerary"), Some(1), &payload)
        .await
        .unwrap();

    let events = EventRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, id);
    assert_eq!(events[0].event_type, "itinerary.shared");
    assert_eq!(events[0].payload["itineraryId"], 1);
}
