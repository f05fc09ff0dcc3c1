#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use itinera_api::background::share_board;
use itinera_api::config::ServerConfig;
use itinera_api::middleware::tenant::AGENCY_HEADER;
use itinera_api::router::build_app_router;
use itinera_api::state::AppState;
use itinera_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// The share board interval is long so tests only see refreshes they
/// trigger themselves (plus the initial one).
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        share_board_refresh_secs: 3600,
    }
}

/// Build application state with a live share board refresher.
pub fn build_test_state(pool: PgPool) -> AppState {
    let config = test_config();
    let (share_board, _task) =
        share_board::start(pool.clone(), config.share_board_interval(), &CancellationToken::new());

    AppState {
        pool,
        config: Arc::new(config),
        event_bus: Arc::new(EventBus::default()),
        share_board,
    }
}

/// Build the full application router, with the same middleware stack as
/// production, around the given state.
pub fn build_app(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_app(build_test_state(pool))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    agency_id: Option<i64>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = agency_id {
        builder = builder.header(AGENCY_HEADER, id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, agency_id: i64, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(agency_id), None).await
}

pub async fn post_json_as(app: Router, agency_id: i64, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(agency_id), Some(body)).await
}

pub async fn put_json_as(app: Router, agency_id: i64, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(agency_id), Some(body)).await
}

pub async fn put_as(app: Router, agency_id: i64, uri: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(agency_id), None).await
}

pub async fn delete_as(app: Router, agency_id: i64, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(agency_id), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the `data` field of the envelope.
pub async fn expect_data(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let mut json = body_json(response).await;
    json["data"].take()
}

// ---------------------------------------------------------------------------
// Fixtures created through the API
// ---------------------------------------------------------------------------

pub async fn create_agency(app: &Router, name: &str) -> i64 {
    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/agencies",
        None,
        Some(json!({ "name": name, "contact_email": "ops@agency.test" })),
    )
    .await;
    expect_data(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap()
}

pub async fn create_enquiry(app: &Router, agency_id: i64, customer_email: Option<&str>) -> i64 {
    let response = post_json_as(
        app.clone(),
        agency_id,
        "/api/v1/enquiries",
        json!({
            "customer_name": "Dana Traveller",
            "customer_email": customer_email,
            "destination": "Bali",
        }),
    )
    .await;
    expect_data(response, StatusCode::CREATED).await["id"]
        .as_i64()
        .unwrap()
}

pub async fn create_itinerary(
    app: &Router,
    agency_id: i64,
    enquiry_id: i64,
    title: &str,
    pdf_url: Option<&str>,
) -> i64 {
    let response = post_json_as(
        app.clone(),
        agency_id,
        &format!("/api/v1/enquiries/{enquiry_id}/itineraries"),
        json!({ "title": title, "pdf_url": pdf_url }),
    )
    .await;
    expect_data(response, StatusCode::CREATED).await["itinerary"]["id"]
        .as_i64()
        .unwrap()
}

pub async fn record_edited_pdf(app: &Router, agency_id: i64, itinerary_id: i64, url: &str) {
    let response = put_json_as(
        app.clone(),
        agency_id,
        &format!("/api/v1/itineraries/{itinerary_id}/edited-pdf"),
        json!({ "edited_pdf_url": url }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Poll until `check` passes or the timeout elapses.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
