pub mod agency;
pub mod dmc;
pub mod enquiry;
pub mod health;
pub mod itinerary;
pub mod share_board;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /agencies                                  create (unscoped)
/// /agencies/{id}                             get
///
/// /enquiries                                 list, create
/// /enquiries/{id}                            get
/// /enquiries/{id}/itineraries                list (resolved overview), create
/// /enquiries/{id}/share                      share default itinerary (POST)
///
/// /itineraries/{id}                          get (with resolved PDF view)
/// /itineraries/{id}/edited-pdf               record (PUT), clear (DELETE)
/// /itineraries/{id}/activate                 make active in enquiry (PUT)
/// /itineraries/{id}/share                    share this itinerary (POST)
/// /itineraries/{id}/shares                   share history
///
/// /dmcs                                      list, create
///
/// /share-board                               latest share readiness snapshot
/// ```
///
/// Everything except `POST /agencies` requires the `x-agency-id` header.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/agencies", agency::router())
        .nest("/enquiries", enquiry::router())
        .nest("/itineraries", itinerary::router())
        .nest("/dmcs", dmc::router())
        .nest("/share-board", share_board::router())
}
