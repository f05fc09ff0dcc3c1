//! Route definitions for enquiries and their itineraries.
//!
//! ```text
//! GET, POST  /                             list, create
//! GET        /{id}                         get_by_id
//! GET, POST  /{id}/itineraries             itinerary::list_by_enquiry, itinerary::create
//! POST       /{id}/share                   share::share_default
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{enquiry, itinerary, share};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(enquiry::list).post(enquiry::create))
        .route("/{id}", get(enquiry::get_by_id))
        .route(
            "/{id}/itineraries",
            get(itinerary::list_by_enquiry).post(itinerary::create),
        )
        .route("/{id}/share", post(share::share_default))
}
