//! Route definitions for itineraries addressed by id.
//!
//! ```text
//! GET          /{id}               get_by_id
//! PUT, DELETE  /{id}/edited-pdf    record_edited_pdf, clear_edited_pdf
//! PUT          /{id}/activate      activate
//! POST         /{id}/share         share::share_itinerary
//! GET          /{id}/shares        share::list_shares
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{itinerary, share};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(itinerary::get_by_id))
        .route(
            "/{id}/edited-pdf",
            put(itinerary::record_edited_pdf).delete(itinerary::clear_edited_pdf),
        )
        .route("/{id}/activate", put(itinerary::activate))
        .route("/{id}/share", post(share::share_itinerary))
        .route("/{id}/shares", get(share::list_shares))
}
