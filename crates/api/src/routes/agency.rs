//! Route definitions for agencies (tenants).
//!
//! ```text
//! POST /          create
//! GET  /{id}      get_by_id
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::agency;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(agency::create))
        .route("/{id}", get(agency::get_by_id))
}
