use axum::routing::get;
use axum::Router;

use crate::handlers::share_board;
use crate::state::AppState;

/// Mounted at `/share-board`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(share_board::get))
}
