use axum::routing::get;
use axum::Router;

use crate::handlers::dmc;
use crate::state::AppState;

/// Mounted at `/dmcs`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dmc::list).post(dmc::create))
}
