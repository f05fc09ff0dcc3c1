//! Handler for the agency share board.

use axum::extract::State;
use axum::Json;
use itinera_core::types::Timestamp;
use serde::Serialize;

use crate::background::share_board::ShareBoardEntry;
use crate::error::AppResult;
use crate::middleware::tenant::AgencyScope;
use crate::response::DataResponse;
use crate::state::AppState;

/// The calling agency's slice of the latest board snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBoardView {
    /// `None` until the first refresh has completed.
    pub generated_at: Option<Timestamp>,
    pub refresh_count: u64,
    pub enquiries: Vec<ShareBoardEntry>,
}

/// GET /api/v1/share-board
///
/// Served from the background snapshot; never queries the database.
pub async fn get(
    State(state): State<AppState>,
    scope: AgencyScope,
) -> AppResult<Json<DataResponse<ShareBoardView>>> {
    let snapshot = state.share_board.latest();
    let view = ShareBoardView {
        generated_at: snapshot.as_ref().and_then(|b| b.generated_at),
        refresh_count: state.share_board.refresh_count(),
        enquiries: snapshot
            .map(|b| b.for_agency(scope.agency_id).to_vec())
            .unwrap_or_default(),
    };
    Ok(Json(DataResponse { data: view }))
}
