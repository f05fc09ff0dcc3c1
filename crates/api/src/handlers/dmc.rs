//! Handlers for the `/dmcs` resource (destination management companies).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use itinera_core::error::CoreError;
use itinera_core::types::DbId;
use itinera_core::validation::{validate_email, validate_required};
use itinera_db::models::dmc::{CreateDmc, Dmc};
use itinera_db::repositories::{AgencyRepo, DmcRepo};
use itinera_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::tenant::AgencyScope;
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) async fn find_scoped(pool: &DbPool, scope: AgencyScope, id: DbId) -> AppResult<Dmc> {
    let dmc = DmcRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dmc", id }))?;
    scope.ensure_owns(dmc.agency_id, "Dmc", id)?;
    Ok(dmc)
}

/// POST /api/v1/dmcs
///
/// Returns 409 if the agency already has a DMC with this email.
pub async fn create(
    State(state): State<AppState>,
    scope: AgencyScope,
    Json(mut input): Json<CreateDmc>,
) -> AppResult<(StatusCode, Json<DataResponse<Dmc>>)> {
    validate_required("name", &input.name)?;
    validate_email("email", &input.email)?;

    AgencyRepo::find_by_id(&state.pool, scope.agency_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Agency",
            id: scope.agency_id,
        }))?;

    input.agency_id = scope.agency_id;
    let dmc = DmcRepo::create(&state.pool, &input).await?;
    tracing::info!(dmc_id = dmc.id, agency_id = scope.agency_id, "DMC registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: dmc })))
}

/// GET /api/v1/dmcs
pub async fn list(
    State(state): State<AppState>,
    scope: AgencyScope,
) -> AppResult<Json<DataResponse<Vec<Dmc>>>> {
    let dmcs = DmcRepo::list_by_agency(&state.pool, scope.agency_id).await?;
    Ok(Json(DataResponse { data: dmcs }))
}
