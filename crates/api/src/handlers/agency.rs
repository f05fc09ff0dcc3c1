//! Handlers for the `/agencies` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use itinera_core::error::CoreError;
use itinera_core::types::DbId;
use itinera_core::validation::{validate_email, validate_required};
use itinera_db::models::agency::{Agency, CreateAgency};
use itinera_db::repositories::AgencyRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::tenant::AgencyScope;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/agencies
///
/// Onboard a new agency. Not tenant-scoped: the new id is what callers
/// send as `x-agency-id` afterwards.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAgency>,
) -> AppResult<(StatusCode, Json<DataResponse<Agency>>)> {
    validate_required("name", &input.name)?;
    if let Some(email) = input.contact_email.as_deref() {
        validate_email("contact_email", email)?;
    }

    let agency = AgencyRepo::create(&state.pool, &input).await?;
    tracing::info!(agency_id = agency.id, name = %agency.name, "Agency created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: agency })))
}

/// GET /api/v1/agencies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Agency>>> {
    scope.ensure_owns(id, "Agency", id)?;
    let agency = AgencyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Agency",
            id,
        }))?;
    Ok(Json(DataResponse { data: agency }))
}
