//! Handlers for the `/enquiries` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use itinera_core::error::CoreError;
use itinera_core::types::DbId;
use itinera_core::validation::{validate_email, validate_required};
use itinera_db::models::enquiry::{CreateEnquiry, Enquiry};
use itinera_db::repositories::{AgencyRepo, EnquiryRepo};
use itinera_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::tenant::AgencyScope;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load an enquiry, treating other agencies' enquiries as missing.
pub(crate) async fn find_scoped(
    pool: &DbPool,
    scope: AgencyScope,
    id: DbId,
) -> AppResult<Enquiry> {
    let enquiry = EnquiryRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enquiry",
            id,
        }))?;
    scope.ensure_owns(enquiry.agency_id, "Enquiry", id)?;
    Ok(enquiry)
}

/// POST /api/v1/enquiries
pub async fn create(
    State(state): State<AppState>,
    scope: AgencyScope,
    Json(mut input): Json<CreateEnquiry>,
) -> AppResult<(StatusCode, Json<DataResponse<Enquiry>>)> {
    validate_required("customer_name", &input.customer_name)?;
    if let Some(email) = input.customer_email.as_deref() {
        validate_email("customer_email", email)?;
    }

    AgencyRepo::find_by_id(&state.pool, scope.agency_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Agency",
            id: scope.agency_id,
        }))?;

    input.agency_id = scope.agency_id;
    let enquiry = EnquiryRepo::create(&state.pool, &input).await?;
    tracing::info!(
        enquiry_id = enquiry.id,
        agency_id = scope.agency_id,
        "Enquiry created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: enquiry })))
}

/// GET /api/v1/enquiries
pub async fn list(
    State(state): State<AppState>,
    scope: AgencyScope,
) -> AppResult<Json<DataResponse<Vec<Enquiry>>>> {
    let enquiries = EnquiryRepo::list_by_agency(&state.pool, scope.agency_id).await?;
    Ok(Json(DataResponse { data: enquiries }))
}

/// GET /api/v1/enquiries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Enquiry>>> {
    let enquiry = find_scoped(&state.pool, scope, id).await?;
    Ok(Json(DataResponse { data: enquiry }))
}
