//! Handlers for itineraries and their PDF versions.
//!
//! Itineraries are created under an enquiry
//! (`/enquiries/{enquiry_id}/itineraries`) and addressed directly by id
//! afterwards (`/itineraries/{id}`). Every read goes through the version
//! resolver so clients never have to decide themselves which PDF is current.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use itinera_core::error::CoreError;
use itinera_core::pdf_version::{resolve, resolve_overview, ItineraryOverview, ResolvedItinerary};
use itinera_core::types::DbId;
use itinera_core::validation::{validate_pdf_url, validate_required};
use itinera_db::models::itinerary::{CreateItinerary, Itinerary, RegeneratedPdf};
use itinera_db::repositories::ItineraryRepo;
use itinera_db::DbPool;
use itinera_events::{
    PlatformEvent, EVENT_ITINERARY_ACTIVATED, EVENT_PDF_REGENERATED, EVENT_PDF_REVERTED,
};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::enquiry;
use crate::middleware::tenant::AgencyScope;
use crate::response::DataResponse;
use crate::state::AppState;

/// An itinerary row together with its resolved PDF view.
#[derive(Debug, Serialize)]
pub struct ItineraryDetail {
    pub itinerary: Itinerary,
    pub resolved: ResolvedItinerary,
}

impl From<Itinerary> for ItineraryDetail {
    fn from(itinerary: Itinerary) -> Self {
        let resolved = resolve(&itinerary.to_record());
        Self {
            itinerary,
            resolved,
        }
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Itinerary",
        id,
    })
}

/// Load an itinerary, treating other agencies' itineraries as missing.
pub(crate) async fn find_scoped(
    pool: &DbPool,
    scope: AgencyScope,
    id: DbId,
) -> AppResult<Itinerary> {
    let agency_id = ItineraryRepo::find_agency_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    scope.ensure_owns(agency_id, "Itinerary", id)?;
    ItineraryRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Publish a PDF-state event and schedule a share board rebuild.
fn after_mutation(state: &AppState, scope: AgencyScope, event_type: &str, itinerary: &Itinerary) {
    state.event_bus.publish(
        PlatformEvent::for_itinerary(event_type, scope.agency_id, itinerary.id).with_payload(
            json!({
                "enquiryId": itinerary.enquiry_id,
                "pdfUrl": itinerary.pdf_url,
                "editedPdfUrl": itinerary.edited_pdf_url,
                "activeStatus": itinerary.active_status,
            }),
        ),
    );
    state.share_board.request_refresh();
}

/// POST /api/v1/enquiries/{enquiry_id}/itineraries
///
/// Store a generated itinerary. A blank `pdf_url` is stored as absent.
pub async fn create(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(enquiry_id): Path<DbId>,
    Json(mut input): Json<CreateItinerary>,
) -> AppResult<(StatusCode, Json<DataResponse<ItineraryDetail>>)> {
    enquiry::find_scoped(&state.pool, scope, enquiry_id).await?;

    validate_required("title", &input.title)?;
    input.pdf_url = input.pdf_url.filter(|url| !url.trim().is_empty());
    if let Some(url) = input.pdf_url.as_deref() {
        validate_pdf_url("pdf_url", url)?;
    }
    if input
        .pdf_versions
        .as_ref()
        .is_some_and(|v| !v.is_array() && !v.is_null())
    {
        return Err(AppError::BadRequest(
            "pdf_versions must be an array".to_string(),
        ));
    }

    input.enquiry_id = enquiry_id;
    let itinerary = ItineraryRepo::create(&state.pool, &input).await?;
    tracing::info!(
        itinerary_id = itinerary.id,
        enquiry_id,
        has_pdf = itinerary.pdf_url.is_some(),
        "Itinerary stored"
    );
    state.share_board.request_refresh();

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: itinerary.into(),
        }),
    ))
}

/// GET /api/v1/enquiries/{enquiry_id}/itineraries
///
/// All itineraries of the enquiry, most recently active first, with the
/// itinerary a send action would preselect.
pub async fn list_by_enquiry(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(enquiry_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ItineraryOverview>>> {
    enquiry::find_scoped(&state.pool, scope, enquiry_id).await?;

    let rows = ItineraryRepo::list_by_enquiry(&state.pool, enquiry_id).await?;
    let overview = resolve_overview(rows.into_iter().map(Into::into).collect());
    Ok(Json(DataResponse { data: overview }))
}

/// GET /api/v1/itineraries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ItineraryDetail>>> {
    let itinerary = find_scoped(&state.pool, scope, id).await?;
    Ok(Json(DataResponse {
        data: itinerary.into(),
    }))
}

/// PUT /api/v1/itineraries/{id}/edited-pdf
///
/// Record the PDF regenerated after manual edits. It becomes the PDF that
/// is displayed and sent from now on.
pub async fn record_edited_pdf(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
    Json(input): Json<RegeneratedPdf>,
) -> AppResult<Json<DataResponse<ItineraryDetail>>> {
    validate_pdf_url("edited_pdf_url", &input.edited_pdf_url)?;
    find_scoped(&state.pool, scope, id).await?;

    let itinerary =
        ItineraryRepo::record_regenerated_pdf(&state.pool, id, input.edited_pdf_url.trim())
            .await?
            .ok_or_else(|| not_found(id))?;

    tracing::info!(itinerary_id = id, "Edited PDF recorded");
    after_mutation(&state, scope, EVENT_PDF_REGENERATED, &itinerary);
    Ok(Json(DataResponse {
        data: itinerary.into(),
    }))
}

/// DELETE /api/v1/itineraries/{id}/edited-pdf
///
/// Drop the edited PDF so the original is current again.
pub async fn clear_edited_pdf(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ItineraryDetail>>> {
    let current = find_scoped(&state.pool, scope, id).await?;
    if current.edited_pdf_url.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Itinerary has no edited PDF".into(),
        )));
    }

    let itinerary = ItineraryRepo::clear_edited_pdf(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(itinerary_id = id, "Edited PDF cleared");
    after_mutation(&state, scope, EVENT_PDF_REVERTED, &itinerary);
    Ok(Json(DataResponse {
        data: itinerary.into(),
    }))
}

/// PUT /api/v1/itineraries/{id}/activate
///
/// Make this the active itinerary of its enquiry. Any previously active
/// sibling is deactivated in the same transaction.
pub async fn activate(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ItineraryDetail>>> {
    find_scoped(&state.pool, scope, id).await?;

    let itinerary = ItineraryRepo::set_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        itinerary_id = id,
        enquiry_id = itinerary.enquiry_id,
        "Itinerary activated"
    );
    after_mutation(&state, scope, EVENT_ITINERARY_ACTIVATED, &itinerary);
    Ok(Json(DataResponse {
        data: itinerary.into(),
    }))
}
