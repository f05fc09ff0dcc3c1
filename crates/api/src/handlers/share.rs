//! Handlers for sending itinerary PDFs to customers and DMCs.
//!
//! Both entry points resolve the PDF through the version resolver, so an
//! edited PDF is always sent in preference to the original. The resolved
//! [`SharePayload`] is logged to `itinerary_shares` and published as an
//! `itinerary.shared` event; delivery itself happens downstream.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use itinera_core::error::CoreError;
use itinera_core::share::{
    build_share_payload, select_for_sharing, SharePayload, ShareRequest, ShareTarget,
};
use itinera_core::types::DbId;
use itinera_db::models::itinerary::Itinerary;
use itinera_db::models::itinerary_share::{CreateItineraryShare, ItineraryShare};
use itinera_db::repositories::{EnquiryRepo, ItineraryRepo, ItineraryShareRepo};
use itinera_events::{PlatformEvent, EVENT_ITINERARY_SHARED};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::{dmc, enquiry, itinerary};
use crate::middleware::tenant::AgencyScope;
use crate::response::DataResponse;
use crate::state::AppState;

/// The logged share and the payload handed to dispatch.
#[derive(Debug, Serialize)]
pub struct ShareResult {
    pub share: ItineraryShare,
    pub payload: SharePayload,
}

/// POST /api/v1/itineraries/{id}/share
///
/// Share one specific itinerary. Returns 400 with
/// "No itinerary available to send" when it has no PDF at all.
pub async fn share_itinerary(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
    Json(request): Json<ShareRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ShareResult>>)> {
    request.check()?;
    let itinerary = itinerary::find_scoped(&state.pool, scope, id).await?;
    let payload = build_share_payload(&itinerary.to_record())?;

    let result = dispatch(&state, scope, &itinerary, &request, payload).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /api/v1/enquiries/{enquiry_id}/share
///
/// Share the enquiry's default itinerary (active first, then most recent,
/// edited PDFs preferred).
pub async fn share_default(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(enquiry_id): Path<DbId>,
    Json(request): Json<ShareRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ShareResult>>)> {
    request.check()?;
    enquiry::find_scoped(&state.pool, scope, enquiry_id).await?;

    let rows = ItineraryRepo::list_by_enquiry(&state.pool, enquiry_id).await?;
    let payload = select_for_sharing(rows.iter().map(Itinerary::to_record).collect())?;
    let itinerary = rows
        .into_iter()
        .find(|row| row.id == payload.itinerary_id)
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "selected itinerary {} missing from enquiry {enquiry_id}",
                payload.itinerary_id
            ))
        })?;

    let result = dispatch(&state, scope, &itinerary, &request, payload).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/itineraries/{id}/shares
///
/// Share history of an itinerary, newest first.
pub async fn list_shares(
    State(state): State<AppState>,
    scope: AgencyScope,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ItineraryShare>>>> {
    itinerary::find_scoped(&state.pool, scope, id).await?;
    let shares = ItineraryShareRepo::list_by_itinerary(&state.pool, id).await?;
    Ok(Json(DataResponse { data: shares }))
}

/// Resolve the recipient, log the share and publish the event.
async fn dispatch(
    state: &AppState,
    scope: AgencyScope,
    itinerary: &Itinerary,
    request: &ShareRequest,
    payload: SharePayload,
) -> AppResult<ShareResult> {
    let recipient_email = match request.target {
        ShareTarget::Customer => match request.recipient_email.clone() {
            Some(email) => email,
            None => EnquiryRepo::find_by_id(&state.pool, itinerary.enquiry_id)
                .await?
                .and_then(|e| e.customer_email)
                .ok_or_else(|| {
                    CoreError::Validation(
                        "Enquiry has no customer email; provide recipient_email".into(),
                    )
                })?,
        },
        ShareTarget::Dmc => {
            let dmc_id = request
                .dmc_id
                .ok_or_else(|| CoreError::Validation("dmc_id is required".into()))?;
            dmc::find_scoped(&state.pool, scope, dmc_id).await?.email
        }
    };

    let share = ItineraryShareRepo::create(
        &state.pool,
        &CreateItineraryShare {
            itinerary_id: payload.itinerary_id,
            target: request.target.as_str().to_string(),
            dmc_id: request.dmc_id,
            recipient_email,
            pdf_url: payload.pdf_url_to_send.clone(),
            used_edited_pdf: payload.use_edited_pdf,
            message: request.message.clone(),
        },
    )
    .await?;

    tracing::info!(
        share_id = share.id,
        itinerary_id = payload.itinerary_id,
        target = request.target.as_str(),
        use_edited_pdf = payload.use_edited_pdf,
        "Itinerary shared"
    );

    state.event_bus.publish(
        PlatformEvent::for_itinerary(EVENT_ITINERARY_SHARED, scope.agency_id, payload.itinerary_id)
            .with_payload(json!({
                "shareId": share.id,
                "target": request.target.as_str(),
                "recipientEmail": share.recipient_email,
                "dispatch": &payload,
            })),
    );

    Ok(ShareResult { share, payload })
}
