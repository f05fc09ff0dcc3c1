//! Tenant scoping extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use itinera_core::error::CoreError;
use itinera_core::types::DbId;

use crate::error::AppError;

/// Header carrying the calling agency's id.
pub const AGENCY_HEADER: &str = "x-agency-id";

/// The agency a request acts on behalf of, read from the `x-agency-id` header.
///
/// Resources owned by another agency are reported as not found, so handlers
/// compare ownership through [`AgencyScope::owns`] rather than returning 403.
///
/// ```ignore
/// async fn my_handler(scope: AgencyScope) -> AppResult<Json<()>> {
///     tracing::info!(agency_id = scope.agency_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AgencyScope {
    pub agency_id: DbId,
}

impl AgencyScope {
    pub fn owns(&self, agency_id: DbId) -> bool {
        self.agency_id == agency_id
    }

    /// Turn a foreign-owned entity into a `NotFound` error.
    pub fn ensure_owns(
        &self,
        owner: DbId,
        entity: &'static str,
        id: DbId,
    ) -> Result<(), AppError> {
        if self.owns(owner) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::NotFound { entity, id }))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AgencyScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AGENCY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest(format!("Missing {AGENCY_HEADER} header")))?;

        let agency_id = raw
            .trim()
            .parse::<DbId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {AGENCY_HEADER} header")))?;

        Ok(AgencyScope { agency_id })
    }
}
