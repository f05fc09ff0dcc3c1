//! Send actions: sharing an itinerary PDF with a customer or a DMC.
//!
//! Every send goes through [`classify`] so the edited PDF always wins over
//! the original one, whichever view triggered the send.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::pdf_version::{
    classify, pick_default_selection, rank_itineraries, ItineraryRecord, NO_ITINERARY_AVAILABLE,
};
use crate::types::DbId;

/// Maximum length of the free-text message attached to a share.
pub const MAX_SHARE_MESSAGE_LENGTH: u64 = 2000;

pub const TARGET_CUSTOMER: &str = "customer";
pub const TARGET_DMC: &str = "dmc";

/// Who receives the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareTarget {
    Customer,
    Dmc,
}

impl ShareTarget {
    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => TARGET_CUSTOMER,
            Self::Dmc => TARGET_DMC,
        }
    }

    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TARGET_CUSTOMER => Ok(Self::Customer),
            TARGET_DMC => Ok(Self::Dmc),
            _ => Err(CoreError::Validation(format!(
                "Invalid share target '{s}'. Must be one of: {TARGET_CUSTOMER}, {TARGET_DMC}"
            ))),
        }
    }
}

/// Body posted to the email-dispatch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub use_edited_pdf: bool,
    pub itinerary_id: DbId,
    pub pdf_url_to_send: String,
}

/// A request to share an itinerary, as submitted by staff.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShareRequest {
    pub target: ShareTarget,
    /// Required when `target` is `dmc`, rejected otherwise.
    pub dmc_id: Option<DbId>,
    /// Overrides the enquiry's customer email (customer target only).
    #[validate(email(message = "recipient_email must be a valid email address"))]
    pub recipient_email: Option<String>,
    #[validate(length(max = 2000, message = "message must be at most 2000 characters"))]
    pub message: Option<String>,
}

impl ShareRequest {
    /// Validate field formats and the target/DMC combination.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        match (self.target, self.dmc_id) {
            (ShareTarget::Dmc, None) => Err(CoreError::Validation(
                "dmc_id is required when sharing with a DMC".into(),
            )),
            (ShareTarget::Customer, Some(_)) => Err(CoreError::Validation(
                "dmc_id is only allowed when sharing with a DMC".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Build the dispatch payload for one itinerary.
///
/// Fails when the itinerary has neither an edited nor an original PDF.
pub fn build_share_payload(record: &ItineraryRecord) -> Result<SharePayload, CoreError> {
    let classification = classify(record);
    let pdf_url_to_send = classification
        .active_pdf_url
        .ok_or_else(|| CoreError::Validation(NO_ITINERARY_AVAILABLE.into()))?;

    Ok(SharePayload {
        use_edited_pdf: classification.is_edited,
        itinerary_id: record.id,
        pdf_url_to_send,
    })
}

/// Pick the default itinerary of an enquiry and build its payload.
pub fn select_for_sharing(mut records: Vec<ItineraryRecord>) -> Result<SharePayload, CoreError> {
    rank_itineraries(&mut records);
    let selection = pick_default_selection(&records)
        .ok_or_else(|| CoreError::Validation(NO_ITINERARY_AVAILABLE.into()))?;
    build_share_payload(&records[selection.index])
}
