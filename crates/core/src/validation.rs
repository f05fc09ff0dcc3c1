//! Field-level input checks shared by the API handlers.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Reject empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn validate_email(field: &str, value: &str) -> Result<(), CoreError> {
    if !value.validate_email() {
        return Err(CoreError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

/// PDF links must be absolute http(s) URLs.
pub fn validate_pdf_url(field: &str, value: &str) -> Result<(), CoreError> {
    validate_required(field, value)?;
    let trimmed = value.trim();
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(CoreError::Validation(format!(
            "{field} must be an http(s) URL"
        )));
    }
    Ok(())
}
