//! Domain logic for itinerary sharing.
//!
//! This crate has no database dependency. Everything here operates on
//! records loaded by the caller, so it can be shared by the API server,
//! background tasks and tests alike.

pub mod error;
pub mod pdf_version;
pub mod refresh;
pub mod share;
pub mod types;
pub mod validation;
