//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod agency_repo;
pub mod dmc_repo;
pub mod enquiry_repo;
pub mod event_repo;
pub mod itinerary_repo;
pub mod itinerary_share_repo;

pub use agency_repo::AgencyRepo;
pub use dmc_repo::DmcRepo;
pub use enquiry_repo::EnquiryRepo;
pub use event_repo::EventRepo;
pub use itinerary_repo::{AgencyItinerary, ItineraryRepo};
pub use itinerary_share_repo::ItineraryShareRepo;
