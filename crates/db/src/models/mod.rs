//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Update DTOs where the entity is mutable

pub mod agency;
pub mod dmc;
pub mod enquiry;
pub mod event;
pub mod itinerary;
pub mod itinerary_share;
