pub mod agency;
pub mod dmc;
pub mod enquiry;
pub mod itinerary;
pub mod share;
pub mod share_board;
