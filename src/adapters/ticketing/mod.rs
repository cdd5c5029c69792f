//! Ticketing adapters.

mod http_ticketing;
mod mock;

pub use http_ticketing::{HttpTicketing, HttpTicketingConfig};
pub use mock::MockTicketing;
