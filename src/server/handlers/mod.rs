//! HTTP handlers.

mod reservation;
mod search;
mod status;

pub use reservation::reservation_handler;
pub use search::{hotels_handler, recommendations_handler};
pub use status::status_handler;
