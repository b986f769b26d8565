//! Web layer for the bus timetable service.
//!
//! JSON endpoints for stations, lines and timetables.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
