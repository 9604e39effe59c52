//! Web layer for the delivery price calculator.
//!
//! Serves the calculator page, JSON endpoints for the resolver, cart quotes,
//! admin CRUD and hub proposals.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
