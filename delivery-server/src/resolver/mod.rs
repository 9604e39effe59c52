//! Route resolution.
//!
//! Answers two questions for the price calculator: "where can I deliver to
//! from this hub?" and "what does this route cost, and can it be ordered?"
//!
//! Destination lists come either from the links embedded in the origin's
//! location record or from the backend's by-origin route listing. Both keep
//! the backend's order; nothing here sorts by price or distance.

mod resolve;
mod search;

pub use resolve::{
    Destination, ResolveError, ResolveMode, RouteDetails, RouteResolver, destinations_of,
    embedded_destinations,
};
pub use search::filter_destinations;
