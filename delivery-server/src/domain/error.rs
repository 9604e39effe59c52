//! Domain error types.
//!
//! These errors represent validation failures and inconsistent reference
//! data. They are distinct from API/IO errors.

use super::{LocationId, RouteId};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required name was empty
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    /// Route origin and destination are the same hub
    #[error("route cannot start and end at {0}")]
    SelfLoop(LocationId),

    /// Two records share an id
    #[error("duplicate id {0}")]
    DuplicateId(String),

    /// An embedded route link names a route that does not exist
    #[error("location {location} links unknown route {route}")]
    UnknownRouteRef { location: LocationId, route: RouteId },

    /// An embedded route link names a route that starts elsewhere
    #[error("location {location} links route {route}, which departs from {origin}")]
    ForeignRouteRef {
        location: LocationId,
        route: RouteId,
        origin: LocationId,
    },
}
