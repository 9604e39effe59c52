//! Domain types for delivery pricing.
//!
//! This module contains the validated hub and route model. All types
//! enforce their invariants at construction time, so code that receives
//! these types can trust their validity.

mod draft;
mod error;
mod id;
mod location;
mod price;
mod route;

pub use draft::{LocationDraft, RouteDraft};
pub use error::DomainError;
pub use id::{InvalidId, LocationId, RouteId};
pub use location::{Location, RouteRef};
pub use price::{InvalidPrice, Price};
pub use route::{DistanceLabel, Route};
