//! Directed delivery routes.

use std::fmt;

use super::error::DomainError;
use super::{LocationId, Price, RouteId};

/// Supplied distance text, e.g. "4.2 km".
///
/// Distances are never computed here; the label is shown as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistanceLabel(String);

impl DistanceLabel {
    /// Wrap a label. Blank labels carry no information and yield `None`.
    pub fn new(label: impl AsRef<str>) -> Option<Self> {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(DistanceLabel(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed, priced link from one hub to another.
///
/// Routes are not symmetric: the reverse direction is a separate route with
/// its own id and possibly a different price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub origin: LocationId,
    pub destination: LocationId,
    /// Display name of the destination hub.
    pub destination_name: String,
    pub distance: Option<DistanceLabel>,
    pub price: Price,
    pub is_available: bool,
}

impl Route {
    /// Create a route, rejecting self-loops and blank destination names.
    pub fn new(
        id: RouteId,
        origin: LocationId,
        destination: LocationId,
        destination_name: impl Into<String>,
        distance: Option<DistanceLabel>,
        price: Price,
        is_available: bool,
    ) -> Result<Self, DomainError> {
        if origin == destination {
            return Err(DomainError::SelfLoop(origin));
        }
        let destination_name = destination_name.into().trim().to_string();
        if destination_name.is_empty() {
            return Err(DomainError::EmptyName("route destination"));
        }
        Ok(Self {
            id,
            origin,
            destination,
            destination_name,
            distance,
            price,
            is_available,
        })
    }

    /// Whether this route starts at `origin`.
    pub fn departs_from(&self, origin: &LocationId) -> bool {
        &self.origin == origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> LocationId {
        LocationId::new(s).unwrap()
    }

    #[test]
    fn rejects_self_loop() {
        let err = Route::new(
            RouteId::new("r1").unwrap(),
            loc("l1"),
            loc("l1"),
            "Berlin Mitte",
            None,
            Price::ZERO,
            true,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::SelfLoop(loc("l1")));
    }

    #[test]
    fn rejects_blank_destination_name() {
        let result = Route::new(
            RouteId::new("r1").unwrap(),
            loc("l1"),
            loc("l2"),
            "  ",
            None,
            Price::ZERO,
            true,
        );
        assert!(matches!(result, Err(DomainError::EmptyName(_))));
    }

    #[test]
    fn reverse_route_is_independent() {
        let there = Route::new(
            RouteId::new("r4").unwrap(),
            loc("l3"),
            loc("l1"),
            "Berlin Mitte",
            DistanceLabel::new("4.2 km"),
            Price::from_cents(350),
            false,
        )
        .unwrap();
        let back = Route::new(
            RouteId::new("r2").unwrap(),
            loc("l1"),
            loc("l3"),
            "Kreuzberg",
            DistanceLabel::new("4.2 km"),
            Price::from_cents(350),
            true,
        )
        .unwrap();
        assert!(there.departs_from(&loc("l3")));
        assert!(!there.departs_from(&loc("l1")));
        assert_ne!(there.is_available, back.is_available);
    }

    #[test]
    fn blank_distance_label_is_none() {
        assert!(DistanceLabel::new("").is_none());
        assert_eq!(DistanceLabel::new(" 3.5 km ").unwrap().as_str(), "3.5 km");
    }
}
