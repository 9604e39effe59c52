//! Delivery hubs.

use super::error::DomainError;
use super::{LocationId, RouteId};

/// An outbound route link embedded in a location record.
///
/// Legacy payloads name the destination but carry no destination id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRef {
    pub route_id: RouteId,
    pub destination_id: Option<LocationId>,
    pub destination_name: String,
}

/// A named delivery hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub address: Option<String>,
    /// Outbound routes, in the order the backend lists them.
    pub routes: Vec<RouteRef>,
}

impl Location {
    /// Create a location. The name must be non-empty after trimming.
    pub fn new(
        id: LocationId,
        name: impl Into<String>,
        address: Option<String>,
        routes: Vec<RouteRef>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::EmptyName("location"));
        }
        let address = address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        Ok(Self {
            id,
            name,
            address,
            routes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_name_and_drops_blank_address() {
        let loc = Location::new(
            LocationId::new("l1").unwrap(),
            " Berlin Mitte ",
            Some("   ".into()),
            vec![],
        )
        .unwrap();
        assert_eq!(loc.name, "Berlin Mitte");
        assert_eq!(loc.address, None);
    }

    #[test]
    fn rejects_empty_name() {
        let err = Location::new(LocationId::new("l1").unwrap(), "", None, vec![]).unwrap_err();
        assert_eq!(err.to_string(), "location name cannot be empty");
    }
}
