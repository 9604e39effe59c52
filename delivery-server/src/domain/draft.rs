//! Admin input for creating and updating records.

use super::error::DomainError;
use super::{DistanceLabel, LocationId, Price};

/// Fields of a location as entered by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDraft {
    pub name: String,
    pub address: Option<String>,
}

impl LocationDraft {
    pub fn new(name: impl Into<String>, address: Option<String>) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// Check the draft before it is sent anywhere.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyName("location"));
        }
        Ok(())
    }
}

/// Fields of a route as entered by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDraft {
    pub origin: LocationId,
    pub destination: LocationId,
    pub destination_name: String,
    pub distance: Option<DistanceLabel>,
    pub price: Price,
    pub is_available: bool,
}

impl RouteDraft {
    /// Check the draft before it is sent anywhere.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.origin == self.destination {
            return Err(DomainError::SelfLoop(self.origin.clone()));
        }
        if self.destination_name.trim().is_empty() {
            return Err(DomainError::EmptyName("route destination"));
        }
        Ok(())
    }
}
