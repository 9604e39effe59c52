//! Location registry.

use std::collections::HashMap;

use crate::domain::{DomainError, Location, LocationId};

/// Ordered collection of hubs with id lookup.
///
/// Iteration follows insertion order, which is the order shown in the
/// origin dropdown.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
    index: HashMap<LocationId, usize>,
}

impl LocationRegistry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(locations: Vec<Location>) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(locations.len());
        for (i, loc) in locations.iter().enumerate() {
            if index.insert(loc.id.clone(), i).is_some() {
                return Err(DomainError::DuplicateId(loc.id.to_string()));
            }
        }
        Ok(Self { locations, index })
    }

    pub fn get(&self, id: &LocationId) -> Option<&Location> {
        self.index.get(id).map(|&i| &self.locations[i])
    }

    /// Find a hub by its exact display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn into_vec(self) -> Vec<Location> {
        self.locations
    }

    /// Append a hub. Fails if the id is already present.
    pub fn insert(&mut self, location: Location) -> Result<(), DomainError> {
        if self.index.contains_key(&location.id) {
            return Err(DomainError::DuplicateId(location.id.to_string()));
        }
        self.index.insert(location.id.clone(), self.locations.len());
        self.locations.push(location);
        Ok(())
    }

    /// Swap in a new record for the hub with the same id, keeping its
    /// position. Returns the old record, or `None` if the id is unknown.
    pub fn replace(&mut self, location: Location) -> Option<Location> {
        let &i = self.index.get(&location.id)?;
        Some(std::mem::replace(&mut self.locations[i], location))
    }

    pub fn remove(&mut self, id: &LocationId) -> Option<Location> {
        let i = self.index.remove(id)?;
        let removed = self.locations.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Mutable access for the catalog. Ids must not change.
    pub(super) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Location> {
        self.locations.iter_mut()
    }
}
