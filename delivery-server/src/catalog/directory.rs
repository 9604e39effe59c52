//! Route directory.

use std::collections::HashMap;

use crate::domain::{DomainError, LocationId, Route, RouteId};

/// Collection of directed routes, queryable by origin and by id.
#[derive(Debug, Clone, Default)]
pub struct RouteDirectory {
    routes: Vec<Route>,
    index: HashMap<RouteId, usize>,
}

impl RouteDirectory {
    /// Build a directory, rejecting duplicate ids.
    pub fn new(routes: Vec<Route>) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(routes.len());
        for (i, route) in routes.iter().enumerate() {
            if index.insert(route.id.clone(), i).is_some() {
                return Err(DomainError::DuplicateId(route.id.to_string()));
            }
        }
        Ok(Self { routes, index })
    }

    pub fn get(&self, id: &RouteId) -> Option<&Route> {
        self.index.get(id).map(|&i| &self.routes[i])
    }

    /// Routes departing from `origin`, in insertion order.
    pub fn from_origin<'a>(&'a self, origin: &'a LocationId) -> impl Iterator<Item = &'a Route> {
        self.routes.iter().filter(move |r| r.departs_from(origin))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_vec(self) -> Vec<Route> {
        self.routes
    }

    /// Append a route. Fails if the id is already present.
    pub fn insert(&mut self, route: Route) -> Result<(), DomainError> {
        if self.index.contains_key(&route.id) {
            return Err(DomainError::DuplicateId(route.id.to_string()));
        }
        self.index.insert(route.id.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    /// Swap in a new record for the route with the same id, keeping its
    /// position. Returns the old record, or `None` if the id is unknown.
    pub fn replace(&mut self, route: Route) -> Option<Route> {
        let &i = self.index.get(&route.id)?;
        Some(std::mem::replace(&mut self.routes[i], route))
    }

    pub fn remove(&mut self, id: &RouteId) -> Option<Route> {
        let i = *self.index.get(id)?;
        let removed = self.routes.remove(i);
        self.reindex();
        Some(removed)
    }

    /// Keep only the routes matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Route) -> bool) {
        self.routes.retain(keep);
        self.reindex();
    }

    /// Update the denormalized name on every route ending at `destination`.
    pub fn rename_destination(&mut self, destination: &LocationId, name: &str) {
        for route in self.routes.iter_mut().filter(|r| &r.destination == destination) {
            route.destination_name = name.to_string();
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .routes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
    }
}
