//! In-memory hub and route reference data.
//!
//! A [`Catalog`] pairs a [`LocationRegistry`] with a [`RouteDirectory`] and
//! checks the references between them: every route link embedded in a
//! location must name a known route that departs from that location.

mod directory;
mod registry;

pub use directory::RouteDirectory;
pub use registry::LocationRegistry;

use crate::domain::{DomainError, Location, LocationId, Route, RouteId, RouteRef};

/// Consistent set of hubs and routes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    registry: LocationRegistry,
    directory: RouteDirectory,
}

impl Catalog {
    /// Build a catalog, validating embedded route links.
    pub fn new(locations: Vec<Location>, routes: Vec<Route>) -> Result<Self, DomainError> {
        let registry = LocationRegistry::new(locations)?;
        let directory = RouteDirectory::new(routes)?;

        for location in registry.iter() {
            for link in &location.routes {
                let route = directory.get(&link.route_id).ok_or_else(|| {
                    DomainError::UnknownRouteRef {
                        location: location.id.clone(),
                        route: link.route_id.clone(),
                    }
                })?;
                if !route.departs_from(&location.id) {
                    return Err(DomainError::ForeignRouteRef {
                        location: location.id.clone(),
                        route: route.id.clone(),
                        origin: route.origin.clone(),
                    });
                }
            }
        }

        Ok(Self {
            registry,
            directory,
        })
    }

    /// Build a catalog whose locations embed links to all their outbound
    /// routes, replacing whatever links they carried.
    pub fn with_embedded_links(
        locations: Vec<Location>,
        routes: Vec<Route>,
    ) -> Result<Self, DomainError> {
        let mut catalog = Self {
            registry: LocationRegistry::new(locations)?,
            directory: RouteDirectory::new(routes)?,
        };
        catalog.relink();
        Ok(catalog)
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &RouteDirectory {
        &self.directory
    }

    /// Split back into owned parts.
    pub fn into_parts(self) -> (Vec<Location>, Vec<Route>) {
        (self.registry.into_vec(), self.directory.into_vec())
    }

    // Mutations below re-derive every location's embedded links from the
    // directory, so the link check done by `new` keeps holding.

    pub fn insert_location(&mut self, location: Location) -> Result<(), DomainError> {
        self.registry.insert(location)?;
        self.relink();
        Ok(())
    }

    /// Replace a hub's record and carry its new name onto inbound routes.
    /// Returns `false` if the hub is unknown.
    pub fn replace_location(&mut self, location: Location) -> bool {
        let id = location.id.clone();
        let name = location.name.clone();
        if self.registry.replace(location).is_none() {
            return false;
        }
        self.directory.rename_destination(&id, &name);
        self.relink();
        true
    }

    /// Remove a hub together with every route touching it.
    pub fn remove_location(&mut self, id: &LocationId) -> Option<Location> {
        let removed = self.registry.remove(id)?;
        self.directory
            .retain(|r| &r.origin != id && &r.destination != id);
        self.relink();
        Some(removed)
    }

    pub fn insert_route(&mut self, route: Route) -> Result<(), DomainError> {
        self.directory.insert(route)?;
        self.relink();
        Ok(())
    }

    pub fn replace_route(&mut self, route: Route) -> Option<Route> {
        let old = self.directory.replace(route)?;
        self.relink();
        Some(old)
    }

    pub fn remove_route(&mut self, id: &RouteId) -> Option<Route> {
        let removed = self.directory.remove(id)?;
        self.relink();
        Some(removed)
    }

    fn relink(&mut self) {
        let directory = &self.directory;
        for location in self.registry.iter_mut() {
            location.routes = directory
                .from_origin(&location.id)
                .map(|r| RouteRef {
                    route_id: r.id.clone(),
                    destination_id: Some(r.destination.clone()),
                    destination_name: r.destination_name.clone(),
                })
                .collect();
        }
    }
}
