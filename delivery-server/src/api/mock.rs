//! In-memory delivery backend for development without the real API.
//!
//! Loads a catalog from a JSON file and serves it through the same
//! [`DeliveryApi`] interface, including create/update/delete with the
//! backend's not-found and validation behaviour.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::domain::{Location, LocationDraft, LocationId, Route, RouteDraft, RouteId};

use super::convert::convert_catalog;
use super::error::ApiError;
use super::types::CatalogFileDto;
use super::{DeliveryApi, RouteFilter};

#[derive(Debug, Default)]
struct MockState {
    catalog: Catalog,
    next_id: u64,
}

impl MockState {
    fn location(&self, id: &LocationId) -> Option<&Location> {
        self.catalog.registry().get(id)
    }

    fn fresh_id(&mut self, prefix: &str) -> Result<String, ApiError> {
        loop {
            self.next_id += 1;
            let candidate = format!("{prefix}{}", self.next_id);
            let taken = self.location(&LocationId::new(&candidate)?).is_some()
                || self.catalog.directory().get(&RouteId::new(&candidate)?).is_some();
            if !taken {
                return Ok(candidate);
            }
        }
    }

    /// Reject a name already used by a hub other than `except`.
    fn check_name_free(&self, name: &str, except: Option<&LocationId>) -> Result<(), ApiError> {
        match self.catalog.registry().find_by_name(name.trim()) {
            Some(existing) if Some(&existing.id) != except => Err(ApiError::Validation {
                message: "The given data was invalid.".to_string(),
                errors: BTreeMap::from([(
                    "name".to_string(),
                    vec!["The name has already been taken.".to_string()],
                )]),
            }),
            _ => Ok(()),
        }
    }

    fn check_endpoints(&self, draft: &RouteDraft) -> Result<(), ApiError> {
        let mut errors = BTreeMap::new();
        if self.location(&draft.origin).is_none() {
            errors.insert("originId".to_string(), vec![format!("unknown location {}", draft.origin)]);
        }
        if self.location(&draft.destination).is_none() {
            errors.insert(
                "destinationId".to_string(),
                vec![format!("unknown location {}", draft.destination)],
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation {
                message: "route endpoints must be existing locations".to_string(),
                errors,
            })
        }
    }
}

fn route_from_draft(id: RouteId, draft: &RouteDraft) -> Result<Route, ApiError> {
    Ok(Route::new(
        id,
        draft.origin.clone(),
        draft.destination.clone(),
        &draft.destination_name,
        draft.distance.clone(),
        draft.price,
        draft.is_available,
    )?)
}

/// Mock delivery backend that serves data from memory.
#[derive(Debug, Clone, Default)]
pub struct MockDeliveryApi {
    state: Arc<RwLock<MockState>>,
}

impl MockDeliveryApi {
    /// Create a backend holding the given catalog.
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                catalog,
                next_id: 0,
            })),
        }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        let dto: CatalogFileDto = serde_json::from_str(json).map_err(|e| ApiError::Json {
            message: e.to_string(),
            body: None,
        })?;
        Ok(Self::from_catalog(convert_catalog(&dto)?))
    }

    /// Load a catalog file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ApiError::InvalidInput(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Number of locations and routes currently held.
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.catalog.registry().len(), state.catalog.directory().len())
    }
}

impl DeliveryApi for MockDeliveryApi {
    async fn list_locations(&self) -> Result<Vec<Location>, ApiError> {
        let state = self.state.read().await;
        Ok(state.catalog.registry().iter().cloned().collect())
    }

    async fn get_route(&self, id: &RouteId) -> Result<Route, ApiError> {
        let state = self.state.read().await;
        state
            .catalog
            .directory()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("route {id}")))
    }

    async fn list_routes_by_origin(&self, origin: &LocationId) -> Result<Vec<Route>, ApiError> {
        let state = self.state.read().await;
        if state.location(origin).is_none() {
            return Err(ApiError::not_found(format!("routes from {origin}")));
        }
        Ok(state.catalog.directory().from_origin(origin).cloned().collect())
    }

    async fn list_routes(&self, filter: &RouteFilter) -> Result<Vec<Route>, ApiError> {
        let state = self.state.read().await;
        Ok(state
            .catalog
            .directory()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn create_location(&self, draft: &LocationDraft) -> Result<Location, ApiError> {
        draft.validate()?;
        let mut state = self.state.write().await;
        state.check_name_free(&draft.name, None)?;
        let id = LocationId::new(state.fresh_id("l")?)?;
        let location = Location::new(id, &draft.name, draft.address.clone(), vec![])?;
        state.catalog.insert_location(location.clone())?;
        Ok(location)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        draft: &LocationDraft,
    ) -> Result<Location, ApiError> {
        draft.validate()?;
        let mut state = self.state.write().await;
        if state.location(id).is_none() {
            return Err(ApiError::not_found(format!("location {id}")));
        }
        state.check_name_free(&draft.name, Some(id))?;

        let updated = Location::new(id.clone(), &draft.name, draft.address.clone(), vec![])?;
        state.catalog.replace_location(updated);
        state
            .location(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("location {id}")))
    }

    async fn delete_location(&self, id: &LocationId) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state
            .catalog
            .remove_location(id)
            .map(drop)
            .ok_or_else(|| ApiError::not_found(format!("location {id}")))
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        draft.validate()?;
        let mut state = self.state.write().await;
        state.check_endpoints(draft)?;
        let id = RouteId::new(state.fresh_id("r")?)?;
        let route = route_from_draft(id, draft)?;
        state.catalog.insert_route(route.clone())?;
        Ok(route)
    }

    async fn update_route(&self, id: &RouteId, draft: &RouteDraft) -> Result<Route, ApiError> {
        draft.validate()?;
        let mut state = self.state.write().await;
        if state.catalog.directory().get(id).is_none() {
            return Err(ApiError::not_found(format!("route {id}")));
        }
        state.check_endpoints(draft)?;
        let route = route_from_draft(id.clone(), draft)?;
        state.catalog.replace_route(route.clone());
        Ok(route)
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state
            .catalog
            .remove_route(id)
            .map(drop)
            .ok_or_else(|| ApiError::not_found(format!("route {id}")))
    }
}
