//! Delivery API access.
//!
//! [`DeliveryApi`] has one operation per backend endpoint. It is implemented
//! by the HTTP [`ApiClient`], by the in-memory [`MockDeliveryApi`] used for
//! development, and by the caching decorator in [`crate::cache`].
//!
//! `GET /DeliveryRoutes/{id}` only ever means "one route by id"; routes from
//! an origin have their own operation and endpoint.

mod client;
mod convert;
mod error;
mod mock;
mod query;
mod session;
mod types;

use std::future::Future;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use convert::{ConversionError, route_dto};
pub use error::ApiError;
pub use mock::MockDeliveryApi;
pub use query::QueryParams;
pub use session::{LOGIN_PATH, Session, login_redirect};
pub use types::RouteDto;

use crate::domain::{Location, LocationDraft, LocationId, Route, RouteDraft, RouteId};

/// Filter for listing routes in the admin console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    /// Only routes departing from one of these hubs (all when empty).
    pub origins: Vec<LocationId>,
    /// Only routes with this availability (all when `None`).
    pub available: Option<bool>,
}

impl RouteFilter {
    pub fn matches(&self, route: &Route) -> bool {
        (self.origins.is_empty() || self.origins.contains(&route.origin))
            && self.available.is_none_or(|a| a == route.is_available)
    }
}

/// Operations offered by the delivery backend.
pub trait DeliveryApi: Send + Sync {
    /// `GET /Locations`
    fn list_locations(&self) -> impl Future<Output = Result<Vec<Location>, ApiError>> + Send;

    /// `GET /DeliveryRoutes/{id}`
    fn get_route(&self, id: &RouteId) -> impl Future<Output = Result<Route, ApiError>> + Send;

    /// `GET /DeliveryRoutes/origin/{originId}`
    fn list_routes_by_origin(
        &self,
        origin: &LocationId,
    ) -> impl Future<Output = Result<Vec<Route>, ApiError>> + Send;

    /// `GET /DeliveryRoutes?origin[]=..`
    fn list_routes(
        &self,
        filter: &RouteFilter,
    ) -> impl Future<Output = Result<Vec<Route>, ApiError>> + Send;

    /// `POST /Locations`
    fn create_location(
        &self,
        draft: &LocationDraft,
    ) -> impl Future<Output = Result<Location, ApiError>> + Send;

    /// `PUT /Locations/{id}`
    fn update_location(
        &self,
        id: &LocationId,
        draft: &LocationDraft,
    ) -> impl Future<Output = Result<Location, ApiError>> + Send;

    /// `DELETE /Locations/{id}`
    fn delete_location(&self, id: &LocationId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /DeliveryRoutes`
    fn create_route(&self, draft: &RouteDraft) -> impl Future<Output = Result<Route, ApiError>> + Send;

    /// `PUT /DeliveryRoutes/{id}`
    fn update_route(
        &self,
        id: &RouteId,
        draft: &RouteDraft,
    ) -> impl Future<Output = Result<Route, ApiError>> + Send;

    /// `DELETE /DeliveryRoutes/{id}`
    fn delete_route(&self, id: &RouteId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// The backend selected at startup.
#[derive(Debug, Clone)]
pub enum Backend {
    Http(ApiClient),
    Mock(MockDeliveryApi),
}

impl DeliveryApi for Backend {
    async fn list_locations(&self) -> Result<Vec<Location>, ApiError> {
        match self {
            Backend::Http(c) => c.list_locations().await,
            Backend::Mock(m) => m.list_locations().await,
        }
    }

    async fn get_route(&self, id: &RouteId) -> Result<Route, ApiError> {
        match self {
            Backend::Http(c) => c.get_route(id).await,
            Backend::Mock(m) => m.get_route(id).await,
        }
    }

    async fn list_routes_by_origin(&self, origin: &LocationId) -> Result<Vec<Route>, ApiError> {
        match self {
            Backend::Http(c) => c.list_routes_by_origin(origin).await,
            Backend::Mock(m) => m.list_routes_by_origin(origin).await,
        }
    }

    async fn list_routes(&self, filter: &RouteFilter) -> Result<Vec<Route>, ApiError> {
        match self {
            Backend::Http(c) => c.list_routes(filter).await,
            Backend::Mock(m) => m.list_routes(filter).await,
        }
    }

    async fn create_location(&self, draft: &LocationDraft) -> Result<Location, ApiError> {
        match self {
            Backend::Http(c) => c.create_location(draft).await,
            Backend::Mock(m) => m.create_location(draft).await,
        }
    }

    async fn update_location(
        &self,
        id: &LocationId,
        draft: &LocationDraft,
    ) -> Result<Location, ApiError> {
        match self {
            Backend::Http(c) => c.update_location(id, draft).await,
            Backend::Mock(m) => m.update_location(id, draft).await,
        }
    }

    async fn delete_location(&self, id: &LocationId) -> Result<(), ApiError> {
        match self {
            Backend::Http(c) => c.delete_location(id).await,
            Backend::Mock(m) => m.delete_location(id).await,
        }
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        match self {
            Backend::Http(c) => c.create_route(draft).await,
            Backend::Mock(m) => m.create_route(draft).await,
        }
    }

    async fn update_route(&self, id: &RouteId, draft: &RouteDraft) -> Result<Route, ApiError> {
        match self {
            Backend::Http(c) => c.update_route(id, draft).await,
            Backend::Mock(m) => m.update_route(id, draft).await,
        }
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), ApiError> {
        match self {
            Backend::Http(c) => c.delete_route(id).await,
            Backend::Mock(m) => m.delete_route(id).await,
        }
    }
}
