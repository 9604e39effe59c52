//! Caching layer for delivery API reads.
//!
//! The location list and per-origin route lists are owned by the backend; we
//! keep read-through copies with a five-minute freshness window. Writes go
//! straight to the backend and invalidate whatever they may have changed, so
//! the next read is a full refetch.
//!
//! Every fetch is tagged with a request token. A response is stored only if
//! its token is still the latest one issued for its key; a slow response
//! that was overtaken by a newer request (or by an invalidation) is handed
//! back to its caller but never written into the cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::{ApiError, DeliveryApi, RouteFilter};
use crate::domain::{Location, LocationDraft, LocationId, Route, RouteDraft, RouteId};

/// Cached location list.
type LocationsEntry = Arc<Vec<Location>>;

/// Cached outbound routes of one origin.
type RoutesEntry = Arc<Vec<Route>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached response stays fresh.
    pub ttl: Duration,

    /// Maximum number of cached entries per family.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_capacity: 1000,
        }
    }
}

/// What a fetch was for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Locations,
    RoutesFrom(LocationId),
    Route(RouteId),
}

/// Ticket handed out when a fetch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    key: FetchKey,
    seq: u64,
    epoch: u64,
}

#[derive(Debug, Default)]
struct TokenState {
    next_seq: u64,
    epoch: u64,
    latest: HashMap<FetchKey, u64>,
}

/// Monotonic request tokens per fetch key.
#[derive(Debug, Default)]
pub struct RequestTokens {
    state: Mutex<TokenState>,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `key`, superseding any fetch already in flight.
    pub async fn issue(&self, key: FetchKey) -> RequestToken {
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let seq = state.next_seq;
        state.latest.insert(key.clone(), seq);
        RequestToken {
            key,
            seq,
            epoch: state.epoch,
        }
    }

    /// Whether `token` is still the newest for its key.
    pub async fn is_latest(&self, token: &RequestToken) -> bool {
        let state = self.state.lock().await;
        Self::check(&state, token)
    }

    /// Run `apply` only if `token` is still the newest for its key.
    ///
    /// The check and the write happen under one lock, so an `issue` or
    /// `supersede` cannot slip in between them.
    pub async fn apply_if_latest<F>(&self, token: &RequestToken, apply: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let state = self.state.lock().await;
        if Self::check(&state, token) {
            apply.await;
            true
        } else {
            false
        }
    }

    /// Make every outstanding token for `key` stale.
    pub async fn supersede(&self, key: &FetchKey) {
        let mut state = self.state.lock().await;
        state.latest.remove(key);
    }

    /// Make every outstanding token stale.
    pub async fn supersede_all(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.latest.clear();
    }

    fn check(state: &TokenState, token: &RequestToken) -> bool {
        token.epoch == state.epoch && state.latest.get(&token.key) == Some(&token.seq)
    }
}

/// Delivery API with read-through caching.
///
/// Wraps any [`DeliveryApi`] and implements it again, so callers cannot tell
/// whether they talk to the cache or the backend.
pub struct CachedDeliveryApi<A> {
    api: A,
    locations: MokaCache<(), LocationsEntry>,
    routes_from: MokaCache<LocationId, RoutesEntry>,
    routes: MokaCache<RouteId, Route>,
    tokens: RequestTokens,
}

impl<A: DeliveryApi> CachedDeliveryApi<A> {
    /// Create a new cached client.
    pub fn new(api: A, config: &CacheConfig) -> Self {
        Self {
            api,
            locations: MokaCache::builder()
                .time_to_live(config.ttl)
                .max_capacity(1)
                .build(),
            routes_from: MokaCache::builder()
                .time_to_live(config.ttl)
                .max_capacity(config.max_capacity)
                .build(),
            routes: MokaCache::builder()
                .time_to_live(config.ttl)
                .max_capacity(config.max_capacity)
                .build(),
            tokens: RequestTokens::new(),
        }
    }

    /// Access the underlying backend for operations that bypass the cache.
    pub fn inner(&self) -> &A {
        &self.api
    }

    /// Location list, from cache if fresh.
    pub async fn locations(&self) -> Result<LocationsEntry, ApiError> {
        if let Some(cached) = self.locations.get(&()).await {
            return Ok(cached);
        }

        let token = self.tokens.issue(FetchKey::Locations).await;
        let entry = Arc::new(self.api.list_locations().await?);
        let stored = self
            .tokens
            .apply_if_latest(&token, self.locations.insert((), entry.clone()))
            .await;
        if !stored {
            debug!("discarding superseded location list");
        }
        Ok(entry)
    }

    /// Outbound routes of `origin`, from cache if fresh.
    pub async fn routes_from(&self, origin: &LocationId) -> Result<RoutesEntry, ApiError> {
        if let Some(cached) = self.routes_from.get(origin).await {
            return Ok(cached);
        }

        let token = self
            .tokens
            .issue(FetchKey::RoutesFrom(origin.clone()))
            .await;
        let entry = Arc::new(self.api.list_routes_by_origin(origin).await?);
        let stored = self
            .tokens
            .apply_if_latest(&token, self.routes_from.insert(origin.clone(), entry.clone()))
            .await;
        if !stored {
            debug!(%origin, "discarding superseded route list");
        }
        Ok(entry)
    }

    /// Drop the cached location list; the next read refetches it.
    pub async fn refetch_locations(&self) {
        self.tokens.supersede(&FetchKey::Locations).await;
        self.locations.invalidate(&()).await;
    }

    /// Drop the cached routes of one origin.
    pub async fn refetch_routes_from(&self, origin: &LocationId) {
        self.tokens
            .supersede(&FetchKey::RoutesFrom(origin.clone()))
            .await;
        self.routes_from.invalidate(origin).await;
    }

    /// Invalidate all cached entries.
    pub async fn invalidate_all(&self) {
        self.tokens.supersede_all().await;
        self.locations.invalidate_all();
        self.routes_from.invalidate_all();
        self.routes.invalidate_all();
    }

    /// Prefetch the route lists of several origins concurrently.
    ///
    /// Returns how many origins were fetched successfully.
    pub async fn warm(&self, origins: &[LocationId]) -> usize {
        let results = join_all(origins.iter().map(|o| self.routes_from(o))).await;
        results.iter().filter(|r| r.is_ok()).count()
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.locations.entry_count() + self.routes_from.entry_count() + self.routes.entry_count()
    }
}

impl<A: DeliveryApi> DeliveryApi for CachedDeliveryApi<A> {
    async fn list_locations(&self) -> Result<Vec<Location>, ApiError> {
        Ok(self.locations().await?.as_ref().clone())
    }

    async fn get_route(&self, id: &RouteId) -> Result<Route, ApiError> {
        if let Some(cached) = self.routes.get(id).await {
            return Ok(cached);
        }

        let token = self.tokens.issue(FetchKey::Route(id.clone())).await;
        let route = self.api.get_route(id).await?;
        self.tokens
            .apply_if_latest(&token, self.routes.insert(id.clone(), route.clone()))
            .await;
        Ok(route)
    }

    async fn list_routes_by_origin(&self, origin: &LocationId) -> Result<Vec<Route>, ApiError> {
        Ok(self.routes_from(origin).await?.as_ref().clone())
    }

    /// The admin listing always goes to the backend.
    async fn list_routes(&self, filter: &RouteFilter) -> Result<Vec<Route>, ApiError> {
        self.api.list_routes(filter).await
    }

    async fn create_location(&self, draft: &LocationDraft) -> Result<Location, ApiError> {
        let created = self.api.create_location(draft).await?;
        self.refetch_locations().await;
        Ok(created)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        draft: &LocationDraft,
    ) -> Result<Location, ApiError> {
        let updated = self.api.update_location(id, draft).await?;
        // Route lists carry destination names
        self.invalidate_all().await;
        Ok(updated)
    }

    async fn delete_location(&self, id: &LocationId) -> Result<(), ApiError> {
        self.api.delete_location(id).await?;
        self.invalidate_all().await;
        Ok(())
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        let created = self.api.create_route(draft).await?;
        self.refetch_locations().await;
        self.refetch_routes_from(&draft.origin).await;
        Ok(created)
    }

    async fn update_route(&self, id: &RouteId, draft: &RouteDraft) -> Result<Route, ApiError> {
        let updated = self.api.update_route(id, draft).await?;
        // The origin may have changed, so every list is suspect
        self.invalidate_all().await;
        Ok(updated)
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), ApiError> {
        self.api.delete_route(id).await?;
        self.invalidate_all().await;
        Ok(())
    }
}
