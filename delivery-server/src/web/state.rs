//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::{Backend, Session};
use crate::cache::CachedDeliveryApi;
use crate::requests::LocationRequestQueue;
use crate::resolver::ResolveMode;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached delivery backend
    pub api: Arc<CachedDeliveryApi<Backend>>,

    /// Session whose token the HTTP backend sends
    pub session: Session,

    /// Where destination lists come from
    pub resolve_mode: ResolveMode,

    /// Hub proposals awaiting moderation
    pub requests: Arc<RwLock<LocationRequestQueue>>,
}

impl AppState {
    /// Create a new app state.
    ///
    /// `session` must be the one the backend was built with, so that signing
    /// in and out through the web layer affects outgoing requests.
    pub fn new(api: CachedDeliveryApi<Backend>, session: Session, resolve_mode: ResolveMode) -> Self {
        Self {
            api: Arc::new(api),
            session,
            resolve_mode,
            requests: Arc::new(RwLock::new(LocationRequestQueue::new())),
        }
    }
}
