//! Hub and route administration.
//!
//! Thin layer over the delivery API's create/update/delete endpoints. Drafts
//! are checked before anything is sent. Failures are logged here and shown
//! to the operator as a short [`Notice`]; nothing is retried or rolled back.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::{ApiError, DeliveryApi, RouteFilter};
use crate::domain::{Location, LocationDraft, LocationId, Route, RouteDraft, RouteId};

/// An admin action, for logging and notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateLocation,
    UpdateLocation,
    DeleteLocation,
    CreateRoute,
    UpdateRoute,
    DeleteRoute,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::CreateLocation => "location created",
            Action::UpdateLocation => "location updated",
            Action::DeleteLocation => "location deleted",
            Action::CreateRoute => "route created",
            Action::UpdateRoute => "route updated",
            Action::DeleteRoute => "route deleted",
        };
        f.write_str(text)
    }
}

/// Feedback shown after an admin action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Saved(String),
    Failed(String),
}

/// Shown for failures that are not the operator's input.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

impl Notice {
    /// Notice for the outcome of `action`.
    ///
    /// Input problems are reported as such; anything else gets a generic
    /// message, the details are in the log.
    pub fn for_result<T>(action: Action, result: &Result<T, ApiError>) -> Self {
        match result {
            Ok(_) => Notice::Saved(capitalize(&action.to_string())),
            Err(ApiError::InvalidInput(message)) => Notice::Failed(message.clone()),
            Err(ApiError::Validation { message, .. }) => Notice::Failed(message.clone()),
            Err(_) => Notice::Failed(GENERIC_FAILURE.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failed(_))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Admin operations against a delivery backend.
///
/// Cache invalidation after writes is the backend's business; given a
/// [`crate::cache::CachedDeliveryApi`], the next read is a full refetch.
pub struct AdminConsole<'a, A> {
    api: &'a A,
}

impl<'a, A: DeliveryApi> AdminConsole<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn locations(&self) -> Result<Vec<Location>, ApiError> {
        self.api.list_locations().await
    }

    /// Routes for the console table, optionally restricted to some origins.
    pub async fn list_routes(&self, filter: &RouteFilter) -> Result<Vec<Route>, ApiError> {
        self.api.list_routes(filter).await
    }

    pub async fn create_location(&self, draft: &LocationDraft) -> Result<Location, ApiError> {
        let result = match draft.validate() {
            Ok(()) => self.api.create_location(draft).await,
            Err(e) => Err(e.into()),
        };
        log_outcome(Action::CreateLocation, &draft.name, &result);
        result
    }

    pub async fn update_location(
        &self,
        id: &LocationId,
        draft: &LocationDraft,
    ) -> Result<Location, ApiError> {
        let result = match draft.validate() {
            Ok(()) => self.api.update_location(id, draft).await,
            Err(e) => Err(e.into()),
        };
        log_outcome(Action::UpdateLocation, id, &result);
        result
    }

    pub async fn delete_location(&self, id: &LocationId) -> Result<(), ApiError> {
        let result = self.api.delete_location(id).await;
        log_outcome(Action::DeleteLocation, id, &result);
        result
    }

    pub async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        let result = match draft.validate() {
            Ok(()) => self.api.create_route(draft).await,
            Err(e) => Err(e.into()),
        };
        let subject = format!("{} -> {}", draft.origin, draft.destination);
        log_outcome(Action::CreateRoute, &subject, &result);
        result
    }

    pub async fn update_route(&self, id: &RouteId, draft: &RouteDraft) -> Result<Route, ApiError> {
        let result = match draft.validate() {
            Ok(()) => self.api.update_route(id, draft).await,
            Err(e) => Err(e.into()),
        };
        log_outcome(Action::UpdateRoute, id, &result);
        result
    }

    pub async fn delete_route(&self, id: &RouteId) -> Result<(), ApiError> {
        let result = self.api.delete_route(id).await;
        log_outcome(Action::DeleteRoute, id, &result);
        result
    }
}

fn log_outcome<T>(action: Action, subject: impl fmt::Display, result: &Result<T, ApiError>) {
    match result {
        Ok(_) => info!(%subject, "{action}"),
        Err(e) => warn!(%subject, error = %e, action = ?action, "admin action failed"),
    }
}
