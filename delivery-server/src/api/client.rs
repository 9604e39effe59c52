//! Delivery API HTTP client.
//!
//! Provides async methods for the backend's location and route endpoints.
//! Handles bearer authentication from the [`Session`], status classification
//! and conversion to domain types.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{Location, LocationDraft, LocationId, Route, RouteDraft, RouteId};

use super::convert::{convert_location, convert_route, location_body, route_body};
use super::error::ApiError;
use super::query::{QueryParams, path_segment};
use super::session::Session;
use super::types::{ErrorBodyDto, ListEnvelope, LocationPayload, RouteDto};
use super::{DeliveryApi, RouteFilter};

/// Default base URL for the delivery API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of body characters kept in error messages.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the delivery API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Delivery API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a new client with the given configuration and session.
    pub fn new(config: ApiConfig, session: Session) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url,
            session,
        })
    }

    /// The session whose token is attached to requests.
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, query: &QueryParams, resource: &str) -> Result<String, ApiError> {
        let url = query.append_to(&self.url(path));
        self.execute(self.http.get(url), resource).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        resource: &str,
    ) -> Result<String, ApiError> {
        let request = self.http.request(method, self.url(path)).json(body);
        self.execute(request, resource).await
    }

    async fn delete(&self, path: &str, resource: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(path)), resource)
            .await
            .map(drop)
    }

    /// Attach the session token, send, and classify the response status.
    async fn execute(&self, request: RequestBuilder, resource: &str) -> Result<String, ApiError> {
        let request = match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!(resource, error = %e, "no response from delivery API");
            ApiError::Network(e)
        })?;
        let status = response.status();
        debug!(resource, %status, "delivery API response");

        if status == StatusCode::UNAUTHORIZED {
            if self.session.expire().await {
                warn!("delivery API rejected the session token; session cleared");
            }
            return Err(ApiError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(resource));
        }

        // A body cut off mid-transfer is a transport failure like any other
        let body = response.text().await.map_err(ApiError::Network)?;

        if status.is_success() {
            return Ok(body);
        }

        let parsed: ErrorBodyDto = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed.message.unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.chars().take(BODY_SNIPPET_CHARS).collect()
            }
        });

        let err = match status {
            StatusCode::FORBIDDEN => ApiError::Forbidden { message },
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation {
                message,
                errors: parsed.errors,
            },
            _ => ApiError::Http {
                status: status.as_u16(),
                message,
            },
        };
        warn!(resource, error = %err, "delivery API request failed");
        Err(err)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
    })
}

fn decode_routes(body: &str) -> Result<Vec<Route>, ApiError> {
    let list: ListEnvelope<RouteDto> = decode(body)?;
    list.into_items()
        .iter()
        .map(|dto| convert_route(dto).map_err(ApiError::from))
        .collect()
}

impl DeliveryApi for ApiClient {
    async fn list_locations(&self) -> Result<Vec<Location>, ApiError> {
        let body = self.get("/Locations", &QueryParams::new(), "locations").await?;
        let list: ListEnvelope<LocationPayload> = decode(&body)?;
        list.into_items()
            .iter()
            .map(|p| convert_location(p).map_err(ApiError::from))
            .collect()
    }

    async fn get_route(&self, id: &RouteId) -> Result<Route, ApiError> {
        let resource = format!("route {id}");
        let body = self
            .get(&format!("/DeliveryRoutes/{}", path_segment(id.as_str())), &QueryParams::new(), &resource)
            .await?;
        // Some deployments answer an unknown id with 200 and a null body
        if body.trim().is_empty() || body.trim() == "null" {
            return Err(ApiError::not_found(resource));
        }
        let dto: RouteDto = decode(&body)?;
        Ok(convert_route(&dto)?)
    }

    async fn list_routes_by_origin(&self, origin: &LocationId) -> Result<Vec<Route>, ApiError> {
        let body = self
            .get(
                &format!("/DeliveryRoutes/origin/{}", path_segment(origin.as_str())),
                &QueryParams::new(),
                &format!("routes from {origin}"),
            )
            .await?;
        decode_routes(&body)
    }

    async fn list_routes(&self, filter: &RouteFilter) -> Result<Vec<Route>, ApiError> {
        let query = QueryParams::new()
            .push_all("origin", filter.origins.iter().map(LocationId::as_str))
            .push_opt("available", filter.available);
        let body = self.get("/DeliveryRoutes", &query, "routes").await?;
        decode_routes(&body)
    }

    async fn create_location(&self, draft: &LocationDraft) -> Result<Location, ApiError> {
        draft.validate()?;
        let body = self
            .send_json(Method::POST, "/Locations", &location_body(draft), "locations")
            .await?;
        let payload: LocationPayload = decode(&body)?;
        Ok(convert_location(&payload)?)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        draft: &LocationDraft,
    ) -> Result<Location, ApiError> {
        draft.validate()?;
        let body = self
            .send_json(
                Method::PUT,
                &format!("/Locations/{}", path_segment(id.as_str())),
                &location_body(draft),
                &format!("location {id}"),
            )
            .await?;
        let payload: LocationPayload = decode(&body)?;
        Ok(convert_location(&payload)?)
    }

    async fn delete_location(&self, id: &LocationId) -> Result<(), ApiError> {
        self.delete(&format!("/Locations/{}", path_segment(id.as_str())), &format!("location {id}"))
            .await
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        draft.validate()?;
        let body = self
            .send_json(Method::POST, "/DeliveryRoutes", &route_body(draft), "routes")
            .await?;
        let dto: RouteDto = decode(&body)?;
        Ok(convert_route(&dto)?)
    }

    async fn update_route(&self, id: &RouteId, draft: &RouteDraft) -> Result<Route, ApiError> {
        draft.validate()?;
        let body = self
            .send_json(
                Method::PUT,
                &format!("/DeliveryRoutes/{}", path_segment(id.as_str())),
                &route_body(draft),
                &format!("route {id}"),
            )
            .await?;
        let dto: RouteDto = decode(&body)?;
        Ok(convert_route(&dto)?)
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), ApiError> {
        self.delete(&format!("/DeliveryRoutes/{}", path_segment(id.as_str())), &format!("route {id}"))
            .await
    }
}
