//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::admin::{Action, AdminConsole, Notice};
use crate::api::{ApiError, DeliveryApi, LOGIN_PATH, login_redirect};
use crate::cart::CartError;
use crate::domain::{InvalidId, LocationId, RouteId};
use crate::requests::RequestError;
use crate::resolver::{ResolveError, RouteResolver, filter_destinations};
use crate::selection::SelectionFlow;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/api/locations", get(list_locations))
        .route("/api/locations/:id/destinations", get(destinations))
        .route("/api/routes/:id", get(route_details))
        .route("/api/quote", post(quote))
        .route(
            "/api/admin/locations",
            get(admin_locations).post(admin_create_location),
        )
        .route(
            "/api/admin/locations/:id",
            put(admin_update_location).delete(admin_delete_location),
        )
        .route("/api/admin/routes", get(admin_routes).post(admin_create_route))
        .route(
            "/api/admin/routes/:id",
            put(admin_update_route).delete(admin_delete_route),
        )
        .route(
            "/api/location-requests",
            get(list_location_requests).post(submit_location_request),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(redirect_to_login))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

// ============================================================================
// Price calculator page
// ============================================================================

/// Price calculator page.
///
/// Runs the whole selection flow for the query parameters server-side.
async fn index_page(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Response {
    match render_index(&state, query).await {
        Ok(html) => html.into_response(),
        Err(AppError::Unauthorized) => AppError::Unauthorized.into_response(),
        Err(e) => error_page(e),
    }
}

async fn render_index(state: &AppState, query: IndexQuery) -> Result<Html<String>, AppError> {
    let origin = non_blank(query.origin).map(LocationId::new).transpose()?;
    let route = non_blank(query.route).map(RouteId::new).transpose()?;

    let locations = state.api.list_locations().await?;
    let resolver = RouteResolver::new(&*state.api, state.resolve_mode);
    let mut flow = SelectionFlow::new();
    let mut rejected = None;

    if let Some(origin) = origin {
        let ticket = flow.choose_origin(origin.clone());
        let list = resolver.destinations_from(&origin).await;
        check_session(&list)?;
        flow.complete_list(ticket, list);
        flow.set_search(query.q.unwrap_or_default());

        if let Some(route) = route {
            match flow.choose_destination(route.clone()) {
                Ok(ticket) => {
                    let details = resolver.route_details(&route).await;
                    check_session(&details)?;
                    flow.complete_details(ticket, details);
                }
                // Stale link from another origin: show the list without it
                Err(e) => {
                    debug!(%route, error = %e, "route not offered from origin");
                    rejected = Some(e.to_string());
                }
            }
        }
    }

    let signed_in = state.session.is_signed_in().await;
    let mut page = IndexTemplate::from_flow(&flow, &locations, signed_in);
    if rejected.is_some() {
        page.details_error = rejected;
    }
    render(&page)
}

/// Stop rendering if the backend rejected the session.
fn check_session<T>(result: &Result<T, ResolveError>) -> Result<(), AppError> {
    match result {
        Err(ResolveError::Api(ApiError::Unauthorized)) => Err(AppError::Unauthorized),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn error_page(err: AppError) -> Response {
    let status = err.status();
    let page = ErrorTemplate {
        title: if status.is_server_error() {
            "Delivery service unavailable".to_string()
        } else {
            "Something is not right".to_string()
        },
        message: "The price calculator could not be loaded.".to_string(),
        details: Some(err.message()),
    };
    match render(&page) {
        Ok(html) => (status, html).into_response(),
        Err(e) => e.into_response(),
    }
}

fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {e}"),
    })
}

// ============================================================================
// Session
// ============================================================================

async fn login_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&LoginTemplate {
        signed_in: state.session.is_signed_in().await,
        user: state.session.user().await,
        error: None,
    })
}

/// Store the operator-supplied token in the session.
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let token = form.token.trim();
    if token.is_empty() {
        let page = LoginTemplate {
            signed_in: false,
            user: None,
            error: Some("Enter an access token.".to_string()),
        };
        return match render(&page) {
            Ok(html) => (StatusCode::BAD_REQUEST, html).into_response(),
            Err(e) => e.into_response(),
        };
    }

    let user = non_blank(form.user).map(|u| u.trim().to_string());
    info!(user = user.as_deref().unwrap_or("-"), "signed in");
    state.session.sign_in(token, user).await;
    // Cached lists may have been fetched with another identity
    state.api.invalidate_all().await;
    Redirect::to("/").into_response()
}

async fn logout(State(state): State<AppState>) -> Redirect {
    if state.session.expire().await {
        info!("signed out");
    }
    state.api.invalidate_all().await;
    Redirect::to(LOGIN_PATH)
}

/// Send the browser to the login view after a 401, unless it is already there.
async fn redirect_to_login(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        if let Some(target) = login_redirect(&path) {
            debug!(%path, "session expired, redirecting to login");
            return Redirect::to(target).into_response();
        }
    }
    response
}

// ============================================================================
// Resolver API
// ============================================================================

async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationResult>>, AppError> {
    let locations = state.api.list_locations().await?;
    Ok(Json(
        locations.iter().map(LocationResult::from_location).collect(),
    ))
}

/// Destinations reachable from a hub, optionally filtered by name.
async fn destinations(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DestinationQuery>,
) -> Result<Json<DestinationsResponse>, AppError> {
    let origin = LocationId::new(&id)?;
    let resolver = RouteResolver::new(&*state.api, state.resolve_mode);
    let all = resolver.destinations_from(&origin).await?;

    let query = query.q.unwrap_or_default();
    let destinations = filter_destinations(&all, &query)
        .into_iter()
        .map(DestinationResult::from_destination)
        .collect();

    Ok(Json(DestinationsResponse {
        origin: origin.to_string(),
        query,
        destinations,
    }))
}

async fn route_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RouteDetailsResult>, AppError> {
    let route = RouteId::new(&id)?;
    let resolver = RouteResolver::new(&*state.api, state.resolve_mode);
    let details = resolver.route_details(&route).await?;
    Ok(Json(RouteDetailsResult::from_details(&details)))
}

/// Checkout figures for a cart delivered along a route.
async fn quote(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let req: QuoteRequest = parse_json(&body)?;
    let route = RouteId::new(&req.route_id)?;

    let resolver = RouteResolver::new(&*state.api, state.resolve_mode);
    let details = resolver.route_details(&route).await?;
    let quote = req.cart().quote(&details)?;

    Ok(Json(quote).into_response())
}

/// Parse a JSON body, logging it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "rejected JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

// ============================================================================
// Admin API
// ============================================================================

async fn admin_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationResult>>, AppError> {
    let locations = AdminConsole::new(&*state.api).locations().await?;
    Ok(Json(
        locations.iter().map(LocationResult::from_location).collect(),
    ))
}

async fn admin_create_location(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: LocationBody = parse_json(&body)?;
    let result = AdminConsole::new(&*state.api)
        .create_location(&body.draft())
        .await
        .map(|l| Some(LocationResult::from_location(&l)));
    admin_reply(Action::CreateLocation, StatusCode::CREATED, result)
}

async fn admin_update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let id = LocationId::new(&id)?;
    let body: LocationBody = parse_json(&body)?;
    let result = AdminConsole::new(&*state.api)
        .update_location(&id, &body.draft())
        .await
        .map(|l| Some(LocationResult::from_location(&l)));
    admin_reply(Action::UpdateLocation, StatusCode::OK, result)
}

async fn admin_delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = LocationId::new(&id)?;
    let result = AdminConsole::new(&*state.api)
        .delete_location(&id)
        .await
        .map(|()| None::<LocationResult>);
    admin_reply(Action::DeleteLocation, StatusCode::OK, result)
}

/// Routes for the console, `?origin=l1,l2&available=true`.
async fn admin_routes(
    State(state): State<AppState>,
    Query(query): Query<RouteListQuery>,
) -> Result<Json<Vec<RouteResult>>, AppError> {
    let filter = query.filter()?;
    let routes = AdminConsole::new(&*state.api).list_routes(&filter).await?;
    Ok(Json(routes.iter().map(RouteResult::from_route).collect()))
}

async fn admin_create_route(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: RouteBody = parse_json(&body)?;
    let draft = body
        .draft()
        .map_err(|message| AppError::BadRequest { message })?;
    let result = AdminConsole::new(&*state.api)
        .create_route(&draft)
        .await
        .map(|r| Some(RouteResult::from_route(&r)));
    admin_reply(Action::CreateRoute, StatusCode::CREATED, result)
}

async fn admin_update_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let id = RouteId::new(&id)?;
    let body: RouteBody = parse_json(&body)?;
    let draft = body
        .draft()
        .map_err(|message| AppError::BadRequest { message })?;
    let result = AdminConsole::new(&*state.api)
        .update_route(&id, &draft)
        .await
        .map(|r| Some(RouteResult::from_route(&r)));
    admin_reply(Action::UpdateRoute, StatusCode::OK, result)
}

async fn admin_delete_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = RouteId::new(&id)?;
    let result = AdminConsole::new(&*state.api)
        .delete_route(&id)
        .await
        .map(|()| None::<RouteResult>);
    admin_reply(Action::DeleteRoute, StatusCode::OK, result)
}

/// Notice plus the written record, or the notice with a failure status.
fn admin_reply<T: Serialize>(
    action: Action,
    status: StatusCode,
    result: Result<Option<T>, ApiError>,
) -> Result<Response, AppError> {
    let notice = Notice::for_result(action, &result);
    match result {
        Ok(item) => Ok((status, Json(AdminReply { notice, item })).into_response()),
        Err(ApiError::Unauthorized) => Err(AppError::Unauthorized),
        Err(e) => {
            let status = AppError::from(e).status();
            let reply: AdminReply<T> = AdminReply { notice, item: None };
            Ok((status, Json(reply)).into_response())
        }
    }
}

// ============================================================================
// Hub proposals
// ============================================================================

async fn list_location_requests(
    State(state): State<AppState>,
) -> Json<Vec<crate::requests::LocationRequest>> {
    Json(state.requests.read().await.all().to_vec())
}

async fn submit_location_request(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: LocationRequestBody = parse_json(&body)?;
    let mut queue = state.requests.write().await;
    let request = queue.submit(&body.name, &body.address)?.clone();
    Ok((StatusCode::CREATED, Json(request)).into_response())
}

// ============================================================================
// Errors
// ============================================================================

/// Response extension marking a 401 from the delivery backend.
#[derive(Debug, Clone, Copy)]
struct SessionExpired;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized,
    Forbidden { message: String },
    NotFound { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized => "Sign in to continue".to_string(),
            AppError::BadRequest { message }
            | AppError::Forbidden { message }
            | AppError::NotFound { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message.clone(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unauthorized => AppError::Unauthorized,
            ApiError::Forbidden { message } => AppError::Forbidden { message },
            ApiError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            ApiError::InvalidInput(message) => AppError::BadRequest { message },
            ApiError::Validation { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::RouteNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            ResolveError::Api(e) => e.into(),
        }
    }
}

impl From<InvalidId> for AppError {
    fn from(e: InvalidId) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<CartError> for AppError {
    fn from(e: CartError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if matches!(self, AppError::Unauthorized) {
            response.extensions_mut().insert(SessionExpired);
        }
        response
    }
}
