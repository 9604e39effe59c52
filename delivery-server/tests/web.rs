//! End-to-end tests for the router, driven with `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use delivery_server::api::{ApiClient, ApiConfig, Backend, MockDeliveryApi, Session};
use delivery_server::cache::{CacheConfig, CachedDeliveryApi};
use delivery_server::resolver::ResolveMode;
use delivery_server::web::{AppState, create_router};

fn app_with(backend: Backend, session: Session, mode: ResolveMode) -> Router {
    let api = CachedDeliveryApi::new(backend, &CacheConfig::default());
    create_router(AppState::new(api, session, mode), "static")
}

fn mock_app() -> Router {
    let mock = MockDeliveryApi::from_file("data/sample_catalog.json").unwrap();
    app_with(Backend::Mock(mock), Session::new(), ResolveMode::ByOrigin)
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        location,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health() {
    let reply = send(&mock_app(), get("/health")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "ok");
}

#[tokio::test]
async fn destinations_keep_backend_order() {
    let reply = send(&mock_app(), get("/api/locations/l1/destinations")).await;
    assert_eq!(reply.status, StatusCode::OK);

    let json = reply.json();
    let names: Vec<&str> = json["destinations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["Prenzlauer Berg", "Kreuzberg", "Neukölln", "Charlottenburg"]
    );
}

#[tokio::test]
async fn destination_search_is_case_insensitive() {
    let reply = send(&mock_app(), get("/api/locations/l1/destinations?q=KREUZ")).await;
    let json = reply.json();
    assert_eq!(json["query"], "KREUZ");
    assert_eq!(json["destinations"].as_array().unwrap().len(), 1);
    assert_eq!(json["destinations"][0]["name"], "Kreuzberg");
}

#[tokio::test]
async fn origin_without_routes_has_no_destinations() {
    for mode in [ResolveMode::Embedded, ResolveMode::ByOrigin] {
        let mock = MockDeliveryApi::from_file("data/sample_catalog.json").unwrap();
        let app = app_with(Backend::Mock(mock), Session::new(), mode);
        let reply = send(&app, get("/api/locations/l4/destinations")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["destinations"], json!([]));
    }
}

#[tokio::test]
async fn unavailable_route_details() {
    let reply = send(&mock_app(), get("/api/routes/r4")).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["priceLabel"], "3.50");
    assert_eq!(json["isAvailable"], false);
    assert_eq!(json["canStartOrder"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let reply = send(&mock_app(), get("/api/routes/r404")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["error"], "route r404 not found");
}

#[tokio::test]
async fn calculator_page_shows_price_and_disabled_order() {
    let reply = send(&mock_app(), get("/?origin=l3&route=r4")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("3.50"));
    assert!(reply.body.contains("Currently unavailable"));
    assert!(reply.body.contains("disabled"));
}

#[tokio::test]
async fn calculator_page_with_unknown_route_shows_error() {
    let reply = send(&mock_app(), get("/?origin=l1&route=r404")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("route r404 is not a delivery from l1"));
}

#[tokio::test]
async fn calculator_page_ignores_route_from_another_origin() {
    // r5 departs from Kreuzberg (l3) at 5.99
    let reply = send(&mock_app(), get("/?origin=l2&route=r5")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("route r5 is not a delivery from l2"));
    assert!(reply.body.contains(r#"data-stage="origin-selected""#));
    assert!(!reply.body.contains("5.99"));
    assert!(!reply.body.contains("start-order"));
    // The new origin's own list is still shown
    assert!(reply.body.contains("route=r3"));
}

#[tokio::test]
async fn quote_adds_delivery_fee() {
    let body = json!({
        "routeId": "r1",
        "items": [{"id": "pizza", "name": "Pizza", "price": 10.5, "quantity": 2}]
    });
    let reply = send(&mock_app(), json_request("POST", "/api/quote", body)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["subtotal"], 21.0);
    assert_eq!(json["deliveryFee"], 2.99);
    assert_eq!(json["total"], 23.99);
}

#[tokio::test]
async fn quote_on_unavailable_route_is_rejected() {
    let body = json!({
        "routeId": "r4",
        "items": [{"id": "pizza", "name": "Pizza", "price": 10.5, "quantity": 1}]
    });
    let reply = send(&mock_app(), json_request("POST", "/api/quote", body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn created_location_is_listed() {
    let app = mock_app();
    // Populate the cache first
    let before = send(&app, get("/api/locations")).await.json();

    let reply = send(
        &app,
        json_request("POST", "/api/admin/locations", json!({"name": "Wedding"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["notice"]["kind"], "saved");

    let after = send(&app, get("/api/locations")).await.json();
    assert_eq!(
        after.as_array().unwrap().len(),
        before.as_array().unwrap().len() + 1
    );
    assert!(after.as_array().unwrap().iter().any(|l| l["name"] == "Wedding"));
}

#[tokio::test]
async fn deleting_missing_route_reports_failure() {
    let request = Request::delete("/api/admin/routes/does-not-exist")
        .body(Body::empty())
        .unwrap();
    let reply = send(&mock_app(), request).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["notice"]["kind"], "failed");
}

#[tokio::test]
async fn admin_route_listing_filters_by_origin() {
    let reply = send(&mock_app(), get("/api/admin/routes?origin=l3&available=true")).await;
    let json = reply.json();
    let routes = json.as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["id"], "r5");
}

#[tokio::test]
async fn self_loop_route_is_rejected() {
    let body = json!({
        "originId": "l1", "destinationId": "l1",
        "destinationName": "Berlin Mitte", "price": 1.0
    });
    let reply = send(&mock_app(), json_request("POST", "/api/admin/routes", body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["notice"]["kind"], "failed");
}

#[tokio::test]
async fn location_requests_are_queued() {
    let app = mock_app();
    let reply = send(
        &app,
        json_request(
            "POST",
            "/api/location-requests",
            json!({"name": "Moabit", "address": "Turmstraße 1"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["status"], "pending");

    let listed = send(&app, get("/api/location-requests")).await.json();
    assert_eq!(listed[0]["name"], "Moabit");

    let reply = send(
        &app,
        json_request("POST", "/api/location-requests", json!({"name": "", "address": "x"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_stores_token() {
    let session = Session::new();
    let mock = MockDeliveryApi::from_file("data/sample_catalog.json").unwrap();
    let app = app_with(Backend::Mock(mock), session.clone(), ResolveMode::ByOrigin);

    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("token=abc&user=ops"))
        .unwrap();
    let reply = send(&app, request).await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/"));
    assert_eq!(session.token().await.as_deref(), Some("abc"));
    assert_eq!(session.user().await.as_deref(), Some("ops"));
}

#[tokio::test]
async fn rejected_token_redirects_to_login_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = Session::with_token("stale");
    let client = ApiClient::new(
        ApiConfig::new(format!("{}/api", server.uri())),
        session.clone(),
    )
    .unwrap();
    let app = app_with(Backend::Http(client), session.clone(), ResolveMode::ByOrigin);

    let reply = send(&app, get("/api/locations")).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/login"));
    assert!(!session.is_signed_in().await);

    // The login view itself renders without touching the backend
    let reply = send(&app, get("/login")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Access token"));
}
