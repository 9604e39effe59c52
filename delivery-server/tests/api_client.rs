//! Integration tests for `ApiClient`.
//!
//! Each test stands up a `wiremock` server in place of the delivery API, so
//! no real network traffic is made.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use delivery_server::api::{ApiClient, ApiConfig, ApiError, DeliveryApi, RouteFilter, Session, login_redirect};
use delivery_server::domain::{LocationDraft, LocationId, Price, RouteId};

fn client(server: &MockServer, session: Session) -> ApiClient {
    let config = ApiConfig::new(format!("{}/api", server.uri())).with_timeout(5);
    ApiClient::new(config, session).expect("failed to build test client")
}

fn lid(s: &str) -> LocationId {
    LocationId::new(s).unwrap()
}

fn route_json(id: serde_json::Value, origin: &str, destination: &str, name: &str, price: f64, available: bool) -> serde_json::Value {
    json!({
        "id": id,
        "originId": origin,
        "destinationId": destination,
        "destinationName": name,
        "distance": "4.2 km",
        "price": price,
        "isAvailable": available
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_locations_accepts_data_envelope_and_numeric_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "name": "Berlin Mitte", "routes": [
                    {"routeId": 2, "destinationId": 3, "destinationName": "Kreuzberg"}
                ]},
                {"id": 3, "name": "Kreuzberg", "routes": []}
            ]
        })))
        .mount(&server)
        .await;

    let locations = client(&server, Session::new()).list_locations().await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].id, lid("1"));
    assert_eq!(locations[0].routes[0].route_id, RouteId::new("2").unwrap());
    assert_eq!(locations[0].routes[0].destination_name, "Kreuzberg");
}

#[tokio::test]
async fn list_locations_accepts_legacy_nested_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Berlin Mitte", "routeLocations": [
                {"deliveryRouteId": 7, "name": "Kreuzberg",
                 "deliveryRoute": {"id": 7, "name": "Mitte - Kreuzberg", "deliveryPrice": 3.5}}
            ]}
        ])))
        .mount(&server)
        .await;

    let locations = client(&server, Session::new()).list_locations().await.unwrap();

    let link = &locations[0].routes[0];
    assert_eq!(link.route_id, RouteId::new("7").unwrap());
    assert_eq!(link.destination_id, None);
    assert_eq!(link.destination_name, "Kreuzberg");
}

#[tokio::test]
async fn get_route_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/DeliveryRoutes/r2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_json(
            json!("r2"),
            "l1",
            "l3",
            "Kreuzberg",
            3.5,
            false,
        )))
        .mount(&server)
        .await;

    let route = client(&server, Session::new())
        .get_route(&RouteId::new("r2").unwrap())
        .await
        .unwrap();

    assert_eq!(route.price, Price::from_cents(350));
    assert!(!route.is_available);
    assert_eq!(route.destination, lid("l3"));
}

#[tokio::test]
async fn routes_by_origin_use_their_own_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/DeliveryRoutes/origin/l1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                route_json(json!(1), "l1", "l2", "Prenzlauer Berg", 2.99, true),
                route_json(json!(2), "l1", "l3", "Kreuzberg", 3.5, false)
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let routes = client(&server, Session::new())
        .list_routes_by_origin(&lid("l1"))
        .await
        .unwrap();

    let names: Vec<&str> = routes.iter().map(|r| r.destination_name.as_str()).collect();
    assert_eq!(names, ["Prenzlauer Berg", "Kreuzberg"]);
}

#[tokio::test]
async fn route_listing_sends_bracketed_origin_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/DeliveryRoutes"))
        .and(query_param("origin[]", "l1"))
        .and(query_param("origin[]", "l2"))
        .and(query_param("available", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let filter = RouteFilter {
        origins: vec![lid("l1"), lid("l2")],
        available: Some(true),
    };
    let routes = client(&server, Session::new()).list_routes(&filter).await.unwrap();
    assert!(routes.is_empty());
}

#[tokio::test]
async fn session_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Locations"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let locations = client(&server, Session::with_token("secret-token"))
        .list_locations()
        .await
        .unwrap();
    assert!(locations.is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Locations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = Session::with_token("stale");
    let api = client(&server, session.clone());

    let err = api.list_locations().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(session.token().await, None);
    assert!(!session.is_signed_in().await);
    // The transport never navigates; the caller decides
    assert_eq!(login_redirect("/"), Some("/login"));
    assert_eq!(login_redirect("/login"), None);
}

#[tokio::test]
async fn deleting_missing_route_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/DeliveryRoutes/does-not-exist"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, Session::new())
        .delete_route(&RouteId::new("does-not-exist").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn validation_errors_carry_field_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Locations"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"name": ["The name has already been taken."]}
        })))
        .mount(&server)
        .await;

    let err = client(&server, Session::new())
        .create_location(&LocationDraft::new("Berlin Mitte", None))
        .await
        .unwrap_err();

    match err {
        ApiError::Validation { message, errors } => {
            assert_eq!(message, "The given data was invalid.");
            assert_eq!(errors["name"], ["The name has already been taken."]);
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Locations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server, Session::new()).list_locations().await.unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 503, ref message } if message == "maintenance"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn invalid_draft_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, Session::new())
        .create_location(&LocationDraft::new("  ", None))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Locations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client(&server, Session::new()).list_locations().await.unwrap_err();

    match err {
        ApiError::Json { body, .. } => assert_eq!(body.as_deref(), Some("<html>proxy error</html>")),
        other => panic!("expected Json, got {other:?}"),
    }
}
