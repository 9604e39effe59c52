//! Delivery API wire DTOs.
//!
//! These types map directly to the JSON the backend sends and accepts. Two
//! location shapes are in circulation (a canonical one with `routes` and a
//! legacy one with `routeLocations`), ids arrive as numbers or strings, and
//! lists arrive bare or wrapped. All of that is resolved in `convert`; nothing
//! outside this module and `convert` sees these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An id as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

/// List responses: `[..]`, `{"data": [..]}` or `{"value": [..]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Value { value: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items)
            | ListEnvelope::Data { data: items }
            | ListEnvelope::Value { value: items } => items,
        }
    }
}

/// A location in either of the two shapes the backend produces.
///
/// `Legacy` is tried first because its `routeLocations` field is required;
/// a canonical record never matches it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationPayload {
    Legacy(LegacyLocationDto),
    Canonical(LocationDto),
}

/// Canonical location record.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub id: WireId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteRefDto>,
}

/// Canonical embedded route link.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRefDto {
    pub route_id: WireId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<WireId>,
    pub destination_name: String,
}

/// Legacy location record with denormalized route links.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLocationDto {
    pub id: WireId,
    pub name: String,
    pub route_locations: Vec<RouteLocationDto>,
}

/// Legacy join record between a location and a route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLocationDto {
    pub id: Option<WireId>,
    pub delivery_route_id: WireId,
    /// Destination name shown in the route table.
    pub name: Option<String>,
    pub delivery_route: Option<RouteSummaryDto>,
}

/// Legacy route summary embedded in a join record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummaryDto {
    pub id: WireId,
    pub name: String,
    pub delivery_price: f64,
}

/// Canonical route record.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub id: WireId,
    pub origin_id: WireId,
    pub destination_id: WireId,
    pub destination_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    pub price: f64,
    /// Absent on some records. A missing flag reads as unavailable, so such
    /// a route is listed but cannot be ordered.
    #[serde(default)]
    pub is_available: bool,
}

/// Request body for creating or updating a location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a str>,
}

/// Request body for creating or updating a route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBody<'a> {
    pub origin_id: &'a str,
    pub destination_id: &'a str,
    pub destination_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<&'a str>,
    pub price: f64,
    pub is_available: bool,
}

/// Structured error body: `{"message": .., "errors": {field: [..]}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBodyDto {
    pub message: Option<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Catalog file used by the in-memory backend.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFileDto {
    pub locations: Vec<LocationPayload>,
    #[serde(default)]
    pub routes: Vec<RouteDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers_and_strings() {
        let n: WireId = serde_json::from_str("42").unwrap();
        let s: WireId = serde_json::from_str("\"l1\"").unwrap();
        assert_eq!(n, WireId::Number(42));
        assert_eq!(s, WireId::Text("l1".into()));
    }

    #[test]
    fn list_envelopes() {
        let bare: ListEnvelope<i32> = serde_json::from_str("[1,2]").unwrap();
        let data: ListEnvelope<i32> = serde_json::from_str(r#"{"data":[3]}"#).unwrap();
        let value: ListEnvelope<i32> = serde_json::from_str(r#"{"value":[]}"#).unwrap();
        assert_eq!(bare.into_items(), vec![1, 2]);
        assert_eq!(data.into_items(), vec![3]);
        assert!(value.into_items().is_empty());
    }

    #[test]
    fn route_without_availability_is_unavailable() {
        let json = r#"[
            {"id": 1, "originId": 1, "destinationId": 2, "destinationName": "Kreuzberg", "price": 3.5},
            {"id": 2, "originId": 1, "destinationId": 3, "destinationName": "Neukölln", "price": 4.2,
             "isAvailable": true}
        ]"#;
        let routes: ListEnvelope<RouteDto> = serde_json::from_str(json).unwrap();
        let routes = routes.into_items();
        assert_eq!(routes.len(), 2);
        assert!(!routes[0].is_available);
        assert!(routes[1].is_available);
    }

    #[test]
    fn legacy_shape_is_detected() {
        let json = r#"{"id": 1, "name": "Hub", "routeLocations": [{"deliveryRouteId": 101, "name": "Route 1"}]}"#;
        let payload: LocationPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload, LocationPayload::Legacy(_)));
    }

    #[test]
    fn canonical_shape_is_detected() {
        let json = r#"{"id": "l1", "name": "Berlin Mitte", "address": "Alexanderplatz 1"}"#;
        let payload: LocationPayload = serde_json::from_str(json).unwrap();
        match payload {
            LocationPayload::Canonical(dto) => {
                assert!(dto.routes.is_empty());
                assert_eq!(dto.address.as_deref(), Some("Alexanderplatz 1"));
            }
            LocationPayload::Legacy(_) => panic!("expected canonical shape"),
        }
    }

    #[test]
    fn error_body_without_errors() {
        let body: ErrorBodyDto = serde_json::from_str(r#"{"message": "boom"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("boom"));
        assert!(body.errors.is_empty());
    }

    #[test]
    fn route_body_serializes_camel_case() {
        let body = RouteBody {
            origin_id: "l1",
            destination_id: "l3",
            destination_name: "Kreuzberg",
            distance: None,
            price: 3.5,
            is_available: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["originId"], "l1");
        assert_eq!(json["isAvailable"], false);
        assert!(json.get("distance").is_none());
    }
}
