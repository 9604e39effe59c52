//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::admin::Notice;
use crate::api::RouteFilter;
use crate::cart::{Cart, MenuItem};
use crate::domain::{
    DistanceLabel, InvalidId, Location, LocationDraft, LocationId, Price, Route, RouteDraft,
};
use crate::resolver::{Destination, RouteDetails};

/// Query for the price calculator page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Selected origin location id
    pub origin: Option<String>,

    /// Selected route id
    pub route: Option<String>,

    /// Destination search text
    pub q: Option<String>,
}

/// Query for destination search.
#[derive(Debug, Default, Deserialize)]
pub struct DestinationQuery {
    pub q: Option<String>,
}

/// A hub in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    /// Number of outbound route links embedded in the record
    pub route_count: usize,
}

impl LocationResult {
    pub fn from_location(location: &Location) -> Self {
        Self {
            id: location.id.to_string(),
            name: location.name.clone(),
            address: location.address.clone(),
            route_count: location.routes.len(),
        }
    }
}

/// A destination reachable from an origin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationResult {
    pub route_id: String,
    pub destination_id: Option<String>,
    pub name: String,
}

impl DestinationResult {
    pub fn from_destination(destination: &Destination) -> Self {
        Self {
            route_id: destination.route_id.to_string(),
            destination_id: destination.destination_id.as_ref().map(ToString::to_string),
            name: destination.name.clone(),
        }
    }
}

/// Response to a destination search.
#[derive(Debug, Serialize)]
pub struct DestinationsResponse {
    pub origin: String,
    pub query: String,
    pub destinations: Vec<DestinationResult>,
}

/// Price and availability of a route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetailsResult {
    pub route_id: String,
    pub price: Price,
    /// Price formatted for display, e.g. "3.50"
    pub price_label: String,
    pub distance: Option<String>,
    pub is_available: bool,
    /// Whether an order can be started on this route
    pub can_start_order: bool,
}

impl RouteDetailsResult {
    pub fn from_details(details: &RouteDetails) -> Self {
        Self {
            route_id: details.route_id.to_string(),
            price: details.price,
            price_label: details.price.to_string(),
            distance: details.distance.as_ref().map(ToString::to_string),
            is_available: details.is_available,
            can_start_order: details.is_available,
        }
    }
}

/// A route in admin listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub id: String,
    pub origin_id: String,
    pub destination_id: String,
    pub destination_name: String,
    pub distance: Option<String>,
    pub price: Price,
    pub is_available: bool,
}

impl RouteResult {
    pub fn from_route(route: &Route) -> Self {
        Self {
            id: route.id.to_string(),
            origin_id: route.origin.to_string(),
            destination_id: route.destination.to_string(),
            destination_name: route.destination_name.clone(),
            distance: route.distance.as_ref().map(ToString::to_string),
            price: route.price,
            is_available: route.is_available,
        }
    }
}

/// One cart line in a quote request.
#[derive(Debug, Deserialize)]
pub struct QuoteLine {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

/// Request for a checkout quote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub route_id: String,
    pub items: Vec<QuoteLine>,
}

impl QuoteRequest {
    /// Build the cart described by the request.
    pub fn cart(&self) -> Cart {
        let mut cart = Cart::new();
        for line in &self.items {
            cart.add_quantity(line.item.clone(), line.quantity);
        }
        cart
    }
}

/// Location fields in admin requests.
#[derive(Debug, Deserialize)]
pub struct LocationBody {
    pub name: String,
    pub address: Option<String>,
}

impl LocationBody {
    pub fn draft(&self) -> LocationDraft {
        LocationDraft::new(self.name.clone(), self.address.clone())
    }
}

/// Route fields in admin requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBody {
    pub origin_id: String,
    pub destination_id: String,
    pub destination_name: String,
    pub distance: Option<String>,
    pub price: f64,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl RouteBody {
    /// Parse ids and price. Name and self-loop checks happen in the admin console.
    pub fn draft(&self) -> Result<RouteDraft, String> {
        Ok(RouteDraft {
            origin: LocationId::new(&self.origin_id).map_err(|e: InvalidId| e.to_string())?,
            destination: LocationId::new(&self.destination_id)
                .map_err(|e: InvalidId| e.to_string())?,
            destination_name: self.destination_name.clone(),
            distance: self.distance.as_deref().and_then(DistanceLabel::new),
            price: Price::from_decimal(self.price).map_err(|e| e.to_string())?,
            is_available: self.is_available,
        })
    }
}

/// Query for the admin route listing.
#[derive(Debug, Default, Deserialize)]
pub struct RouteListQuery {
    /// Comma-separated origin ids
    pub origin: Option<String>,
    pub available: Option<bool>,
}

impl RouteListQuery {
    pub fn filter(&self) -> Result<RouteFilter, InvalidId> {
        let origins = self
            .origin
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(LocationId::new)
            .collect::<Result<_, _>>()?;
        Ok(RouteFilter {
            origins,
            available: self.available,
        })
    }
}

/// Reply to an admin write.
#[derive(Debug, Serialize)]
pub struct AdminReply<T> {
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
}

/// Body of a hub proposal.
#[derive(Debug, Deserialize)]
pub struct LocationRequestBody {
    pub name: String,
    pub address: String,
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
    pub user: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
