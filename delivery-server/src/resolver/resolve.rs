//! Origin → destinations and route → details.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::api::{ApiError, DeliveryApi};
use crate::domain::{DistanceLabel, Location, LocationId, Price, Route, RouteId, RouteRef};

/// Error from route resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The route id does not name a route
    #[error("route {0} not found")]
    RouteNotFound(RouteId),

    /// Any other backend failure
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Where destination lists come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveMode {
    /// Filter the route links embedded in the origin's location record.
    Embedded,
    /// Ask the backend for the routes departing from the origin.
    #[default]
    ByOrigin,
}

impl FromStr for ResolveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedded" => Ok(ResolveMode::Embedded),
            "by-origin" | "by_origin" | "byorigin" => Ok(ResolveMode::ByOrigin),
            other => Err(format!(
                "unknown resolve mode '{other}' (expected 'embedded' or 'by-origin')"
            )),
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveMode::Embedded => f.write_str("embedded"),
            ResolveMode::ByOrigin => f.write_str("by-origin"),
        }
    }
}

/// One selectable destination of an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub route_id: RouteId,
    /// Absent when the backend only sent a legacy route link.
    pub destination_id: Option<LocationId>,
    pub name: String,
}

impl From<&RouteRef> for Destination {
    fn from(link: &RouteRef) -> Self {
        Destination {
            route_id: link.route_id.clone(),
            destination_id: link.destination_id.clone(),
            name: link.destination_name.clone(),
        }
    }
}

impl From<&Route> for Destination {
    fn from(route: &Route) -> Self {
        Destination {
            route_id: route.id.clone(),
            destination_id: Some(route.destination.clone()),
            name: route.destination_name.clone(),
        }
    }
}

/// Price and availability of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDetails {
    pub route_id: RouteId,
    pub price: Price,
    pub distance: Option<DistanceLabel>,
    pub is_available: bool,
}

impl From<Route> for RouteDetails {
    fn from(route: Route) -> Self {
        RouteDetails {
            route_id: route.id,
            price: route.price,
            distance: route.distance,
            is_available: route.is_available,
        }
    }
}

/// Destinations embedded in `origin`'s location record, in link order.
///
/// An unknown origin yields an empty list.
pub fn embedded_destinations(locations: &[Location], origin: &LocationId) -> Vec<Destination> {
    locations
        .iter()
        .find(|l| &l.id == origin)
        .map(|l| l.routes.iter().map(Destination::from).collect())
        .unwrap_or_default()
}

/// Destinations of a by-origin route listing, in listing order.
pub fn destinations_of(routes: &[Route]) -> Vec<Destination> {
    routes.iter().map(Destination::from).collect()
}

/// Resolves destinations and route details against a delivery backend.
///
/// Usually given the cached API, so repeated lookups for the same origin
/// stay local until the cache is refreshed.
pub struct RouteResolver<'a, A> {
    api: &'a A,
    mode: ResolveMode,
}

impl<'a, A: DeliveryApi> RouteResolver<'a, A> {
    pub fn new(api: &'a A, mode: ResolveMode) -> Self {
        Self { api, mode }
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    /// Destinations reachable from `origin`.
    ///
    /// "Nothing goes there" is an empty list, never an error: an unknown
    /// origin, an origin without routes and a not-found answer from the
    /// by-origin endpoint all resolve to `[]`.
    pub async fn destinations_from(
        &self,
        origin: &LocationId,
    ) -> Result<Vec<Destination>, ResolveError> {
        let destinations = match self.mode {
            ResolveMode::Embedded => {
                let locations = self.api.list_locations().await?;
                embedded_destinations(&locations, origin)
            }
            ResolveMode::ByOrigin => match self.api.list_routes_by_origin(origin).await {
                Ok(routes) => destinations_of(&routes),
                Err(e) if e.is_not_found() => {
                    debug!(%origin, "no routes from origin");
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            },
        };
        debug!(%origin, mode = %self.mode, count = destinations.len(), "resolved destinations");
        Ok(destinations)
    }

    /// Price, distance and availability of one route.
    pub async fn route_details(&self, route: &RouteId) -> Result<RouteDetails, ResolveError> {
        match self.api.get_route(route).await {
            Ok(found) => Ok(found.into()),
            Err(e) if e.is_not_found() => Err(ResolveError::RouteNotFound(route.clone())),
            Err(e) => Err(e.into()),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn routes_from_origin(prices: &[u64]) -> Vec<Route> {
        prices
            .iter()
            .enumerate()
            .map(|(i, cents)| {
                Route::new(
                    RouteId::new(format!("r{i}")).unwrap(),
                    LocationId::new("origin").unwrap(),
                    LocationId::new(format!("d{i}")).unwrap(),
                    format!("Hub {i}"),
                    None,
                    Price::from_cents(*cents),
                    true,
                )
                .unwrap()
            })
            .collect()
    }

    proptest! {
        /// N routes give N destinations in listing order, whatever the prices.
        #[test]
        fn listing_order_is_kept(prices in prop::collection::vec(0u64..10_000, 0..20)) {
            let routes = routes_from_origin(&prices);
            let destinations = destinations_of(&routes);

            prop_assert_eq!(destinations.len(), routes.len());
            for (d, r) in destinations.iter().zip(&routes) {
                prop_assert_eq!(&d.route_id, &r.id);
            }
        }

        /// Embedded links resolve in link order too.
        #[test]
        fn embedded_order_is_kept(prices in prop::collection::vec(0u64..10_000, 0..20)) {
            let routes = routes_from_origin(&prices);
            let links = routes
                .iter()
                .map(|r| RouteRef {
                    route_id: r.id.clone(),
                    destination_id: Some(r.destination.clone()),
                    destination_name: r.destination_name.clone(),
                })
                .collect();
            let origin = Location::new(LocationId::new("origin").unwrap(), "Origin", None, links)
                .unwrap();

            let embedded = embedded_destinations(&[origin], &LocationId::new("origin").unwrap());
            prop_assert_eq!(embedded, destinations_of(&routes));
        }
    }
}
