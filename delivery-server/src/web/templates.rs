//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::Location;
use crate::resolver::RouteDetails;
use crate::selection::{Loadable, SelectionFlow, Stage};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Price calculator page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub signed_in: bool,
    pub locations: Vec<LocationOption>,
    pub origin: Option<String>,
    pub search: String,
    pub stage: &'static str,
    pub destinations: Vec<DestinationView>,
    pub list_error: Option<String>,
    pub details: Option<DetailsView>,
    pub details_error: Option<String>,
    pub can_start_order: bool,
}

impl IndexTemplate {
    /// Render the state of a completed selection flow.
    pub fn from_flow(flow: &SelectionFlow, locations: &[Location], signed_in: bool) -> Self {
        let origin = flow.origin().map(ToString::to_string);
        let route = flow.route().map(ToString::to_string);

        let locations = locations
            .iter()
            .map(|l| LocationOption {
                id: l.id.to_string(),
                name: l.name.clone(),
                selected: origin.as_deref() == Some(l.id.as_str()),
            })
            .collect();

        let destinations = flow
            .visible_destinations()
            .into_iter()
            .map(|d| {
                let route_id = d.route_id.to_string();
                DestinationView {
                    selected: route.as_deref() == Some(route_id.as_str()),
                    route_id,
                    name: d.name.clone(),
                }
            })
            .collect();

        let stage = match flow.stage() {
            Stage::NoOrigin => "no-origin",
            Stage::OriginSelected => "origin-selected",
            Stage::DestinationSelected => "destination-selected",
        };

        Self {
            signed_in,
            locations,
            search: flow.search().to_string(),
            stage,
            destinations,
            list_error: flow.destinations().error().map(str::to_string),
            details: flow.details().loaded().map(DetailsView::from_details),
            details_error: match flow.details() {
                Loadable::Failed(message) => Some(message.clone()),
                _ => None,
            },
            can_start_order: flow.can_start_order(),
            origin,
        }
    }

    /// Whether an origin is chosen but nothing can be delivered from it.
    pub fn has_no_destinations(&self) -> bool {
        self.origin.is_some() && self.list_error.is_none() && self.destinations.is_empty()
    }
}

/// Sign-in page.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub signed_in: bool,
    pub user: Option<String>,
    pub error: Option<String>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// An entry in the origin picker.
#[derive(Debug, Clone)]
pub struct LocationOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// An entry in the destination list.
#[derive(Debug, Clone)]
pub struct DestinationView {
    pub route_id: String,
    pub name: String,
    pub selected: bool,
}

/// The price panel.
#[derive(Debug, Clone)]
pub struct DetailsView {
    pub price: String,
    pub distance: Option<String>,
    pub is_available: bool,
}

impl DetailsView {
    pub fn from_details(details: &RouteDetails) -> Self {
        Self {
            price: details.price.to_string(),
            distance: details.distance.as_ref().map(ToString::to_string),
            is_available: details.is_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistanceLabel, LocationId, Price, RouteId};
    use crate::resolver::Destination;

    fn lid(s: &str) -> LocationId {
        LocationId::new(s).unwrap()
    }

    fn rid(s: &str) -> RouteId {
        RouteId::new(s).unwrap()
    }

    fn locations() -> Vec<Location> {
        vec![
            Location::new(lid("l1"), "Berlin Mitte", None, vec![]).unwrap(),
            Location::new(lid("l3"), "Kreuzberg", None, vec![]).unwrap(),
        ]
    }

    #[test]
    fn unavailable_route_renders_disabled_order() {
        let mut flow = SelectionFlow::new();
        let list = flow.choose_origin(lid("l1"));
        flow.complete_list(
            list,
            Ok(vec![Destination {
                route_id: rid("r2"),
                destination_id: Some(lid("l3")),
                name: "Kreuzberg".into(),
            }]),
        );
        let details = flow.choose_destination(rid("r2")).unwrap();
        flow.complete_details(
            details,
            Ok(RouteDetails {
                route_id: rid("r2"),
                price: Price::from_cents(350),
                distance: DistanceLabel::new("4.2 km"),
                is_available: false,
            }),
        );

        let page = IndexTemplate::from_flow(&flow, &locations(), true);
        assert_eq!(page.stage, "destination-selected");
        assert!(page.locations[0].selected);
        assert!(page.destinations[0].selected);
        assert_eq!(page.details.as_ref().unwrap().price, "3.50");
        assert!(!page.can_start_order);

        let html = page.render().unwrap();
        assert!(html.contains("3.50"));
        assert!(html.contains("Currently unavailable"));
    }

    #[test]
    fn origin_without_routes_renders_empty_state() {
        let mut flow = SelectionFlow::new();
        let ticket = flow.choose_origin(lid("l3"));
        flow.complete_list(ticket, Ok(vec![]));

        let page = IndexTemplate::from_flow(&flow, &locations(), false);
        assert!(page.has_no_destinations());
        let html = page.render().unwrap();
        assert!(html.contains("No deliveries from this hub"));
    }

    #[test]
    fn error_page_renders() {
        let page = ErrorTemplate {
            title: "Delivery service unavailable".into(),
            message: "Try again later".into(),
            details: Some("API error 503".into()),
        };
        let html = page.render().unwrap();
        assert!(html.contains("Try again later"));
        assert!(html.contains("API error 503"));
    }
}
